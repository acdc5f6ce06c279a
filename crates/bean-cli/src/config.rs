//! # Config Subcommand
//!
//! Shows the effective verification thresholds or validates a config file.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand, ValueEnum};

use bean_core::{VerificationConfig, VerificationConfigPatch};

use crate::load_config;

/// Arguments for the `bean config` subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration (file merged over defaults).
    Show {
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Validate the file given with `--config`.
    Validate,

    /// Apply a partial update and print the result without saving it.
    Patch {
        /// Path to a YAML or JSON patch document.
        #[arg(long)]
        patch: std::path::PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Execute the config subcommand.
pub fn run_config(args: &ConfigArgs, config: Option<&Path>) -> Result<u8> {
    match &args.command {
        ConfigCommand::Show { format } => {
            let cfg = load_config(config)?;
            println!("{}", render(&cfg, *format)?);
            Ok(0)
        }
        ConfigCommand::Validate => {
            let Some(path) = config else {
                bail!("`config validate` needs --config <file>");
            };
            load_config(Some(path))?;
            println!("OK: {} is a valid verification config", path.display());
            Ok(0)
        }
        ConfigCommand::Patch { patch } => {
            let cfg = load_config(config)?;
            let patch = load_patch(patch)?;
            let updated = cfg.apply(&patch).context("patch rejected")?;
            println!("{}", render(&updated, OutputFormat::Json)?);
            Ok(0)
        }
    }
}

fn render(cfg: &VerificationConfig, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(cfg)?,
        OutputFormat::Yaml => serde_yaml::to_string(cfg)?,
    })
}

fn load_patch(path: &Path) -> Result<VerificationConfigPatch> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read patch {}", path.display()))?;
    let patch: VerificationConfigPatch = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };
    if patch.is_empty() {
        tracing::warn!(path = %path.display(), "patch changes nothing");
    }
    Ok(patch)
}
