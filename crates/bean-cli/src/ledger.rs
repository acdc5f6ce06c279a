//! # Ledger Subcommand
//!
//! File-backed minting and redemption. The ledger file holds batches,
//! balances and redemption requests as one JSON document; every invocation
//! loads it into the in-memory stores, runs one operation through the
//! redemption engine, and writes the result back.
//!
//! ## Subcommands
//!
//! - `add-batch` — Register a batch document.
//! - `mint` — Issue batch tokens to a holder.
//! - `redeem` — Open a redemption request.
//! - `advance` — Move a request to processing, fulfilled or cancelled.
//! - `show` — Print ledger contents, optionally filtered to one holding.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use bean_core::{Batch, BatchId, HolderId, RedemptionId, VerificationConfig};
use bean_redemption::{
    BalanceStore, BatchStore, InMemoryBalanceStore, InMemoryBatchStore, InMemoryConfigStore,
    RedemptionEngine, RedemptionPolicy, RedemptionRequest, RedemptionStatus, TokenIssuer,
};

use crate::{load_batch, load_config, parse_now, print_json};

/// Arguments for the `bean ledger` subcommand.
#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// Path to the ledger file. Created on first write.
    #[arg(long, default_value = "bean-ledger.json")]
    pub ledger: PathBuf,

    /// Only accept redemptions against fully verified batches.
    #[arg(long)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: LedgerCommand,
}

#[derive(Subcommand, Debug)]
pub enum LedgerCommand {
    /// Register a batch from a JSON document.
    AddBatch {
        #[arg(long)]
        batch: PathBuf,
    },

    /// Mint tokens of a batch to a holder.
    Mint {
        #[arg(long)]
        batch_id: u64,
        #[arg(long)]
        holder: String,
        #[arg(long)]
        quantity: u64,
        #[arg(long)]
        now: Option<String>,
    },

    /// Open a redemption request.
    Redeem {
        #[arg(long)]
        batch_id: u64,
        #[arg(long)]
        holder: String,
        #[arg(long)]
        quantity: u64,
        /// Delivery address or instructions.
        #[arg(long)]
        delivery: String,
        #[arg(long)]
        now: Option<String>,
    },

    /// Advance a redemption request.
    Advance {
        /// Request UUID.
        #[arg(long)]
        id: String,
        #[arg(long, value_enum)]
        to: TargetStatus,
        #[arg(long)]
        now: Option<String>,
    },

    /// Print the ledger, or one holding's balance and requests.
    Show {
        #[arg(long, requires = "holder")]
        batch_id: Option<u64>,
        #[arg(long, requires = "batch_id")]
        holder: Option<String>,
    },
}

/// Redemption states reachable by `advance`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetStatus {
    Processing,
    Fulfilled,
    Cancelled,
}

impl From<TargetStatus> for RedemptionStatus {
    fn from(t: TargetStatus) -> Self {
        match t {
            TargetStatus::Processing => RedemptionStatus::Processing,
            TargetStatus::Fulfilled => RedemptionStatus::Fulfilled,
            TargetStatus::Cancelled => RedemptionStatus::Cancelled,
        }
    }
}

/// On-disk ledger document.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LedgerFile {
    #[serde(default)]
    pub batches: Vec<Batch>,
    #[serde(default)]
    pub balances: Vec<BalanceRecord>,
    #[serde(default)]
    pub requests: Vec<RedemptionRequest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    pub batch_id: BatchId,
    pub holder: HolderId,
    pub amount: u64,
}

#[derive(Debug, Serialize)]
struct HoldingView {
    batch_id: BatchId,
    holder: HolderId,
    balance: u64,
    reserved: u64,
    requests: Vec<RedemptionRequest>,
}

/// A ledger file loaded into the in-memory stores.
pub struct Ledger {
    batches: InMemoryBatchStore,
    balances: InMemoryBalanceStore,
    engine: RedemptionEngine,
    issuer: TokenIssuer,
}

impl Ledger {
    /// Load `path`, or start empty if it does not exist yet.
    pub fn open(path: &Path, config: VerificationConfig, policy: RedemptionPolicy) -> Result<Self> {
        let file: LedgerFile = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read ledger {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("invalid ledger {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "ledger not found; starting empty");
            LedgerFile::default()
        };

        let batches = InMemoryBatchStore::new();
        for batch in file.batches {
            batches.insert(batch);
        }
        let balances = InMemoryBalanceStore::new();
        for record in file.balances {
            balances.set_balance(record.batch_id, record.holder, record.amount);
        }
        let engine = RedemptionEngine::with_policy(
            Arc::new(batches.clone()),
            Arc::new(balances.clone()),
            Arc::new(InMemoryConfigStore::new(config)),
            policy,
        );
        engine.restore(file.requests);
        let issuer = TokenIssuer::new(Arc::new(batches.clone()), Arc::new(balances.clone()));

        Ok(Self {
            batches,
            balances,
            engine,
            issuer,
        })
    }

    pub fn snapshot(&self) -> LedgerFile {
        LedgerFile {
            batches: self.batches.list_batches(),
            balances: self
                .balances
                .entries()
                .into_iter()
                .map(|(batch_id, holder, amount)| BalanceRecord {
                    batch_id,
                    holder,
                    amount,
                })
                .collect(),
            requests: self.engine.all_requests(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("failed to create ledger directory")?;
        }
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write ledger {}", path.display()))?;
        Ok(())
    }
}

/// Execute the ledger subcommand.
pub fn run_ledger(args: &LedgerArgs, config: Option<&Path>) -> Result<u8> {
    let cfg = load_config(config)?;
    let policy = if args.strict {
        RedemptionPolicy::strict()
    } else {
        RedemptionPolicy::default()
    };
    let ledger = Ledger::open(&args.ledger, cfg, policy)?;

    match &args.command {
        LedgerCommand::AddBatch { batch } => {
            let batch = load_batch(batch)?;
            let id = batch.batch_id();
            if ledger.batches.get_batch(id).is_ok() {
                bail!("batch already registered: {id}");
            }
            ledger.batches.insert(batch);
            ledger.save(&args.ledger)?;
            println!("OK: registered {id}");
        }

        LedgerCommand::Mint {
            batch_id,
            holder,
            quantity,
            now,
        } => {
            let batch_id = BatchId::new(*batch_id)?;
            let holder = HolderId::new(holder.as_str())?;
            let now = parse_now(now.as_deref())?;
            let receipt = ledger.issuer.mint_at(batch_id, &holder, *quantity, now)?;
            ledger.save(&args.ledger)?;
            print_json(&receipt)?;
        }

        LedgerCommand::Redeem {
            batch_id,
            holder,
            quantity,
            delivery,
            now,
        } => {
            let batch_id = BatchId::new(*batch_id)?;
            let holder = HolderId::new(holder.as_str())?;
            let now = parse_now(now.as_deref())?;
            let request =
                ledger
                    .engine
                    .create_redemption_at(batch_id, holder, *quantity, delivery, now)?;
            ledger.save(&args.ledger)?;
            print_json(&request)?;
        }

        LedgerCommand::Advance { id, to, now } => {
            let uuid = uuid::Uuid::parse_str(id).context("invalid request id")?;
            let now = parse_now(now.as_deref())?;
            let request = ledger.engine.advance_redemption_at(
                RedemptionId::from_uuid(uuid),
                (*to).into(),
                now,
            )?;
            ledger.save(&args.ledger)?;
            print_json(&request)?;
        }

        LedgerCommand::Show { batch_id, holder } => match (batch_id, holder) {
            (Some(batch_id), Some(holder)) => {
                let batch_id = BatchId::new(*batch_id)?;
                let holder = HolderId::new(holder.as_str())?;
                print_json(&holding(&ledger, batch_id, holder))?;
            }
            _ => print_json(&ledger.snapshot())?,
        },
    }
    Ok(0)
}

fn holding(ledger: &Ledger, batch_id: BatchId, holder: HolderId) -> HoldingView {
    HoldingView {
        batch_id,
        balance: ledger.balances.get_balance(batch_id, &holder),
        reserved: ledger.engine.open_quantity(batch_id, &holder),
        requests: ledger.engine.requests_for_holder(batch_id, &holder),
        holder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::fixtures;

    const NOW: &str = "2026-06-01T00:00:00Z";

    struct Env {
        dir: tempfile::TempDir,
        ledger: PathBuf,
    }

    impl Env {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let ledger = dir.path().join("state").join("ledger.json");
            Self { dir, ledger }
        }

        fn run(&self, command: LedgerCommand) -> Result<u8> {
            run_ledger(
                &LedgerArgs {
                    ledger: self.ledger.clone(),
                    strict: false,
                    command,
                },
                None,
            )
        }

        fn load(&self) -> LedgerFile {
            serde_json::from_str(&std::fs::read_to_string(&self.ledger).unwrap()).unwrap()
        }

        fn add_batch(&self) {
            let batch = fixtures::write(self.dir.path(), "batch.json", fixtures::BATCH_JSON);
            self.run(LedgerCommand::AddBatch { batch }).unwrap();
        }

        fn mint(&self, quantity: u64) -> Result<u8> {
            self.run(LedgerCommand::Mint {
                batch_id: 12,
                holder: "0xholder".to_string(),
                quantity,
                now: Some(NOW.to_string()),
            })
        }

        fn redeem(&self, quantity: u64) -> Result<u8> {
            self.run(LedgerCommand::Redeem {
                batch_id: 12,
                holder: "0xholder".to_string(),
                quantity,
                delivery: "Dock 4".to_string(),
                now: Some(NOW.to_string()),
            })
        }

        fn advance(&self, id: RedemptionId, to: TargetStatus) -> Result<u8> {
            self.run(LedgerCommand::Advance {
                id: id.as_uuid().to_string(),
                to,
                now: Some(NOW.to_string()),
            })
        }
    }

    #[test]
    fn add_batch_persists_and_rejects_duplicates() {
        let env = Env::new();
        env.add_batch();
        assert_eq!(env.load().batches.len(), 1);
        let batch = fixtures::write(env.dir.path(), "batch.json", fixtures::BATCH_JSON);
        let err = env.run(LedgerCommand::AddBatch { batch }).unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }

    #[test]
    fn mint_redeem_fulfill() {
        let env = Env::new();
        env.add_batch();
        env.mint(8).unwrap();

        let file = env.load();
        assert_eq!(file.batches[0].minted_quantity(), 108);
        assert_eq!(file.balances[0].amount, 8);

        env.redeem(8).unwrap();
        assert!(env.redeem(1).is_err());

        let id = env.load().requests[0].id;
        env.advance(id, TargetStatus::Processing).unwrap();
        env.advance(id, TargetStatus::Fulfilled).unwrap();

        let file = env.load();
        assert_eq!(file.requests[0].status, RedemptionStatus::Fulfilled);
        assert_eq!(file.balances[0].amount, 0);
        assert!(env.advance(id, TargetStatus::Cancelled).is_err());
    }

    #[test]
    fn cancel_frees_reservation_across_invocations() {
        let env = Env::new();
        env.add_batch();
        env.mint(5).unwrap();
        env.redeem(5).unwrap();
        let id = env.load().requests[0].id;
        env.advance(id, TargetStatus::Cancelled).unwrap();
        env.redeem(5).unwrap();
        assert_eq!(env.load().requests.len(), 2);
    }

    #[test]
    fn unknown_batch_and_bad_id() {
        let env = Env::new();
        assert!(env.mint(1).is_err());
        let err = env
            .run(LedgerCommand::Advance {
                id: "not-a-uuid".to_string(),
                to: TargetStatus::Processing,
                now: None,
            })
            .unwrap_err();
        assert!(err.to_string().contains("invalid request id"));
    }

    #[test]
    fn show_holding() {
        let env = Env::new();
        env.add_batch();
        env.mint(3).unwrap();
        env.redeem(2).unwrap();
        let ledger = Ledger::open(
            &env.ledger,
            VerificationConfig::default(),
            RedemptionPolicy::default(),
        )
        .unwrap();
        let view = holding(
            &ledger,
            BatchId::new(12).unwrap(),
            HolderId::new("0xholder").unwrap(),
        );
        assert_eq!(view.balance, 3);
        assert_eq!(view.reserved, 2);
        assert_eq!(view.requests.len(), 1);
        assert_eq!(
            env.run(LedgerCommand::Show {
                batch_id: None,
                holder: None
            })
            .unwrap(),
            0
        );
    }
}
