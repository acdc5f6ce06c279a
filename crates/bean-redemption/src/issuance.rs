//! # Token Issuance
//!
//! Minting converts physical inventory into holder balances: the batch's
//! minted counter goes up and the holder is credited by the same amount.
//! If the credit fails the minted counter is rolled back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use bean_core::{BatchId, HolderId, Timestamp};

use crate::error::RedemptionError;
use crate::store::{BalanceStore, BatchStore};

/// Outcome of a successful mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintReceipt {
    pub batch_id: BatchId,
    pub holder: HolderId,
    pub quantity: u64,
    /// Batch minted counter after the mint.
    pub minted_quantity: u64,
    /// Holder balance after the credit.
    pub holder_balance: u64,
}

/// Issues batch tokens to holders.
pub struct TokenIssuer {
    batches: Arc<dyn BatchStore>,
    balances: Arc<dyn BalanceStore>,
}

impl TokenIssuer {
    pub fn new(batches: Arc<dyn BatchStore>, balances: Arc<dyn BalanceStore>) -> Self {
        Self { batches, balances }
    }

    pub fn mint(
        &self,
        batch_id: BatchId,
        holder: &HolderId,
        quantity: u64,
    ) -> Result<MintReceipt, RedemptionError> {
        self.mint_at(batch_id, holder, quantity, Timestamp::now())
    }

    /// Mint `quantity` tokens of `batch_id` to `holder`, treating `now` as
    /// the current time for the expiry check.
    pub fn mint_at(
        &self,
        batch_id: BatchId,
        holder: &HolderId,
        quantity: u64,
        now: Timestamp,
    ) -> Result<MintReceipt, RedemptionError> {
        if quantity == 0 {
            return Err(RedemptionError::InvalidInput(
                "mint quantity must be greater than zero".to_string(),
            ));
        }
        let delta = i64::try_from(quantity).map_err(|_| {
            RedemptionError::InvalidInput(format!("mint quantity {quantity} is too large"))
        })?;

        let batch = self.batches.get_batch(batch_id)?;
        if batch.expiry_date() < now {
            return Err(RedemptionError::InvalidInput(format!(
                "{batch_id} expired at {}; minting is closed",
                batch.expiry_date()
            )));
        }
        if quantity > batch.available_quantity() {
            return Err(RedemptionError::InvalidInput(format!(
                "{batch_id}: cannot mint {quantity}, only {} available",
                batch.available_quantity()
            )));
        }

        let updated = self.batches.adjust_minted(batch_id, delta)?;
        let holder_balance = match self.balances.credit_balance(batch_id, holder, quantity) {
            Ok(balance) => balance,
            Err(e) => {
                if let Err(rollback) = self.batches.adjust_minted(batch_id, -delta) {
                    tracing::error!(
                        batch_id = %batch_id,
                        error = %rollback,
                        "failed to roll back minted quantity"
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(
            batch_id = %batch_id,
            holder = %holder,
            quantity,
            minted_quantity = updated.minted_quantity(),
            "tokens minted"
        );
        Ok(MintReceipt {
            batch_id,
            holder: holder.clone(),
            quantity,
            minted_quantity: updated.minted_quantity(),
            holder_balance,
        })
    }
}
