//! Settlement ledger capability: token balances and atomic transfers

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use thiserror::Error;

use crate::error::ArbitrageError;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("insufficient funds: {holder:?} holds {available} of {asset:?}, needs {requested}")]
    InsufficientFunds {
        asset: Address,
        holder: Address,
        requested: U256,
        available: U256,
    },

    /// Submitted but not confirmed either way; the transfer may have settled
    #[error("transfer {tx_hash:?} outcome unknown: {reason}")]
    OutcomeUnknown { tx_hash: H256, reason: String },
}

impl From<LedgerError> for ArbitrageError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InsufficientFunds {
                asset,
                requested,
                available,
                ..
            } => ArbitrageError::InsufficientBalance {
                asset,
                requested,
                available,
            },
            LedgerError::Unavailable(reason) => ArbitrageError::RouterUnavailable { reason },
            LedgerError::OutcomeUnknown { tx_hash, reason } => {
                ArbitrageError::SettlementUnknown { tx_hash, reason }
            }
        }
    }
}

/// Token ledger the engine's holdings live in
#[async_trait]
pub trait Ledger: Send + Sync {
    async fn balance_of(&self, asset: Address, holder: Address) -> Result<U256, LedgerError>;

    /// Move exactly `amount` of `asset` from `from` to `to`, or nothing at all
    async fn transfer(
        &self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError>;
}
