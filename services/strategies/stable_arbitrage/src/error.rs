//! Error types for the stable arbitrage engine
//!
//! Every failed operation ends in exactly one of these kinds. `NoProfit` and
//! `NoProfitableDirection` are the profitability guard doing its job and are
//! expected outcomes; the rest are operational errors.

use ethers::types::{Address, H256, U256};
use stable_amm::AmmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArbitrageError {
    #[error("Unauthorized: caller {caller:?} is not the engine owner")]
    Unauthorized { caller: Address },

    #[error("No profit: output {amount_out} does not exceed input {amount_in}")]
    NoProfit { amount_in: U256, amount_out: U256 },

    #[error(
        "No profitable direction: first->second {forward_in} -> {forward_out}, second->first {reverse_in} -> {reverse_out}"
    )]
    NoProfitableDirection {
        forward_in: U256,
        forward_out: U256,
        reverse_in: U256,
        reverse_out: U256,
    },

    #[error("Router unavailable: {reason}")]
    RouterUnavailable { reason: String },

    #[error("Insufficient balance of {asset:?}: requested {requested}, available {available}")]
    InsufficientBalance {
        asset: Address,
        requested: U256,
        available: U256,
    },

    /// A transaction was sent but its result could not be observed. Holdings
    /// may or may not have moved; check the transaction before retrying.
    #[error("Settlement outcome unknown for transaction {tx_hash:?}: {reason}")]
    SettlementUnknown { tx_hash: H256, reason: String },

    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    #[error("Quote calculation error: {0}")]
    Math(#[from] AmmError),
}

/// Coarse classification callers can match on without destructuring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    NoProfit,
    NoProfitableDirection,
    RouterUnavailable,
    SettlementUnknown,
    InsufficientBalance,
    InvalidRequest,
    Math,
}

impl ArbitrageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ArbitrageError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ArbitrageError::NoProfit { .. } => ErrorKind::NoProfit,
            ArbitrageError::NoProfitableDirection { .. } => ErrorKind::NoProfitableDirection,
            ArbitrageError::RouterUnavailable { .. } => ErrorKind::RouterUnavailable,
            ArbitrageError::SettlementUnknown { .. } => ErrorKind::SettlementUnknown,
            ArbitrageError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            ArbitrageError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            ArbitrageError::Math(_) => ErrorKind::Math,
        }
    }

    /// The profitability guard refused the trade; not an operational fault
    pub fn is_no_profit(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NoProfit | ErrorKind::NoProfitableDirection
        )
    }
}

pub type Result<T> = std::result::Result<T, ArbitrageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_profit_is_expected_outcome() {
        let err = ArbitrageError::NoProfit {
            amount_in: U256::from(1000),
            amount_out: U256::from(996),
        };
        assert!(err.is_no_profit());
        assert!(err.to_string().contains("does not exceed input"));

        let err = ArbitrageError::Unauthorized {
            caller: Address::zero(),
        };
        assert!(!err.is_no_profit());
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn test_unconfirmed_settlement_is_not_router_unavailable() {
        use crate::ledger::LedgerError;
        use crate::router::RouterError;

        let tx_hash = H256::repeat_byte(0x5a);
        let swap: ArbitrageError = RouterError::OutcomeUnknown {
            tx_hash,
            reason: "connection reset".to_string(),
        }
        .into();
        let transfer: ArbitrageError = LedgerError::OutcomeUnknown {
            tx_hash,
            reason: "connection reset".to_string(),
        }
        .into();

        for err in [swap, transfer] {
            assert_eq!(err.kind(), ErrorKind::SettlementUnknown);
            assert!(matches!(err, ArbitrageError::SettlementUnknown { tx_hash: hash, .. } if hash == tx_hash));
        }

        let reverted: ArbitrageError = RouterError::Rejected("reverted".to_string()).into();
        assert_eq!(reverted.kind(), ErrorKind::RouterUnavailable);
    }

    #[test]
    fn test_amm_errors_convert() {
        let err: ArbitrageError = AmmError::Overflow { operation: "test" }.into();
        assert_eq!(err.kind(), ErrorKind::Math);
    }
}
