//! Owner-only withdrawal of engine holdings

use ethers::types::{Address, U256};
use std::sync::Arc;

use crate::access::AccessController;
use crate::balances::BalanceReporter;
use crate::error::{ArbitrageError, Result};
use crate::ledger::Ledger;
use crate::log_withdraw;

pub struct Withdrawal<L> {
    ledger: Arc<L>,
    balances: BalanceReporter<L>,
    access: AccessController,
}

impl<L: Ledger> Withdrawal<L> {
    pub fn new(ledger: Arc<L>, balances: BalanceReporter<L>, access: AccessController) -> Self {
        Self {
            ledger,
            balances,
            access,
        }
    }

    /// Transfer exactly `amount` of `asset` from the engine to `recipient`
    pub async fn withdraw(
        &self,
        caller: Address,
        asset: Address,
        amount: U256,
        recipient: Address,
    ) -> Result<()> {
        self.access.require_owner(caller)?;

        if recipient.is_zero() {
            return Err(ArbitrageError::InvalidRequest {
                reason: "withdrawal recipient must not be the zero address".to_string(),
            });
        }

        let available = self.balances.holding_of(asset).await?;
        if amount > available {
            return Err(ArbitrageError::InsufficientBalance {
                asset,
                requested: amount,
                available,
            });
        }

        self.ledger
            .transfer(asset, self.balances.account(), recipient, amount)
            .await?;

        log_withdraw!(
            "Withdrew {} of {:?} to {:?} ({} remaining)",
            amount,
            asset,
            recipient,
            available - amount
        );
        Ok(())
    }
}
