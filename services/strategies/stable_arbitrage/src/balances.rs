//! Read-only reporting of the engine's holdings

use ethers::types::{Address, U256};
use std::sync::Arc;

use crate::error::Result;
use crate::ledger::Ledger;
use crate::types::{AssetPair, Holdings};

pub struct BalanceReporter<L> {
    ledger: Arc<L>,
    pair: AssetPair,
    account: Address,
}

impl<L> Clone for BalanceReporter<L> {
    fn clone(&self) -> Self {
        Self {
            ledger: self.ledger.clone(),
            pair: self.pair.clone(),
            account: self.account,
        }
    }
}

impl<L: Ledger> BalanceReporter<L> {
    pub fn new(ledger: Arc<L>, pair: AssetPair, account: Address) -> Self {
        Self {
            ledger,
            pair,
            account,
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub async fn balances(&self) -> Result<Holdings> {
        Ok(Holdings {
            first: self.holding_of(self.pair.first().address).await?,
            second: self.holding_of(self.pair.second().address).await?,
        })
    }

    pub async fn holding_of(&self, asset: Address) -> Result<U256> {
        Ok(self.ledger.balance_of(asset, self.account).await?)
    }
}
