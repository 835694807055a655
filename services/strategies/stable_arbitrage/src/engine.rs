//! Engine facade: the public operations over the quoting and settlement components
//!
//! Read operations take `&self`. Swaps and withdrawals take `&mut self`, so a
//! state-changing call always runs to completion, reserve read and settlement
//! included, before the next one can start.

use ethers::types::{Address, U256};
use stable_amm::FeeRate;
use std::sync::Arc;

use crate::access::AccessController;
use crate::balances::BalanceReporter;
use crate::config::ArbitrageConfig;
use crate::detector::DirectionSelector;
use crate::error::{ErrorKind, Result};
use crate::executor::SwapExecutor;
use crate::ledger::Ledger;
use crate::log_error;
use crate::metrics::{EngineMetrics, MetricsCollector};
use crate::router::{ReserveReader, Router};
use crate::types::{AssetPair, Direction, Holdings, Quote, SwapReceipt};
use crate::withdrawal::Withdrawal;

pub struct ArbitrageEngine<R, L> {
    selector: Arc<DirectionSelector<R>>,
    balances: BalanceReporter<L>,
    executor: SwapExecutor<R, L>,
    withdrawal: Withdrawal<L>,
    access: AccessController,
    metrics: Arc<MetricsCollector>,
}

impl<R: Router, L: Ledger> ArbitrageEngine<R, L> {
    /// Wire an engine whose holdings belong to `account` in `ledger`
    pub fn new(
        pair: AssetPair,
        owner: Address,
        account: Address,
        fee: FeeRate,
        router: Arc<R>,
        ledger: Arc<L>,
    ) -> Result<Self> {
        fee.validate()?;

        let access = AccessController::new(owner);
        let metrics = Arc::new(MetricsCollector::new());
        let selector = Arc::new(DirectionSelector::new(
            pair.clone(),
            ReserveReader::new(router),
            fee,
        ));
        let balances = BalanceReporter::new(ledger.clone(), pair, account);
        let executor = SwapExecutor::new(
            selector.clone(),
            balances.clone(),
            access,
            metrics.clone(),
        );
        let withdrawal = Withdrawal::new(ledger, balances.clone(), access);

        Ok(Self {
            selector,
            balances,
            executor,
            withdrawal,
            access,
            metrics,
        })
    }

    pub fn from_config(
        config: &ArbitrageConfig,
        account: Address,
        router: Arc<R>,
        ledger: Arc<L>,
    ) -> anyhow::Result<Self> {
        config.validate()?;
        let pair = config.asset_pair()?;
        Ok(Self::new(
            pair,
            config.owner,
            account,
            config.router.fee,
            router,
            ledger,
        )?)
    }

    pub fn pair(&self) -> &AssetPair {
        self.selector.pair()
    }

    pub fn owner(&self) -> Address {
        self.access.owner()
    }

    pub fn account(&self) -> Address {
        self.balances.account()
    }

    pub fn metrics(&self) -> EngineMetrics {
        self.metrics.get_metrics()
    }

    /// Current holdings of both tracked assets
    pub async fn balances(&self) -> Result<Holdings> {
        let result = self.balances.balances().await;
        self.track(result)
    }

    /// Quote each direction with its own full holdings and return the profitable one
    pub async fn quote_both_directions(&self) -> Result<Quote> {
        let result = self.quote_holdings().await;
        self.metrics.increment_quotes();
        self.track(result)
    }

    async fn quote_holdings(&self) -> Result<Quote> {
        let holdings = self.balances.balances().await?;
        let (_, quote) = self
            .selector
            .best_direction(holdings.first, holdings.second)
            .await?;
        Ok(quote)
    }

    /// Quote an explicit amount in an explicit direction; no profitability judgment
    pub async fn quote_directed(&self, amount_in: U256, is_first_to_second: bool) -> Result<Quote> {
        let result = self
            .selector
            .quote_for(amount_in, Direction::from_flag(is_first_to_second))
            .await;
        self.metrics.increment_quotes();
        self.track(result)
    }

    /// Owner only: swap the full holdings of the requested side if that is profitable
    pub async fn execute_directed(
        &mut self,
        caller: Address,
        is_first_to_second: bool,
    ) -> Result<SwapReceipt> {
        let result = self
            .executor
            .execute_directed(caller, Direction::from_flag(is_first_to_second))
            .await;
        self.track(result)
    }

    /// Owner only: swap whichever side is profitable
    pub async fn execute_auto(&mut self, caller: Address) -> Result<SwapReceipt> {
        let result = self.executor.execute_auto(caller).await;
        self.track(result)
    }

    /// Owner only: send `amount` of `asset` to `recipient`
    pub async fn withdraw(
        &mut self,
        caller: Address,
        asset: Address,
        amount: U256,
        recipient: Address,
    ) -> Result<()> {
        let result = self
            .withdrawal
            .withdraw(caller, asset, amount, recipient)
            .await;
        if result.is_ok() {
            self.metrics.increment_withdrawals();
        }
        self.track(result)
    }

    fn track<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            match e.kind() {
                ErrorKind::NoProfit => self.metrics.increment_no_profit(),
                ErrorKind::NoProfitableDirection => {}
                ErrorKind::Unauthorized => self.metrics.increment_unauthorized(),
                _ => {
                    self.metrics.increment_errors();
                    log_error!("Engine operation failed: {}", e);
                }
            }
        }
        result
    }
}
