//! Exchange router capability and the reserve reader built on it
//!
//! The router is consumed through the [`Router`] trait so any constant-product
//! venue (a live Uniswap V2 deployment, the in-memory simulator) can back the
//! engine. [`ReserveReader`] turns the router's canonical pair view into
//! reserves ordered for a specific swap path.

use async_trait::async_trait;
use ethers::types::{Address, H256, U256};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::error::{ArbitrageError, Result};
use crate::types::{PairReserves, Reserves, SwapPath};

#[derive(Debug, Error)]
pub enum RouterError {
    #[error("router unreachable: {0}")]
    Unreachable(String),

    #[error("no pair for {token_a:?}/{token_b:?}")]
    PairNotFound { token_a: Address, token_b: Address },

    #[error("insufficient output: minimum {minimum}, would receive {actual}")]
    InsufficientOutput { minimum: U256, actual: U256 },

    #[error("swap rejected: {0}")]
    Rejected(String),

    /// Submitted but not confirmed either way; the swap may have settled
    #[error("swap {tx_hash:?} outcome unknown: {reason}")]
    OutcomeUnknown { tx_hash: H256, reason: String },
}

impl From<RouterError> for ArbitrageError {
    fn from(err: RouterError) -> Self {
        match err {
            RouterError::OutcomeUnknown { tx_hash, reason } => {
                ArbitrageError::SettlementUnknown { tx_hash, reason }
            }
            other => ArbitrageError::RouterUnavailable {
                reason: other.to_string(),
            },
        }
    }
}

/// Constant-product exchange router
#[async_trait]
pub trait Router: Send + Sync {
    /// Current reserves of the `token_a`/`token_b` pair in canonical order
    async fn pair_reserves(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> std::result::Result<PairReserves, RouterError>;

    /// Swap exactly `amount_in` of `path.input()` held by `account` for at least
    /// `amount_out_min` of `path.output()`, paid back to `account`.
    ///
    /// All-or-nothing: on any error no balance has moved. Returns the realized output.
    async fn swap(
        &self,
        path: &SwapPath,
        amount_in: U256,
        amount_out_min: U256,
        account: Address,
    ) -> std::result::Result<U256, RouterError>;
}

/// Reads fresh reserves for a swap path on every call
pub struct ReserveReader<R> {
    router: Arc<R>,
}

impl<R> Clone for ReserveReader<R> {
    fn clone(&self) -> Self {
        Self {
            router: self.router.clone(),
        }
    }
}

impl<R: Router> ReserveReader<R> {
    pub fn new(router: Arc<R>) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Arc<R> {
        &self.router
    }

    /// One router read of the pair behind `path`, rejected if the pair is empty
    pub async fn snapshot(&self, path: &SwapPath) -> Result<PairReserves> {
        let snapshot = self
            .router
            .pair_reserves(path.input(), path.output())
            .await?;

        if snapshot.reserve0.is_zero() || snapshot.reserve1.is_zero() {
            warn!("Pair for path {} has no liquidity", path);
            return Err(ArbitrageError::RouterUnavailable {
                reason: format!("pair for path {} has no liquidity", path),
            });
        }

        debug!(
            "Pair {:?}/{:?} reserves: {} / {}",
            snapshot.token0, snapshot.token1, snapshot.reserve0, snapshot.reserve1
        );
        Ok(snapshot)
    }

    /// Reserves ordered as `(reserve_in, reserve_out)` for `path`
    pub async fn reserves_for(&self, path: &SwapPath) -> Result<Reserves> {
        let snapshot = self.snapshot(path).await?;
        orient(&snapshot, path)
    }
}

/// Order a canonical snapshot for `path`; fails if the router answered for another pair
pub fn orient(snapshot: &PairReserves, path: &SwapPath) -> Result<Reserves> {
    snapshot
        .oriented(path)
        .ok_or_else(|| ArbitrageError::RouterUnavailable {
            reason: format!(
                "router returned pair {:?}/{:?} for path {}",
                snapshot.token0, snapshot.token1, path
            ),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sim::SimulatedExchange;
    use crate::types::{Asset, AssetPair, Direction};
    use stable_amm::FeeRate;

    fn setup(reserve_first: u64, reserve_second: u64) -> (ReserveReader<SimulatedExchange>, AssetPair) {
        // First sorts above second, so the pair's canonical order is reversed
        let pair = AssetPair::new(
            Asset::new(Address::repeat_byte(0xcc), "USDT", 6),
            Asset::new(Address::repeat_byte(0x0c), "USDC", 6),
        )
        .unwrap();
        let exchange = SimulatedExchange::new(FeeRate::UNISWAP_V2);
        exchange.set_reserves(
            pair.first().address,
            pair.second().address,
            U256::from(reserve_first),
            U256::from(reserve_second),
        );
        (ReserveReader::new(Arc::new(exchange)), pair)
    }

    #[tokio::test]
    async fn test_reserves_follow_path_order() {
        let (reader, pair) = setup(700, 300);

        let forward = reader
            .reserves_for(&pair.path(Direction::FirstToSecond))
            .await
            .unwrap();
        let backward = reader
            .reserves_for(&pair.path(Direction::SecondToFirst))
            .await
            .unwrap();

        assert_eq!((forward.reserve_in, forward.reserve_out), (U256::from(700), U256::from(300)));
        assert_eq!((backward.reserve_in, backward.reserve_out), (U256::from(300), U256::from(700)));
    }

    #[tokio::test]
    async fn test_empty_pair_is_unavailable() {
        let (reader, pair) = setup(0, 300);
        let err = reader
            .reserves_for(&pair.path(Direction::FirstToSecond))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RouterUnavailable);
    }

    #[test]
    fn test_orient_rejects_foreign_pair() {
        let (_, pair) = setup(1, 1);
        let snapshot = PairReserves {
            token0: Address::repeat_byte(0x01),
            token1: Address::repeat_byte(0x02),
            reserve0: U256::one(),
            reserve1: U256::one(),
        };
        let err = orient(&snapshot, &pair.path(Direction::FirstToSecond)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RouterUnavailable);
    }
}
