//! Direction selection: quote both ways through the pair and pick the profitable one
//!
//! Both directions of a selection are priced from a single reserve snapshot,
//! so the comparison never mixes two different pool states.

use ethers::types::U256;
use stable_amm::{AmmPool, FeeRate, V2PoolState};

use crate::error::{ArbitrageError, Result};
use crate::log_search;
use crate::router::{orient, ReserveReader, Router};
use crate::types::{AssetPair, Direction, PairReserves, Quote, SwapPath};

pub struct DirectionSelector<R> {
    pair: AssetPair,
    reader: ReserveReader<R>,
    fee: FeeRate,
}

impl<R: Router> DirectionSelector<R> {
    pub fn new(pair: AssetPair, reader: ReserveReader<R>, fee: FeeRate) -> Self {
        Self { pair, reader, fee }
    }

    pub fn pair(&self) -> &AssetPair {
        &self.pair
    }

    pub fn reader(&self) -> &ReserveReader<R> {
        &self.reader
    }

    pub fn path_for(&self, direction: Direction) -> SwapPath {
        self.pair.path(direction)
    }

    /// Quote `amount_in` in the requested direction against fresh reserves.
    ///
    /// A zero input still reads reserves and reports the requested path.
    pub async fn quote_for(&self, amount_in: U256, direction: Direction) -> Result<Quote> {
        let path = self.path_for(direction);
        let snapshot = self.reader.snapshot(&path).await?;
        self.quote_against(&snapshot, amount_in, direction)
    }

    /// Quote both directions, each with its own input amount, and select the profitable one
    pub async fn best_direction(
        &self,
        forward_in: U256,
        reverse_in: U256,
    ) -> Result<(Direction, Quote)> {
        let snapshot = self
            .reader
            .snapshot(&self.path_for(Direction::FirstToSecond))
            .await?;

        let forward = self.quote_against(&snapshot, forward_in, Direction::FirstToSecond)?;
        let reverse = self.quote_against(&snapshot, reverse_in, Direction::SecondToFirst)?;
        select_direction(forward, reverse)
    }

    /// Same input amount in both directions
    pub async fn best_direction_for(&self, amount_in: U256) -> Result<(Direction, Quote)> {
        self.best_direction(amount_in, amount_in).await
    }

    fn quote_against(
        &self,
        snapshot: &PairReserves,
        amount_in: U256,
        direction: Direction,
    ) -> Result<Quote> {
        let path = self.path_for(direction);
        let reserves = orient(snapshot, &path)?;
        let pool = V2PoolState {
            reserve_in: reserves.reserve_in,
            reserve_out: reserves.reserve_out,
            fee: self.fee,
        };
        let amount_out = pool.get_amount_out(amount_in)?;

        log_search!(
            "Quote {}: {} -> {}",
            direction,
            self.pair.input_asset(direction).format_amount(amount_in),
            self.pair.output_asset(direction).format_amount(amount_out)
        );

        Ok(Quote {
            amount_in,
            amount_out,
            path,
        })
    }
}

/// Pick the direction whose output strictly exceeds its input.
///
/// First->second wins when both qualify; neither qualifying is `NoProfitableDirection`.
pub fn select_direction(forward: Quote, reverse: Quote) -> Result<(Direction, Quote)> {
    if forward.is_profitable() {
        return Ok((Direction::FirstToSecond, forward));
    }
    if reverse.is_profitable() {
        return Ok((Direction::SecondToFirst, reverse));
    }
    Err(ArbitrageError::NoProfitableDirection {
        forward_in: forward.amount_in,
        forward_out: forward.amount_out,
        reverse_in: reverse.amount_in,
        reverse_out: reverse.amount_out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Asset;
    use ethers::types::Address;

    fn quotes(forward: (u64, u64), reverse: (u64, u64)) -> (Quote, Quote) {
        let pair = AssetPair::new(
            Asset::new(Address::from_low_u64_be(1), "USDT", 6),
            Asset::new(Address::from_low_u64_be(2), "USDC", 6),
        )
        .unwrap();
        (
            Quote {
                amount_in: U256::from(forward.0),
                amount_out: U256::from(forward.1),
                path: pair.path(Direction::FirstToSecond),
            },
            Quote {
                amount_in: U256::from(reverse.0),
                amount_out: U256::from(reverse.1),
                path: pair.path(Direction::SecondToFirst),
            },
        )
    }

    #[test]
    fn test_selects_profitable_reverse() {
        let (forward, reverse) = quotes((1000, 996), (1000, 1004));
        let (direction, quote) = select_direction(forward, reverse).unwrap();
        assert_eq!(direction, Direction::SecondToFirst);
        assert_eq!(quote, reverse);
    }

    #[test]
    fn test_tie_break_prefers_first_to_second() {
        let (forward, reverse) = quotes((1000, 1001), (1000, 1010));
        let (direction, _) = select_direction(forward, reverse).unwrap();
        assert_eq!(direction, Direction::FirstToSecond);
    }

    #[tokio::test]
    async fn test_single_amount_selection_against_skewed_pool() {
        use crate::sim::SimulatedExchange;
        use std::sync::Arc;

        let pair = AssetPair::new(
            Asset::new(Address::from_low_u64_be(1), "USDT", 6),
            Asset::new(Address::from_low_u64_be(2), "USDC", 6),
        )
        .unwrap();
        let exchange = SimulatedExchange::new(FeeRate::UNISWAP_V2);
        // Second is plentiful in the pool, so buying it with first pays
        exchange.set_reserves(
            pair.first().address,
            pair.second().address,
            U256::from(1_000_000_000u64),
            U256::from(1_200_000_000u64),
        );
        let selector = DirectionSelector::new(
            pair.clone(),
            ReserveReader::new(Arc::new(exchange)),
            FeeRate::UNISWAP_V2,
        );

        let (direction, quote) = selector
            .best_direction_for(U256::from(1_000_000u64))
            .await
            .unwrap();
        assert_eq!(direction, Direction::FirstToSecond);
        assert_eq!(quote.amount_in, U256::from(1_000_000u64));
        assert!(quote.amount_out > quote.amount_in);
    }

    #[test]
    fn test_equal_output_is_not_profit() {
        let (forward, reverse) = quotes((1000, 1000), (0, 0));
        let err = select_direction(forward, reverse).unwrap_err();
        assert!(matches!(
            err,
            ArbitrageError::NoProfitableDirection { forward_out, .. } if forward_out == U256::from(1000)
        ));
    }
}
