//! Pool trait definitions for unified AMM interface

use crate::{AmmError, V2Math, V2PoolState, U256};

/// Unified pool interface for quote calculations against a reserve snapshot
pub trait AmmPool {
    /// Calculate output amount for given input
    fn get_amount_out(&self, amount_in: U256) -> Result<U256, AmmError>;

    /// Calculate required input for desired output
    fn get_amount_in(&self, amount_out: U256) -> Result<U256, AmmError>;
}

impl AmmPool for V2PoolState {
    fn get_amount_out(&self, amount_in: U256) -> Result<U256, AmmError> {
        V2Math::get_amount_out(amount_in, self.reserve_in, self.reserve_out, self.fee)
    }

    fn get_amount_in(&self, amount_out: U256) -> Result<U256, AmmError> {
        V2Math::get_amount_in(amount_out, self.reserve_in, self.reserve_out, self.fee)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FeeRate;

    #[test]
    fn test_pool_quotes_match_v2_math() {
        let pool = V2PoolState {
            reserve_in: U256::from(1_000u64),
            reserve_out: U256::from(2_000u64),
            fee: FeeRate::UNISWAP_V2,
        };

        assert_eq!(pool.get_amount_out(U256::from(100u64)), Ok(U256::from(181u64)));
        assert_eq!(pool.get_amount_in(U256::from(181u64)), Ok(U256::from(100u64)));
    }
}
