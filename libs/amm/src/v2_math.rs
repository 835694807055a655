//! Uniswap V2 AMM math with exact integer calculations
//!
//! Mirrors the pair contract's `getAmountOut`/`getAmountIn` rounding so a
//! quote computed off the current reserves is exactly what settlement pays.

use ethers_core::types::{U256, U512};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when quote preconditions do not hold
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AmmError {
    #[error("Reserves must be positive (reserve_in={reserve_in}, reserve_out={reserve_out})")]
    ZeroReserves { reserve_in: U256, reserve_out: U256 },

    #[error("Invalid fee rate {numerator}/{denominator}: numerator must be below denominator")]
    InvalidFee { numerator: u32, denominator: u32 },

    #[error("Insufficient liquidity: requested output {amount_out} >= reserve {reserve_out}")]
    InsufficientLiquidity { amount_out: U256, reserve_out: U256 },

    #[error("Arithmetic overflow in {operation}")]
    Overflow { operation: &'static str },
}

/// Proportional swap fee deducted from the input amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRate {
    pub numerator: u32,
    pub denominator: u32,
}

impl FeeRate {
    /// Uniswap V2 pair fee: 0.3%
    pub const UNISWAP_V2: FeeRate = FeeRate {
        numerator: 3,
        denominator: 1000,
    };

    pub fn new(numerator: u32, denominator: u32) -> Result<Self, AmmError> {
        let fee = Self {
            numerator,
            denominator,
        };
        fee.validate()?;
        Ok(fee)
    }

    /// Fee in basis points (30 = 0.3%)
    pub fn from_bps(fee_bps: u32) -> Result<Self, AmmError> {
        Self::new(fee_bps, 10_000)
    }

    pub fn validate(&self) -> Result<(), AmmError> {
        if self.denominator == 0 || self.numerator >= self.denominator {
            return Err(AmmError::InvalidFee {
                numerator: self.numerator,
                denominator: self.denominator,
            });
        }
        Ok(())
    }

    /// Share of the input that reaches the pool, scaled by `denominator`
    pub fn multiplier(&self) -> u32 {
        self.denominator - self.numerator
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self::UNISWAP_V2
    }
}

/// Pool reserves and fee structure for V2 AMMs, ordered as (input, output)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V2PoolState {
    pub reserve_in: U256,
    pub reserve_out: U256,
    pub fee: FeeRate,
}

/// V2 AMM math functions with zero precision loss
pub struct V2Math;

impl V2Math {
    /// Calculate exact output amount for Uniswap V2 using x*y=k formula
    ///
    /// # Arguments
    /// * `amount_in` - Input token amount (raw token units)
    /// * `reserve_in` - Input token reserve (raw token units)
    /// * `reserve_out` - Output token reserve (raw token units)
    /// * `fee` - Proportional fee taken from the input
    ///
    /// # Returns
    /// Floor of `amount_in_with_fee * reserve_out / (reserve_in * denominator + amount_in_with_fee)`
    pub fn get_amount_out(
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee: FeeRate,
    ) -> Result<U256, AmmError> {
        // Zero input settles for zero output regardless of pool state
        if amount_in.is_zero() {
            return Ok(U256::zero());
        }
        fee.validate()?;
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::ZeroReserves {
                reserve_in,
                reserve_out,
            });
        }

        let amount_in_with_fee = amount_in.full_mul(U256::from(fee.multiplier()));
        let numerator = amount_in_with_fee
            .checked_mul(U512::from(reserve_out))
            .ok_or(AmmError::Overflow {
                operation: "amount_out numerator",
            })?;
        let denominator = reserve_in
            .full_mul(U256::from(fee.denominator))
            .checked_add(amount_in_with_fee)
            .ok_or(AmmError::Overflow {
                operation: "amount_out denominator",
            })?;

        // amount_out < reserve_out, so the quotient always fits back into 256 bits
        U256::try_from(numerator / denominator).map_err(|_| AmmError::Overflow {
            operation: "amount_out narrowing",
        })
    }

    /// Calculate required input amount for desired output (reverse calculation)
    ///
    /// Rounds up by one unit, as the pair contract does, so the returned input
    /// always buys at least `amount_out`.
    pub fn get_amount_in(
        amount_out: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee: FeeRate,
    ) -> Result<U256, AmmError> {
        if amount_out.is_zero() {
            return Ok(U256::zero());
        }
        fee.validate()?;
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(AmmError::ZeroReserves {
                reserve_in,
                reserve_out,
            });
        }
        if amount_out >= reserve_out {
            return Err(AmmError::InsufficientLiquidity {
                amount_out,
                reserve_out,
            });
        }

        let numerator = reserve_in
            .full_mul(amount_out)
            .checked_mul(U512::from(fee.denominator))
            .ok_or(AmmError::Overflow {
                operation: "amount_in numerator",
            })?;
        let denominator = (reserve_out - amount_out).full_mul(U256::from(fee.multiplier()));

        let amount_in = numerator / denominator + U512::one();
        U256::try_from(amount_in).map_err(|_| AmmError::Overflow {
            operation: "amount_in narrowing",
        })
    }

    /// True when swapping `amount_in` through the pool returns strictly more units
    pub fn is_profitable(pool: &V2PoolState, amount_in: U256) -> Result<bool, AmmError> {
        let amount_out = Self::get_amount_out(amount_in, pool.reserve_in, pool.reserve_out, pool.fee)?;
        Ok(amount_out > amount_in)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(value: u64) -> U256 {
        U256::from(value)
    }

    #[test]
    fn test_v2_output_calculation() {
        // 100 tokens in, 1000:2000 reserves, 0.3% fee => 181.32 floored
        let output = V2Math::get_amount_out(u(100), u(1000), u(2000), FeeRate::UNISWAP_V2).unwrap();
        assert_eq!(output, u(181));
    }

    #[test]
    fn test_v2_input_calculation_rounds_up() {
        let input = V2Math::get_amount_in(u(181), u(1000), u(2000), FeeRate::UNISWAP_V2).unwrap();
        assert_eq!(input, u(100));

        let output = V2Math::get_amount_out(input, u(1000), u(2000), FeeRate::UNISWAP_V2).unwrap();
        assert!(output >= u(181));
    }

    #[test]
    fn test_zero_input_short_circuits() {
        let output = V2Math::get_amount_out(U256::zero(), U256::zero(), U256::zero(), FeeRate::UNISWAP_V2);
        assert_eq!(output, Ok(U256::zero()));
    }

    #[test]
    fn test_zero_reserves_rejected() {
        let err = V2Math::get_amount_out(u(100), U256::zero(), u(2000), FeeRate::UNISWAP_V2).unwrap_err();
        assert!(matches!(err, AmmError::ZeroReserves { .. }));
    }

    #[test]
    fn test_invalid_fee_rejected() {
        assert!(FeeRate::new(1000, 1000).is_err());
        assert!(FeeRate::new(0, 0).is_err());
        assert_eq!(FeeRate::from_bps(30).unwrap().multiplier(), 9970);

        let bad = FeeRate {
            numerator: 5,
            denominator: 4,
        };
        let err = V2Math::get_amount_out(u(100), u(1000), u(2000), bad).unwrap_err();
        assert_eq!(
            err,
            AmmError::InvalidFee {
                numerator: 5,
                denominator: 4
            }
        );
    }

    #[test]
    fn test_output_cannot_drain_pool() {
        let err = V2Math::get_amount_in(u(2000), u(1000), u(2000), FeeRate::UNISWAP_V2).unwrap_err();
        assert!(matches!(err, AmmError::InsufficientLiquidity { .. }));
    }

    #[test]
    fn test_large_reserves_do_not_overflow() {
        // Whale-sized pool near the uint112 reserve cap
        let reserve = U256::from(u128::MAX >> 16);
        let output = V2Math::get_amount_out(reserve, reserve, reserve, FeeRate::UNISWAP_V2).unwrap();
        assert!(output < reserve);
        assert!(output > reserve / 2 - reserve / 100);
    }

    #[test]
    fn test_profitability_requires_skewed_pool() {
        let balanced = V2PoolState {
            reserve_in: u(1_000_000_000_000),
            reserve_out: u(1_000_000_000_000),
            fee: FeeRate::UNISWAP_V2,
        };
        assert!(!V2Math::is_profitable(&balanced, u(100_000_000)).unwrap());

        let skewed = V2PoolState {
            reserve_in: u(1_000_000_000_000),
            reserve_out: u(1_020_000_000_000),
            fee: FeeRate::UNISWAP_V2,
        };
        assert!(V2Math::is_profitable(&skewed, u(100_000_000)).unwrap());
    }
}
