//! # Stable AMM Library - Exact Constant-Product Mathematics
//!
//! ## Purpose
//!
//! Integer-exact Automated Market Maker calculations for Uniswap V2 style
//! constant-product pairs. Quotes are computed the same way the pair contract
//! computes them on-chain, so a quote produced here is the exact amount a swap
//! settles for against the same reserves.
//!
//! ## Integration Points
//!
//! - **Input Sources**: Pair reserves read from a router, fee rate from configuration
//! - **Output Destinations**: Direction selection and swap execution in the arbitrage engine
//! - **Precision**: Raw token units (6 decimals for USDC/USDT), no rescaling
//! - **Overflow**: All intermediate products are carried in 512-bit width
//!
//! ## Architecture Role
//!
//! ```text
//! Pair Reserves ──┐
//! Fee Rate ───────┼──> [V2Math::get_amount_out] ──> Quote ──> Profit Guard
//! Amount In ──────┘
//! ```

pub mod pool_traits;
pub mod v2_math;

pub use pool_traits::AmmPool;
pub use v2_math::{AmmError, FeeRate, V2Math, V2PoolState};

/// Common integer types for AMM calculations
pub use ethers_core::types::{U256, U512};
