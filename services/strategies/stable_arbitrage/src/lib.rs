//! # Stable Arbitrage - Two-Token Constant-Product Arbitrage Engine
//!
//! ## Purpose
//!
//! Holds balances of two stable assets and swaps the full holdings of one side
//! for the other through a Uniswap V2 style router, but only when the quoted
//! output strictly exceeds the input amount. Both assets track the same unit of
//! account, so "more units out than in" is the whole profitability test.
//!
//! ## Integration Points
//!
//! - **Router**: pair reserves and swap settlement ([`router::Router`])
//! - **Ledger**: token balances and transfers ([`ledger::Ledger`])
//! - **Backends**: [`chain::ChainClient`] over JSON-RPC, [`sim::SimulatedExchange`] in memory
//! - **Configuration**: [`config::ArbitrageConfig`] from TOML/JSON plus `STABLE_ARB_*` overrides
//!
//! ## Architecture Role
//!
//! ```text
//! BalanceReporter ─┐
//!                  ├→ DirectionSelector → SwapExecutor → Router::swap(min_out = quote)
//! ReserveReader ───┘          ↑                 ↑
//!                      quote operations   AccessController
//!
//! Withdrawal → AccessController → Ledger::transfer
//! ```
//!
//! [`engine::ArbitrageEngine`] wires the components together and exposes the
//! public operations: `balances`, `quote_both_directions`, `quote_directed`,
//! `execute_directed`, `execute_auto` and `withdraw`.

pub mod logging;

pub mod access;
pub mod balances;
pub mod chain;
pub mod config;
pub mod detector;
pub mod engine;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod metrics;
pub mod router;
pub mod sim;
pub mod types;
pub mod withdrawal;

pub use config::ArbitrageConfig;
pub use engine::ArbitrageEngine;
pub use error::{ArbitrageError, ErrorKind, Result};
pub use ledger::Ledger;
pub use router::Router;
pub use sim::SimulatedExchange;
pub use stable_amm::FeeRate;
pub use types::{Asset, AssetPair, Direction, Holdings, Quote, SwapPath, SwapReceipt};
