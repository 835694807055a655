//! In-memory constant-product exchange and token ledger
//!
//! Backs the engine in tests and in `--simulate` mode. Pair reserves and token
//! balances live behind one mutex, so every swap and transfer is applied in
//! full or not at all, the same guarantee an on-chain transaction gives.

use async_trait::async_trait;
use ethers::types::{Address, U256};
use parking_lot::Mutex;
use stable_amm::{FeeRate, V2Math};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::config::SimulationConfig;
use crate::ledger::{Ledger, LedgerError};
use crate::router::{Router, RouterError};
use crate::types::{AssetPair, PairReserves, SwapPath};

#[derive(Debug, Default)]
struct ExchangeState {
    /// Keyed by canonical (token0, token1)
    pairs: HashMap<(Address, Address), (U256, U256)>,
    /// Keyed by (asset, holder)
    balances: HashMap<(Address, Address), U256>,
}

impl ExchangeState {
    fn balance(&self, asset: Address, holder: Address) -> U256 {
        self.balances
            .get(&(asset, holder))
            .copied()
            .unwrap_or_default()
    }

    fn debit(&mut self, asset: Address, holder: Address, amount: U256) -> Result<(), LedgerError> {
        let available = self.balance(asset, holder);
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                asset,
                holder,
                requested: amount,
                available,
            });
        }
        self.balances.insert((asset, holder), available - amount);
        Ok(())
    }

    fn credit(&mut self, asset: Address, holder: Address, amount: U256) {
        let entry = self.balances.entry((asset, holder)).or_default();
        *entry = entry.saturating_add(amount);
    }
}

/// Simulated Uniswap V2 style venue with its own token ledger
#[derive(Debug)]
pub struct SimulatedExchange {
    fee: FeeRate,
    state: Mutex<ExchangeState>,
    offline: AtomicBool,
}

fn canonical(token_a: Address, token_b: Address) -> (Address, Address) {
    if token_a < token_b {
        (token_a, token_b)
    } else {
        (token_b, token_a)
    }
}

impl SimulatedExchange {
    pub fn new(fee: FeeRate) -> Self {
        Self {
            fee,
            state: Mutex::new(ExchangeState::default()),
            offline: AtomicBool::new(false),
        }
    }

    /// Exchange holding one pair and the engine's starting balances
    pub fn seeded(pair: &AssetPair, fee: FeeRate, seed: &SimulationConfig) -> Self {
        let exchange = Self::new(fee);
        let (first, second) = (pair.first().address, pair.second().address);
        exchange.set_reserves(
            first,
            second,
            U256::from(seed.reserve_first),
            U256::from(seed.reserve_second),
        );
        exchange.mint(first, seed.account, U256::from(seed.holdings_first));
        exchange.mint(second, seed.account, U256::from(seed.holdings_second));
        exchange
    }

    /// Set reserves for a pair; `reserve_a` belongs to `token_a`
    pub fn set_reserves(&self, token_a: Address, token_b: Address, reserve_a: U256, reserve_b: U256) {
        let key = canonical(token_a, token_b);
        let value = if key.0 == token_a {
            (reserve_a, reserve_b)
        } else {
            (reserve_b, reserve_a)
        };
        self.state.lock().pairs.insert(key, value);
    }

    /// Reserves of a pair in `(token_a, token_b)` order
    pub fn reserves(&self, token_a: Address, token_b: Address) -> Option<(U256, U256)> {
        let key = canonical(token_a, token_b);
        let (reserve0, reserve1) = *self.state.lock().pairs.get(&key)?;
        Some(if key.0 == token_a {
            (reserve0, reserve1)
        } else {
            (reserve1, reserve0)
        })
    }

    pub fn mint(&self, asset: Address, holder: Address, amount: U256) {
        self.state.lock().credit(asset, holder, amount);
    }

    pub fn balance(&self, asset: Address, holder: Address) -> U256 {
        self.state.lock().balance(asset, holder)
    }

    /// Make router calls fail as if the node were unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), RouterError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RouterError::Unreachable("simulated router offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Router for SimulatedExchange {
    async fn pair_reserves(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<PairReserves, RouterError> {
        self.check_online()?;
        let (token0, token1) = canonical(token_a, token_b);
        let (reserve0, reserve1) = *self
            .state
            .lock()
            .pairs
            .get(&(token0, token1))
            .ok_or(RouterError::PairNotFound { token_a, token_b })?;

        Ok(PairReserves {
            token0,
            token1,
            reserve0,
            reserve1,
        })
    }

    async fn swap(
        &self,
        path: &SwapPath,
        amount_in: U256,
        amount_out_min: U256,
        account: Address,
    ) -> Result<U256, RouterError> {
        self.check_online()?;
        let (input, output) = (path.input(), path.output());
        let key = canonical(input, output);

        let mut state = self.state.lock();
        let (reserve0, reserve1) = *state.pairs.get(&key).ok_or(RouterError::PairNotFound {
            token_a: input,
            token_b: output,
        })?;
        let (reserve_in, reserve_out) = if key.0 == input {
            (reserve0, reserve1)
        } else {
            (reserve1, reserve0)
        };

        let amount_out = V2Math::get_amount_out(amount_in, reserve_in, reserve_out, self.fee)
            .map_err(|e| RouterError::Rejected(e.to_string()))?;
        if amount_out < amount_out_min {
            return Err(RouterError::InsufficientOutput {
                minimum: amount_out_min,
                actual: amount_out,
            });
        }

        let new_in = reserve_in
            .checked_add(amount_in)
            .ok_or_else(|| RouterError::Rejected("input reserve would overflow".to_string()))?;
        let new_out = reserve_out - amount_out;

        // Every check has passed; apply all effects under the same lock
        state
            .debit(input, account, amount_in)
            .map_err(|e| RouterError::Rejected(e.to_string()))?;
        state.credit(output, account, amount_out);

        let updated = if key.0 == input {
            (new_in, new_out)
        } else {
            (new_out, new_in)
        };
        state.pairs.insert(key, updated);

        debug!(
            "Simulated swap {}: {} in, {} out (min {})",
            path, amount_in, amount_out, amount_out_min
        );
        Ok(amount_out)
    }
}

#[async_trait]
impl Ledger for SimulatedExchange {
    async fn balance_of(&self, asset: Address, holder: Address) -> Result<U256, LedgerError> {
        Ok(self.balance(asset, holder))
    }

    async fn transfer(
        &self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.lock();
        state.debit(asset, from, amount)?;
        state.credit(asset, to, amount);
        Ok(())
    }
}
