//! # Chain Backend - Uniswap V2 Router and ERC-20 Ledger over JSON-RPC
//!
//! ## Purpose
//!
//! Live implementation of the [`Router`] and [`Ledger`] capabilities against a
//! Uniswap V2 compatible deployment. The engine's holdings are the ERC-20
//! balances of the signing account; swaps go through
//! `swapExactTokensForTokens` with the quoted output as `amountOutMin`, so the
//! router reverts the whole transaction instead of settling below the quote.
//!
//! ## Integration Points
//!
//! - **Reserves**: `factory()` → `getPair(a, b)` → `getReserves()`; the pair's
//!   canonical order is the address sort order, as the factory assigns it
//! - **Settlement**: ERC-20 `approve` for the router on first use, then the swap
//! - **Realized output**: output token `Transfer` events to the account in the
//!   mined receipt; once a receipt is seen no further reads can fail the swap
//! - **Unconfirmed sends**: a transaction that was sent but whose receipt could
//!   not be read is reported as outcome-unknown with its hash, never as a
//!   failure that moved nothing

use async_trait::async_trait;
use ethers::prelude::*;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::ledger::{Ledger, LedgerError};
use crate::router::{Router, RouterError};
use crate::types::{PairReserves, SwapPath};

abigen!(
    IUniswapV2Router02,
    r#"[
        function factory() external view returns (address)
        function swapExactTokensForTokens(uint256 amountIn, uint256 amountOutMin, address[] path, address to, uint256 deadline) external returns (uint256[] amounts)
    ]"#
);

abigen!(
    IUniswapV2Factory,
    r#"[
        function getPair(address tokenA, address tokenB) external view returns (address pair)
    ]"#
);

abigen!(
    IUniswapV2Pair,
    r#"[
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast)
    ]"#
);

abigen!(
    IERC20,
    r#"[
        function balanceOf(address account) external view returns (uint256)
        function allowance(address owner, address spender) external view returns (uint256)
        function approve(address spender, uint256 amount) external returns (bool)
        function transfer(address to, uint256 amount) external returns (bool)
    ]"#
);

/// Router and ledger backed by a signing middleware
pub struct ChainClient<M> {
    client: Arc<M>,
    router: IUniswapV2Router02<M>,
    account: Address,
    deadline: Duration,
}

impl<M: Middleware + 'static> ChainClient<M> {
    /// `account` must be the address `client` signs for
    pub fn new(client: Arc<M>, router_address: Address, account: Address, deadline: Duration) -> Self {
        let router = IUniswapV2Router02::new(router_address, client.clone());
        Self {
            client,
            router,
            account,
            deadline,
        }
    }

    fn token(&self, asset: Address) -> IERC20<M> {
        IERC20::new(asset, self.client.clone())
    }

    async fn pair_address(&self, token_a: Address, token_b: Address) -> Result<Address, RouterError> {
        let factory_address = self
            .router
            .factory()
            .call()
            .await
            .map_err(|e| RouterError::Unreachable(e.to_string()))?;
        let factory = IUniswapV2Factory::new(factory_address, self.client.clone());
        let pair = factory
            .get_pair(token_a, token_b)
            .call()
            .await
            .map_err(|e| RouterError::Unreachable(e.to_string()))?;

        if pair.is_zero() {
            return Err(RouterError::PairNotFound { token_a, token_b });
        }
        Ok(pair)
    }

    /// Approve the router for `asset` when the current allowance cannot cover `amount`
    async fn ensure_allowance(&self, asset: Address, amount: U256) -> Result<(), RouterError> {
        let token = self.token(asset);
        let spender = self.router.address();
        let allowance = token
            .allowance(self.account, spender)
            .call()
            .await
            .map_err(|e| RouterError::Unreachable(e.to_string()))?;
        if allowance >= amount {
            return Ok(());
        }

        info!("Approving router {:?} to spend {:?}", spender, asset);
        let call = token.approve(spender, U256::MAX);
        let pending = call
            .send()
            .await
            .map_err(|e| RouterError::Rejected(format!("approve failed: {}", e)))?;
        let tx_hash = pending.tx_hash();
        match classify(pending.await, "approve") {
            Ok(_) => Ok(()),
            Err(Unsettled::Reverted(reason)) => Err(RouterError::Rejected(reason)),
            Err(Unsettled::Unknown(reason)) => Err(RouterError::OutcomeUnknown { tx_hash, reason }),
        }
    }

    fn deadline(&self) -> Result<U256, RouterError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| RouterError::Rejected(format!("system clock before epoch: {}", e)))?;
        Ok(U256::from((now + self.deadline).as_secs()))
    }

    async fn token_balance(&self, asset: Address, holder: Address) -> Result<U256, ContractError<M>> {
        self.token(asset).balance_of(holder).call().await
    }
}

/// Why a sent transaction cannot be treated as settled
#[derive(Debug)]
enum Unsettled {
    /// Mined and reverted; nothing was applied
    Reverted(String),
    /// No receipt could be observed; it may still have been applied
    Unknown(String),
}

/// Classify the result of polling a sent transaction for its receipt
fn classify(
    polled: Result<Option<TransactionReceipt>, ProviderError>,
    action: &str,
) -> Result<TransactionReceipt, Unsettled> {
    match polled {
        Ok(Some(receipt)) if receipt.status == Some(U64::from(1)) => Ok(receipt),
        Ok(Some(receipt)) => Err(Unsettled::Reverted(format!(
            "{} reverted in transaction {:?}",
            action, receipt.transaction_hash
        ))),
        Ok(None) => Err(Unsettled::Unknown(format!(
            "{} sent but no receipt was returned",
            action
        ))),
        Err(e) => Err(Unsettled::Unknown(format!(
            "{} sent but receipt polling failed: {}",
            action, e
        ))),
    }
}

/// keccak256("Transfer(address,address,uint256)")
fn transfer_topic() -> H256 {
    H256::from(ethers::utils::keccak256("Transfer(address,address,uint256)"))
}

/// Total of `token` Transfer events paying `recipient` in a receipt's logs
fn received_from_logs(logs: &[Log], token: Address, recipient: Address) -> U256 {
    let topic = transfer_topic();
    logs.iter()
        .filter(|log| log.address == token)
        .filter(|log| log.topics.len() == 3 && log.topics[0] == topic)
        .filter(|log| Address::from(log.topics[2]) == recipient)
        .filter(|log| log.data.len() >= 32)
        .fold(U256::zero(), |total, log| {
            total.saturating_add(U256::from_big_endian(&log.data.as_ref()[..32]))
        })
}

#[async_trait]
impl<M: Middleware + 'static> Router for ChainClient<M> {
    async fn pair_reserves(
        &self,
        token_a: Address,
        token_b: Address,
    ) -> Result<PairReserves, RouterError> {
        let pair_address = self.pair_address(token_a, token_b).await?;
        let pair = IUniswapV2Pair::new(pair_address, self.client.clone());
        let (reserve0, reserve1, _) = pair
            .get_reserves()
            .call()
            .await
            .map_err(|e| RouterError::Unreachable(e.to_string()))?;

        let (token0, token1) = if token_a < token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        debug!(
            "Pair {:?} reserves: {} / {}",
            pair_address, reserve0, reserve1
        );

        Ok(PairReserves {
            token0,
            token1,
            reserve0: U256::from(reserve0),
            reserve1: U256::from(reserve1),
        })
    }

    async fn swap(
        &self,
        path: &SwapPath,
        amount_in: U256,
        amount_out_min: U256,
        account: Address,
    ) -> Result<U256, RouterError> {
        if account != self.account {
            return Err(RouterError::Rejected(format!(
                "can only swap for the signing account {:?}",
                self.account
            )));
        }

        self.ensure_allowance(path.input(), amount_in).await?;

        let call = self.router.swap_exact_tokens_for_tokens(
            amount_in,
            amount_out_min,
            path.to_vec(),
            account,
            self.deadline()?,
        );
        let pending = call
            .send()
            .await
            .map_err(|e| RouterError::Rejected(e.to_string()))?;
        let tx_hash = pending.tx_hash();
        debug!("Swap submitted: {:?}", tx_hash);

        let receipt = match classify(pending.await, "swap") {
            Ok(receipt) => receipt,
            Err(Unsettled::Reverted(reason)) => return Err(RouterError::Rejected(reason)),
            Err(Unsettled::Unknown(reason)) => {
                return Err(RouterError::OutcomeUnknown { tx_hash, reason })
            }
        };

        let received = received_from_logs(&receipt.logs, path.output(), account);
        if received.is_zero() {
            // The router enforces the floor, so a successful swap paid at least that
            warn!(
                "No output Transfer found in swap {:?}; reporting the minimum {}",
                tx_hash, amount_out_min
            );
            return Ok(amount_out_min);
        }
        Ok(received)
    }
}

#[async_trait]
impl<M: Middleware + 'static> Ledger for ChainClient<M> {
    async fn balance_of(&self, asset: Address, holder: Address) -> Result<U256, LedgerError> {
        self.token_balance(asset, holder)
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))
    }

    async fn transfer(
        &self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        if from != self.account {
            return Err(LedgerError::Unavailable(format!(
                "can only transfer from the signing account {:?}",
                self.account
            )));
        }

        let available = self.balance_of(asset, from).await?;
        if available < amount {
            return Err(LedgerError::InsufficientFunds {
                asset,
                holder: from,
                requested: amount,
                available,
            });
        }

        let token = self.token(asset);
        let call = token.transfer(to, amount);
        let pending = call
            .send()
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;
        let tx_hash = pending.tx_hash();
        match classify(pending.await, "transfer") {
            Ok(_) => Ok(()),
            Err(Unsettled::Reverted(reason)) => Err(LedgerError::Unavailable(reason)),
            Err(Unsettled::Unknown(reason)) => Err(LedgerError::OutcomeUnknown { tx_hash, reason }),
        }
    }
}
