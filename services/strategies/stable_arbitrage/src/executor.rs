//! # Swap Executor - Guarded Atomic Settlement
//!
//! ## Purpose
//!
//! Turns a profitable quote into a settled swap and refuses everything else.
//! The engine's full holdings of the input side are quoted against fresh
//! reserves; only when the output strictly exceeds the input is the router
//! asked to settle, with the quoted output passed as the minimum it may pay.
//!
//! ## Execution Flow
//!
//! ```text
//! Owner Check → Holdings Read → Quote (fresh reserves) → Profit Guard → router.swap(min_out = quote)
//!      ↓                                                      ↓                  ↓
//! Unauthorized                                            NoProfit      RouterUnavailable (nothing moved)
//! ```
//!
//! Reserves can move between the quote and settlement. The minimum-output
//! floor makes the router reject a settlement that would pay less than the
//! quote, so a stale decision can never settle at a loss.

use ethers::types::{Address, U256};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::access::AccessController;
use crate::balances::BalanceReporter;
use crate::detector::DirectionSelector;
use crate::error::{ArbitrageError, Result};
use crate::ledger::Ledger;
use crate::metrics::MetricsCollector;
use crate::router::Router;
use crate::types::{Direction, Quote, SwapReceipt};
use crate::{log_blocked, log_execution, log_profit};

pub struct SwapExecutor<R, L> {
    selector: Arc<DirectionSelector<R>>,
    balances: BalanceReporter<L>,
    access: AccessController,
    metrics: Arc<MetricsCollector>,
}

impl<R: Router, L: Ledger> SwapExecutor<R, L> {
    pub fn new(
        selector: Arc<DirectionSelector<R>>,
        balances: BalanceReporter<L>,
        access: AccessController,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            selector,
            balances,
            access,
            metrics,
        }
    }

    /// Swap the full holdings of whichever side is profitable
    pub async fn execute_auto(&self, caller: Address) -> Result<SwapReceipt> {
        self.access.require_owner(caller)?;

        let holdings = self.balances.balances().await?;
        let selection = self
            .selector
            .best_direction(holdings.first, holdings.second)
            .await;

        let (direction, quote) = match selection {
            Ok(selected) => selected,
            Err(ArbitrageError::NoProfitableDirection {
                forward_in,
                forward_out,
                reverse_in,
                reverse_out,
            }) => {
                // Report the funded direction that came closest to breaking even
                let forward_short = forward_in.saturating_sub(forward_out);
                let reverse_short = reverse_in.saturating_sub(reverse_out);
                let report_forward = reverse_in.is_zero()
                    || (!forward_in.is_zero() && forward_short <= reverse_short);
                let (amount_in, amount_out) = if report_forward {
                    (forward_in, forward_out)
                } else {
                    (reverse_in, reverse_out)
                };
                return Err(self.refuse(amount_in, amount_out));
            }
            Err(e) => return Err(e),
        };

        debug!("Auto-selected direction {}", direction);
        self.settle(direction, quote).await
    }

    /// Swap the full holdings of the requested direction's input side
    pub async fn execute_directed(
        &self,
        caller: Address,
        direction: Direction,
    ) -> Result<SwapReceipt> {
        self.access.require_owner(caller)?;

        let input = self.selector.pair().input_asset(direction).address;
        let amount_in = self.balances.holding_of(input).await?;
        let quote = self.selector.quote_for(amount_in, direction).await?;

        if !quote.is_profitable() {
            return Err(self.refuse(quote.amount_in, quote.amount_out));
        }
        self.settle(direction, quote).await
    }

    fn refuse(&self, amount_in: U256, amount_out: U256) -> ArbitrageError {
        log_blocked!(
            "Swap refused: output {} does not exceed input {}",
            amount_out,
            amount_in
        );
        ArbitrageError::NoProfit {
            amount_in,
            amount_out,
        }
    }

    async fn settle(&self, direction: Direction, quote: Quote) -> Result<SwapReceipt> {
        let pair = self.selector.pair();
        let input = pair.input_asset(direction);
        let output = pair.output_asset(direction);
        let account = self.balances.account();

        log_execution!(
            "Settling {}: {} for at least {}",
            direction,
            input.format_amount(quote.amount_in),
            output.format_amount(quote.amount_out)
        );

        let before = self.balances.balances().await?;
        let amount_out = self
            .selector
            .reader()
            .router()
            .swap(&quote.path, quote.amount_in, quote.amount_out, account)
            .await?;

        let receipt = SwapReceipt {
            path: quote.path,
            amount_in: quote.amount_in,
            amount_out,
            quoted_out: quote.amount_out,
        };
        self.metrics.increment_swaps();

        // Postcondition check only; the settlement is already final
        match self.balances.balances().await {
            Ok(after) => {
                let spent = before
                    .input_for(direction)
                    .saturating_sub(after.input_for(direction));
                let received = after
                    .input_for(direction.reverse())
                    .saturating_sub(before.input_for(direction.reverse()));
                if spent != receipt.amount_in || received < receipt.quoted_out {
                    warn!(
                        "Holdings moved by spent={} received={}, receipt says in={} out={}",
                        spent, received, receipt.amount_in, receipt.amount_out
                    );
                }
            }
            Err(e) => warn!("Could not re-read holdings after settlement: {}", e),
        }

        log_profit!(
            "Swap settled {}: {} -> {} (profit {})",
            direction,
            input.format_amount(receipt.amount_in),
            output.format_amount(receipt.amount_out),
            receipt.amount_out.saturating_sub(receipt.amount_in)
        );
        Ok(receipt)
    }
}
