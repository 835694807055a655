//! Engine activity counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of the engine's counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineMetrics {
    pub quotes_served: u64,
    pub swaps_executed: u64,
    pub no_profit_refusals: u64,
    pub unauthorized_attempts: u64,
    pub withdrawals: u64,
    pub errors: u64,
}

/// Thread-safe metrics collector
#[derive(Debug)]
pub struct MetricsCollector {
    quotes_served: AtomicU64,
    swaps_executed: AtomicU64,
    no_profit_refusals: AtomicU64,
    unauthorized_attempts: AtomicU64,
    withdrawals: AtomicU64,
    errors: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            quotes_served: AtomicU64::new(0),
            swaps_executed: AtomicU64::new(0),
            no_profit_refusals: AtomicU64::new(0),
            unauthorized_attempts: AtomicU64::new(0),
            withdrawals: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }

    pub fn increment_quotes(&self) {
        self.quotes_served.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_swaps(&self) {
        self.swaps_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_no_profit(&self) {
        self.no_profit_refusals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_unauthorized(&self) {
        self.unauthorized_attempts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_withdrawals(&self) {
        self.withdrawals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self) -> EngineMetrics {
        EngineMetrics {
            quotes_served: self.quotes_served.load(Ordering::Relaxed),
            swaps_executed: self.swaps_executed.load(Ordering::Relaxed),
            no_profit_refusals: self.no_profit_refusals.load(Ordering::Relaxed),
            unauthorized_attempts: self.unauthorized_attempts.load(Ordering::Relaxed),
            withdrawals: self.withdrawals.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
