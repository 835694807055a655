//! Standardized emoji logging for the stable arbitrage engine
//!
//! Keeps the same emoji per concern across quoting, execution and withdrawal
//! so operator logs can be scanned at a glance.

/// Standard emoji set for engine logging
pub struct LogEmoji;

impl LogEmoji {
    // Status indicators
    pub const SUCCESS: &'static str = "✅";
    pub const ERROR: &'static str = "❌";
    pub const BLOCKED: &'static str = "🚫";

    // Module-specific
    pub const SEARCH: &'static str = "🔍"; // Quoting/direction selection
    pub const CHART: &'static str = "📊"; // Balances
    pub const EXECUTE: &'static str = "⚡"; // Swap settlement
    pub const MONEY: &'static str = "💰"; // Profit
    pub const WITHDRAW: &'static str = "📤"; // Funds leaving the engine
}

#[macro_export]
macro_rules! log_success {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::SUCCESS, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        tracing::error!("{} {}", $crate::logging::LogEmoji::ERROR, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_blocked {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::BLOCKED, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_search {
    ($($arg:tt)*) => {
        tracing::debug!("{} {}", $crate::logging::LogEmoji::SEARCH, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_metrics {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::CHART, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_execution {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::EXECUTE, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_profit {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::MONEY, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_withdraw {
    ($($arg:tt)*) => {
        tracing::info!("{} {}", $crate::logging::LogEmoji::WITHDRAW, format!($($arg)*))
    };
}
