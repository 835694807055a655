//! # Stable Arbitrage Configuration
//!
//! ## Purpose
//!
//! Construction-time parameters for the engine: the tracked asset pair, the
//! router endpoint and fee, and the owner. Loaded from TOML or JSON, with
//! environment variable overrides for deployment, and validated before the
//! engine is built. Nothing here changes after construction.
//!
//! ## Sources
//!
//! ```text
//! stable_arbitrage.toml / .json → [from_file] → [apply_env_overrides] → [validate] → ArbitrageEngine
//! STABLE_ARB_* environment ──────────────────────────↑
//! ```

use anyhow::{bail, Context, Result};
use ethers::types::{Address, H160};
use serde::{Deserialize, Serialize};
use stable_amm::FeeRate;
use std::path::Path;
use tracing::{info, warn};

use crate::types::{Asset, AssetPair, DEFAULT_DECIMALS};

/// Mainnet USDT
pub const USDT_MAINNET: Address = H160([
    0xda, 0xc1, 0x7f, 0x95, 0x8d, 0x2e, 0xe5, 0x23, 0xa2, 0x20, 0x62, 0x06, 0x99, 0x45, 0x97, 0xc1,
    0x3d, 0x83, 0x1e, 0xc7,
]);

/// Mainnet USDC
pub const USDC_MAINNET: Address = H160([
    0xa0, 0xb8, 0x69, 0x91, 0xc6, 0x21, 0x8b, 0x36, 0xc1, 0xd1, 0x9d, 0x4a, 0x2e, 0x9e, 0xb0, 0xce,
    0x36, 0x06, 0xeb, 0x48,
]);

/// Mainnet Uniswap V2 Router02
pub const UNISWAP_V2_ROUTER_MAINNET: Address = H160([
    0x7a, 0x25, 0x0d, 0x56, 0x30, 0xb4, 0xcf, 0x53, 0x97, 0x39, 0xdf, 0x2c, 0x5d, 0xac, 0xb4, 0xc6,
    0x59, 0xf2, 0x48, 0x8d,
]);

/// Complete engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbitrageConfig {
    /// Tracked assets
    pub pair: PairConfig,
    /// Exchange router parameters
    pub router: RouterConfig,
    /// Only identity allowed to swap or withdraw
    pub owner: Address,
    /// Seed for the in-memory exchange used by `--simulate`
    #[serde(default)]
    pub simulation: Option<SimulationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConfig {
    pub first: Asset,
    pub second: Asset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// JSON-RPC endpoint of the chain the router lives on
    pub endpoint: String,
    /// Uniswap V2 compatible Router02 address
    pub address: Address,
    /// Pair fee, 3/1000 for Uniswap V2
    #[serde(default)]
    pub fee: FeeRate,
    /// Swap deadline relative to submission (seconds)
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

fn default_deadline_secs() -> u64 {
    300
}

/// Initial state of the simulated exchange (raw token units)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Address holding the engine's funds
    #[serde(default = "default_sim_account")]
    pub account: Address,
    pub reserve_first: u64,
    pub reserve_second: u64,
    #[serde(default)]
    pub holdings_first: u64,
    #[serde(default)]
    pub holdings_second: u64,
}

fn default_sim_account() -> Address {
    Address::repeat_byte(0xe7)
}

impl Default for ArbitrageConfig {
    fn default() -> Self {
        Self {
            pair: PairConfig::default(),
            router: RouterConfig::default(),
            owner: Address::zero(), // Must be configured
            simulation: None,
        }
    }
}

impl Default for PairConfig {
    fn default() -> Self {
        Self {
            first: Asset::new(USDT_MAINNET, "USDT", DEFAULT_DECIMALS),
            second: Asset::new(USDC_MAINNET, "USDC", DEFAULT_DECIMALS),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8545".to_string(),
            address: UNISWAP_V2_ROUTER_MAINNET,
            fee: FeeRate::UNISWAP_V2,
            deadline_secs: default_deadline_secs(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            account: default_sim_account(),
            reserve_first: 1_000_000_000_000, // 1M units at 6 decimals
            reserve_second: 1_000_000_000_000,
            holdings_first: 1_000_000_000,
            holdings_second: 0,
        }
    }
}

impl ArbitrageConfig {
    /// Load configuration from a `.toml` or `.json` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = if is_toml(path) {
            toml::from_str(&contents)
                .with_context(|| format!("Invalid TOML config {}", path.display()))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Invalid JSON config {}", path.display()))?
        };
        Ok(config)
    }

    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Override fields from `STABLE_ARB_*` environment variables if present
    pub fn apply_env_overrides(&mut self) {
        if let Ok(endpoint) = std::env::var("STABLE_ARB_RPC_URL") {
            self.router.endpoint = endpoint;
        }

        override_address("STABLE_ARB_ROUTER", &mut self.router.address);
        override_address("STABLE_ARB_OWNER", &mut self.owner);
        override_address("STABLE_ARB_FIRST_ASSET", &mut self.pair.first.address);
        override_address("STABLE_ARB_SECOND_ASSET", &mut self.pair.second.address);

        if let Ok(deadline) = std::env::var("STABLE_ARB_DEADLINE_SECS") {
            match deadline.parse::<u64>() {
                Ok(value) => self.router.deadline_secs = value,
                Err(_) => warn!("Ignoring invalid STABLE_ARB_DEADLINE_SECS={}", deadline),
            }
        }
    }

    /// Save configuration to a `.toml` or `.json` file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = if is_toml(path) {
            toml::to_string_pretty(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.pair.first.address == self.pair.second.address {
            bail!("pair.first and pair.second must be different assets");
        }

        if self.pair.first.address.is_zero() || self.pair.second.address.is_zero() {
            bail!("pair asset addresses must be non-zero");
        }

        if self.owner.is_zero() {
            bail!("owner must be set to a non-zero address");
        }

        self.router
            .fee
            .validate()
            .context("router.fee must satisfy numerator < denominator")?;

        if self.router.endpoint.trim().is_empty() {
            bail!("router.endpoint must not be empty");
        }

        if self.router.deadline_secs == 0 {
            bail!("router.deadline_secs must be positive");
        }

        if let Some(sim) = &self.simulation {
            if sim.reserve_first == 0 || sim.reserve_second == 0 {
                bail!("simulation reserves must be positive");
            }
        }

        Ok(())
    }

    /// Simulation seed for `--simulate`: the configured section, or defaults.
    ///
    /// With no owner configured, the simulated account becomes the owner so
    /// owner-only commands run without extra setup.
    pub fn prepare_simulation(&mut self) -> SimulationConfig {
        let seed = self
            .simulation
            .get_or_insert_with(SimulationConfig::default)
            .clone();
        if self.owner.is_zero() {
            info!("No owner configured; simulated account {:?} acts as owner", seed.account);
            self.owner = seed.account;
        }
        seed
    }

    pub fn asset_pair(&self) -> Result<AssetPair> {
        AssetPair::new(self.pair.first.clone(), self.pair.second.clone())
            .context("Invalid asset pair")
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().and_then(|ext| ext.to_str()) == Some("toml")
}

fn override_address(var: &str, target: &mut Address) {
    if let Ok(value) = std::env::var(var) {
        match value.parse::<Address>() {
            Ok(address) => *target = address,
            Err(_) => warn!("Ignoring invalid address in {}={}", var, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> ArbitrageConfig {
        ArbitrageConfig {
            owner: Address::repeat_byte(0x11),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config_requires_owner() {
        assert!(ArbitrageConfig::default().validate().is_err());
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_simulation_defaults_owner_to_simulated_account() {
        let mut config = ArbitrageConfig::default();
        assert!(config.validate().is_err());

        let seed = config.prepare_simulation();

        assert_eq!(config.owner, seed.account);
        assert_eq!(seed.account, Address::repeat_byte(0xe7));
        assert!(config.simulation.is_some());
        config.validate().unwrap();
    }

    #[test]
    fn test_simulation_keeps_configured_owner() {
        let mut config = configured();
        config.prepare_simulation();
        assert_eq!(config.owner, Address::repeat_byte(0x11));
    }

    #[test]
    fn test_rejects_identical_assets() {
        let mut config = configured();
        config.pair.second.address = config.pair.first.address;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_fee() {
        let mut config = configured();
        config.router.fee = FeeRate {
            numerator: 1000,
            denominator: 1000,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");

        let mut config = configured();
        config.simulation = Some(SimulationConfig::default());
        config.save_to_file(&path).unwrap();

        let loaded = ArbitrageConfig::from_file(&path).unwrap();
        assert_eq!(loaded.owner, config.owner);
        assert_eq!(loaded.pair.first, config.pair.first);
        assert_eq!(loaded.router.fee, FeeRate::UNISWAP_V2);
        assert_eq!(loaded.simulation.unwrap().reserve_first, 1_000_000_000_000);
    }

    #[test]
    fn test_toml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(
            &path,
            r#"
owner = "0x1111111111111111111111111111111111111111"

[pair.first]
address = "0xdac17f958d2ee523a2206206994597c13d831ec7"
symbol = "USDT"

[pair.second]
address = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
symbol = "USDC"

[router]
endpoint = "http://localhost:8545"
address = "0x7a250d5630b4cf539739df2c5dacb4c659f2488d"
"#,
        )
        .unwrap();

        let config = ArbitrageConfig::from_file(&path).unwrap();
        config.validate().unwrap();
        assert_eq!(config.pair.first.address, USDT_MAINNET);
        assert_eq!(config.pair.second.decimals, DEFAULT_DECIMALS);
        assert_eq!(config.router.address, UNISWAP_V2_ROUTER_MAINNET);
        assert_eq!(config.router.fee, FeeRate::UNISWAP_V2);
        assert_eq!(config.router.deadline_secs, 300);
        assert!(config.simulation.is_none());
    }

    #[test]
    fn test_env_override() {
        std::env::set_var("STABLE_ARB_OWNER", "0x2222222222222222222222222222222222222222");
        std::env::set_var("STABLE_ARB_DEADLINE_SECS", "not-a-number");

        let config = ArbitrageConfig::from_env();

        assert_eq!(config.owner, Address::repeat_byte(0x22));
        assert_eq!(config.router.deadline_secs, 300);

        std::env::remove_var("STABLE_ARB_OWNER");
        std::env::remove_var("STABLE_ARB_DEADLINE_SECS");
    }
}
