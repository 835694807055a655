//! Core value types: assets, the tracked pair, swap paths, quotes and receipts

use ethers::types::{Address, U256};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ArbitrageError, Result};

/// Stablecoin convention (USDC, USDT)
pub const DEFAULT_DECIMALS: u8 = 6;

/// A tracked token. The address is the identity; decimals only affect display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub address: Address,
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    DEFAULT_DECIMALS
}

impl Asset {
    pub fn new(address: Address, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.into(),
            decimals,
        }
    }

    /// Raw units scaled by the asset's decimals, if representable
    pub fn to_decimal(&self, amount: U256) -> Option<Decimal> {
        if amount > U256::from(i128::MAX as u128) {
            return None;
        }
        Decimal::try_from_i128_with_scale(amount.as_u128() as i128, self.decimals as u32).ok()
    }

    /// Human-readable amount for logs and CLI output
    pub fn format_amount(&self, amount: U256) -> String {
        match self.to_decimal(amount) {
            Some(value) => format!("{} {}", value, self.symbol),
            None => format!("{} raw {}", amount, self.symbol),
        }
    }
}

/// Swap direction relative to the configured pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    FirstToSecond,
    SecondToFirst,
}

impl Direction {
    pub fn from_flag(is_first_to_second: bool) -> Self {
        if is_first_to_second {
            Direction::FirstToSecond
        } else {
            Direction::SecondToFirst
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::FirstToSecond => Direction::SecondToFirst,
            Direction::SecondToFirst => Direction::FirstToSecond,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::FirstToSecond => write!(f, "first->second"),
            Direction::SecondToFirst => write!(f, "second->first"),
        }
    }
}

/// The two tracked assets, fixed for the engine's lifetime
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UncheckedPair")]
pub struct AssetPair {
    first: Asset,
    second: Asset,
}

/// Wire form of [`AssetPair`]; only reachable through [`AssetPair::new`]
#[derive(Deserialize)]
struct UncheckedPair {
    first: Asset,
    second: Asset,
}

impl TryFrom<UncheckedPair> for AssetPair {
    type Error = ArbitrageError;

    fn try_from(raw: UncheckedPair) -> Result<Self> {
        AssetPair::new(raw.first, raw.second)
    }
}

impl AssetPair {
    pub fn new(first: Asset, second: Asset) -> Result<Self> {
        if first.address == second.address {
            return Err(ArbitrageError::InvalidRequest {
                reason: format!("pair assets must differ, both are {:?}", first.address),
            });
        }
        Ok(Self { first, second })
    }

    pub fn first(&self) -> &Asset {
        &self.first
    }

    pub fn second(&self) -> &Asset {
        &self.second
    }

    pub fn input_asset(&self, direction: Direction) -> &Asset {
        match direction {
            Direction::FirstToSecond => &self.first,
            Direction::SecondToFirst => &self.second,
        }
    }

    pub fn output_asset(&self, direction: Direction) -> &Asset {
        self.input_asset(direction.reverse())
    }

    /// `[first, second]` or `[second, first]`
    pub fn path(&self, direction: Direction) -> SwapPath {
        SwapPath {
            input: self.input_asset(direction).address,
            output: self.output_asset(direction).address,
        }
    }

    /// Validate an externally supplied `[input, output]` ordering against the pair
    pub fn path_from(&self, input: Address, output: Address) -> Result<SwapPath> {
        let path = SwapPath { input, output };
        match self.direction_of(&path) {
            Some(_) => Ok(path),
            None => Err(ArbitrageError::InvalidRequest {
                reason: format!("path [{:?}, {:?}] is not a direction of the pair", input, output),
            }),
        }
    }

    pub fn direction_of(&self, path: &SwapPath) -> Option<Direction> {
        [Direction::FirstToSecond, Direction::SecondToFirst]
            .into_iter()
            .find(|direction| self.path(*direction) == *path)
    }

    pub fn asset(&self, address: Address) -> Option<&Asset> {
        [&self.first, &self.second]
            .into_iter()
            .find(|asset| asset.address == address)
    }
}

/// Ordered `[input, output]` route through the pair.
///
/// Serialize-only: paths are built from an [`AssetPair`], never parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SwapPath {
    input: Address,
    output: Address,
}

impl SwapPath {
    pub fn input(&self) -> Address {
        self.input
    }

    pub fn output(&self) -> Address {
        self.output
    }

    /// Router ABI form, always length 2
    pub fn to_vec(&self) -> Vec<Address> {
        vec![self.input, self.output]
    }
}

impl fmt::Display for SwapPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?} -> {:?}]", self.input, self.output)
    }
}

/// Pair reserves in the pair's canonical token order (`token0 < token1`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairReserves {
    pub token0: Address,
    pub token1: Address,
    pub reserve0: U256,
    pub reserve1: U256,
}

impl PairReserves {
    /// Re-order the canonical reserves to `(reserve_in, reserve_out)` for `path`
    pub fn oriented(&self, path: &SwapPath) -> Option<Reserves> {
        if path.input == self.token0 && path.output == self.token1 {
            Some(Reserves {
                reserve_in: self.reserve0,
                reserve_out: self.reserve1,
            })
        } else if path.input == self.token1 && path.output == self.token0 {
            Some(Reserves {
                reserve_in: self.reserve1,
                reserve_out: self.reserve0,
            })
        } else {
            None
        }
    }
}

/// Reserves ordered to match a swap path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reserves {
    pub reserve_in: U256,
    pub reserve_out: U256,
}

/// Expected output for an input amount along a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub amount_in: U256,
    pub amount_out: U256,
    pub path: SwapPath,
}

impl Quote {
    /// Output strictly exceeds input, in raw units
    pub fn is_profitable(&self) -> bool {
        self.amount_out > self.amount_in
    }

    pub fn profit(&self) -> Option<U256> {
        self.is_profitable().then(|| self.amount_out - self.amount_in)
    }

    /// How far the output falls short of the input
    pub fn shortfall(&self) -> U256 {
        self.amount_in.saturating_sub(self.amount_out)
    }
}

/// Engine holdings of the two tracked assets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Holdings {
    pub first: U256,
    pub second: U256,
}

impl Holdings {
    /// Holdings of the input side for `direction`
    pub fn input_for(&self, direction: Direction) -> U256 {
        match direction {
            Direction::FirstToSecond => self.first,
            Direction::SecondToFirst => self.second,
        }
    }
}

/// Record of a settled swap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SwapReceipt {
    pub path: SwapPath,
    pub amount_in: U256,
    /// Realized output
    pub amount_out: U256,
    /// Minimum output the settlement was bound to
    pub quoted_out: U256,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pair() -> AssetPair {
        AssetPair::new(
            Asset::new(Address::from_low_u64_be(0xaa), "USDT", 6),
            Asset::new(Address::from_low_u64_be(0xbb), "USDC", 6),
        )
        .unwrap()
    }

    #[test]
    fn test_pair_rejects_identical_assets() {
        let usdt = Asset::new(Address::from_low_u64_be(0xaa), "USDT", 6);
        let err = AssetPair::new(usdt.clone(), usdt).unwrap_err();
        assert!(matches!(err, ArbitrageError::InvalidRequest { .. }));
    }

    #[test]
    fn test_paths_start_with_requested_input() {
        let pair = pair();
        let forward = pair.path(Direction::from_flag(true));
        let backward = pair.path(Direction::from_flag(false));

        assert_eq!(forward.to_vec(), vec![pair.first().address, pair.second().address]);
        assert_eq!(backward.to_vec(), vec![pair.second().address, pair.first().address]);
        assert_eq!(pair.direction_of(&forward), Some(Direction::FirstToSecond));
        assert_eq!(pair.direction_of(&backward), Some(Direction::SecondToFirst));
    }

    #[test]
    fn test_pair_deserialization_enforces_distinct_assets() {
        let pair = pair();
        let json = serde_json::to_string(&pair).unwrap();
        let parsed: AssetPair = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, pair);

        let degenerate = r#"{
            "first": {"address": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "symbol": "USDT"},
            "second": {"address": "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "symbol": "USDC"}
        }"#;
        let err = serde_json::from_str::<AssetPair>(degenerate).unwrap_err();
        assert!(err.to_string().contains("pair assets must differ"));
    }

    #[test]
    fn test_receipt_serializes_path_in_order() {
        let pair = pair();
        let receipt = SwapReceipt {
            path: pair.path(Direction::SecondToFirst),
            amount_in: U256::from(10),
            amount_out: U256::from(11),
            quoted_out: U256::from(11),
        };
        let value = serde_json::to_value(receipt).unwrap();
        assert_eq!(value["path"]["input"], serde_json::to_value(pair.second().address).unwrap());
        assert_eq!(value["path"]["output"], serde_json::to_value(pair.first().address).unwrap());
    }

    #[test]
    fn test_foreign_path_rejected() {
        let pair = pair();
        let stranger = Address::from_low_u64_be(0xcc);
        assert!(pair.path_from(pair.first().address, stranger).is_err());
        assert!(pair
            .path_from(pair.first().address, pair.first().address)
            .is_err());
        assert!(pair
            .path_from(pair.second().address, pair.first().address)
            .is_ok());
    }

    #[test]
    fn test_reserves_reoriented_for_path() {
        let pair = pair();
        let canonical = PairReserves {
            token0: pair.first().address,
            token1: pair.second().address,
            reserve0: U256::from(10),
            reserve1: U256::from(20),
        };

        let forward = canonical.oriented(&pair.path(Direction::FirstToSecond)).unwrap();
        let backward = canonical.oriented(&pair.path(Direction::SecondToFirst)).unwrap();
        assert_eq!((forward.reserve_in, forward.reserve_out), (U256::from(10), U256::from(20)));
        assert_eq!((backward.reserve_in, backward.reserve_out), (U256::from(20), U256::from(10)));
    }

    #[test]
    fn test_amount_display_uses_decimals() {
        let usdc = Asset::new(Address::from_low_u64_be(0xbb), "USDC", 6);
        assert_eq!(usdc.to_decimal(U256::from(100_000_000u64)), Some(dec!(100)));
        assert_eq!(usdc.format_amount(U256::from(1_500_000u64)), "1.500000 USDC");
        assert_eq!(usdc.to_decimal(U256::MAX), None);
    }

    #[test]
    fn test_quote_profit() {
        let path = pair().path(Direction::FirstToSecond);
        let winning = Quote {
            amount_in: U256::from(100),
            amount_out: U256::from(101),
            path,
        };
        let flat = Quote {
            amount_in: U256::from(100),
            amount_out: U256::from(100),
            path,
        };
        assert_eq!(winning.profit(), Some(U256::from(1)));
        assert!(!flat.is_profitable());
        assert_eq!(flat.shortfall(), U256::zero());
    }
}
