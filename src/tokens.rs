//! Token definitions for the round-trip scanner
//!
//! - `Asset`: one token on one chain, as it appears in a token list
//! - `Catalog`: the ordered token list loaded once at startup
//! - Start presets: well-known mainnet tokens a scan can start from

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::CatalogError;

/// A tradable token on one chain.
///
/// `address` is compared exactly (case-sensitive), the same way the token list
/// spells it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub address: String,

    #[serde(rename = "chainId")]
    pub chain_id: u64,

    pub symbol: String,

    /// Display only, never used in amount math
    pub decimals: u8,
}

impl Asset {
    pub fn new(address: &str, chain_id: u64, symbol: &str, decimals: u8) -> Self {
        Self {
            address: address.to_string(),
            chain_id,
            symbol: symbol.to_string(),
            decimals,
        }
    }

    /// `0x0f5d2f...` style short form for log lines
    pub fn short_address(&self) -> String {
        match self.address.get(..8) {
            Some(prefix) if self.address.len() > 8 => format!("{}...", prefix),
            _ => self.address.clone(),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

// ============================================
// CATALOG
// ============================================

/// Token list payload: `{ "tokens": [ { address, chainId, symbol, decimals }, ... ] }`
#[derive(Debug, Deserialize)]
struct TokenList {
    tokens: Vec<Asset>,
}

/// Immutable, ordered list of candidate assets
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    assets: Vec<Asset>,
}

impl Catalog {
    /// Read and decode a token list file.
    ///
    /// A bare list name (`1inch`) resolves to `1inch.json`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = resolve_list_path(path.as_ref());
        let buf = fs::read(&path).map_err(|source| CatalogError::Unavailable {
            path: path.clone(),
            source,
        })?;

        let catalog = Self::from_json(&buf).map_err(|source| CatalogError::Malformed {
            path: path.clone(),
            source,
        })?;

        info!("📋 Loaded {} tokens from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Decode a token list payload. Source order is preserved.
    pub fn from_json(buf: &[u8]) -> Result<Self, serde_json::Error> {
        let list: TokenList = serde_json::from_slice(buf)?;
        debug!("Decoded token list with {} entries", list.tokens.len());
        Ok(Self { assets: list.tokens })
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Number of entries on the given chain
    pub fn count_on_chain(&self, chain_id: u64) -> usize {
        self.assets.iter().filter(|a| a.chain_id == chain_id).count()
    }

    /// Exact address lookup
    pub fn find_by_address(&self, address: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.address == address)
    }

    /// First entry whose symbol matches, ignoring case
    pub fn find_by_symbol(&self, symbol: &str) -> Option<&Asset> {
        self.assets
            .iter()
            .find(|a| a.symbol.eq_ignore_ascii_case(symbol))
    }
}

fn resolve_list_path(path: &Path) -> PathBuf {
    if path.extension().is_none() && !path.exists() {
        path.with_extension("json")
    } else {
        path.to_path_buf()
    }
}

// ============================================
// START PRESETS (Ethereum mainnet)
// ============================================

/// (key, address, symbol, decimals)
const START_PRESETS: &[(&str, &str, &str, u8)] = &[
    ("dai", "0x6B175474E89094C44Da98b954EedeAC495271d0F", "DAI", 18),
    ("usdt", "0xdAC17F958D2ee523a2206206994597C13D831ec7", "USDT", 6),
    ("usdc", "0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", "USDC", 6),
    ("weth", "0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2", "WETH", 18),
    ("crv", "0xD533a949740bb3306d119CC777fa900bA034cd52", "CRV", 18),
    ("aave", "0x7Fc66500c84A76Ad7e9c93437bFc5Ac33E2DDaE9", "AAVE", 18),
    ("mkr", "0x9f8F72aA9304c8B593d555F12eF6589cC3A579A2", "MKR", 18),
    ("mana", "0x0F5D2fB29fb7d3CFeE444a200298f468908cC942", "MANA", 18),
    ("ampl", "0xD46bA6D942050d489DBd938a2C909A5d5039A161", "AMPL", 9),
];

const MAINNET_CHAIN_ID: u64 = 1;

/// All start presets as `(key, asset)` pairs, in registry order
pub fn start_presets() -> Vec<(&'static str, Asset)> {
    START_PRESETS
        .iter()
        .map(|&(key, address, symbol, decimals)| {
            (key, Asset::new(address, MAINNET_CHAIN_ID, symbol, decimals))
        })
        .collect()
}

/// Look up a start preset by key, ignoring case
pub fn start_preset(key: &str) -> Option<Asset> {
    start_presets()
        .into_iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, asset)| asset)
}

// ============================================
// TESTS
// ============================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const LIST: &str = r#"{
        "name": "test list",
        "tokens": [
            { "address": "0x6B175474E89094C44Da98b954EedeAC495271d0F", "chainId": 1, "symbol": "DAI", "decimals": 18, "logoURI": "x" },
            { "address": "0xdAC17F958D2ee523a2206206994597C13D831ec7", "chainId": 1, "symbol": "USDT", "decimals": 6 },
            { "address": "0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063", "chainId": 137, "symbol": "DAI", "decimals": 18 }
        ]
    }"#;

    #[test]
    fn test_from_json_preserves_order() {
        let catalog = Catalog::from_json(LIST.as_bytes()).unwrap();
        let symbols: Vec<_> = catalog.assets().iter().map(|a| a.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["DAI", "USDT", "DAI"]);
        assert_eq!(catalog.assets()[2].chain_id, 137);
        assert_eq!(catalog.assets()[1].decimals, 6);
        assert_eq!(catalog.count_on_chain(1), 2);
    }

    #[test]
    fn test_from_json_rejects_wrong_shape() {
        assert!(Catalog::from_json(br#"{"tokens": [{"address": "0x1"}]}"#).is_err());
        assert!(Catalog::from_json(br#"[{"address": "0x1", "chainId": 1, "symbol": "A", "decimals": 1}]"#).is_err());
        assert!(Catalog::from_json(br#"{"tokens": [{"address": "0x1", "chainId": "1", "symbol": "A", "decimals": 1}]}"#).is_err());
        assert!(Catalog::from_json(b"not json").is_err());
    }

    #[test]
    fn test_load_missing_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let err = Catalog::load(dir.path().join("does-not-exist.json")).unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable { .. }));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("malformed.json");
        fs::write(&path, b"{\"tokens\": 5}").unwrap();
        let err = Catalog::load(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Malformed { .. }));
    }

    #[test]
    fn test_load_resolves_bare_list_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("gemini.json"), LIST).unwrap();
        let catalog = Catalog::load(dir.path().join("gemini")).unwrap();
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_lookups() {
        let catalog = Catalog::from_json(LIST.as_bytes()).unwrap();
        assert_eq!(
            catalog
                .find_by_address("0xdAC17F958D2ee523a2206206994597C13D831ec7")
                .map(|a| a.symbol.as_str()),
            Some("USDT")
        );
        // Case-sensitive addresses
        assert!(catalog
            .find_by_address("0xdac17f958d2ee523a2206206994597c13d831ec7")
            .is_none());
        assert_eq!(catalog.find_by_symbol("usdt").map(|a| a.decimals), Some(6));
    }

    #[test]
    fn test_start_presets() {
        let mana = start_preset("MANA").unwrap();
        assert_eq!(mana.symbol, "MANA");
        assert_eq!(mana.chain_id, 1);
        assert_eq!(mana.decimals, 18);
        assert_eq!(start_preset("usdt").unwrap().decimals, 6);
        assert!(start_preset("doge").is_none());
        assert_eq!(start_presets().len(), START_PRESETS.len());
    }

    #[test]
    fn test_short_address() {
        let dai = start_preset("dai").unwrap();
        assert_eq!(dai.short_address(), "0x6B1754...");
        assert_eq!(Asset::new("0x1", 1, "X", 0).short_address(), "0x1");
    }
}
