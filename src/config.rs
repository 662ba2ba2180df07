//! Configuration for the round-trip scanner
//!
//! Built once at startup and passed down by value/reference; nothing reads
//! process-wide state after that. Layers, lowest precedence first:
//! defaults, TOML file, environment (`.env` included), command line.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::amount::Amount;
use crate::errors::ConfigError;
use crate::quoter::oneinch::{self, DEFAULT_API_URL, DEFAULT_GAS_PRICE, DEFAULT_TIMEOUT_MS};
use crate::tokens::{self, Asset};

/// Courtesy delay between candidates
pub const DEFAULT_PACING_MS: u64 = 500;

/// 10,000 MANA
pub const DEFAULT_START_AMOUNT: &str = "10000000000000000000000";

pub const DEFAULT_START_TOKEN: &str = "mana";

pub const DEFAULT_TOKEN_LIST: &str = "1inch.json";

// ============================================
// QUOTE SERVICE SETTINGS
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteConfig {
    /// Pathfinder base URL
    pub api_url: String,

    /// Per-request timeout
    pub timeout_ms: u64,

    /// Gas price (wei) forwarded to the router as-is
    pub gas_price: String,

    /// Liquidity source allow-list, forwarded as-is
    pub protocols: Vec<String>,

    pub user_agent: String,
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            gas_price: DEFAULT_GAS_PRICE.to_string(),
            protocols: oneinch::default_protocols(),
            user_agent: String::new(),
        }
    }
}

// ============================================
// MAIN CONFIGURATION
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Start preset key (`mana`, `dai`, ...). Ignored when `start_asset` is set.
    pub start_token: String,

    /// Start amount in base units of the start asset
    pub start_amount: String,

    /// Token list file (a bare name gets `.json` appended)
    pub token_list: String,

    /// Pause after each evaluated candidate
    pub pacing_ms: u64,

    /// Skip candidates sharing the start asset's ticker
    pub exclude_same_symbol: bool,

    /// JSON file of known-bad `[symbol, symbol]` pairs
    pub bad_pairs_file: Option<String>,

    /// Write newly failing pairs back to `bad_pairs_file`
    pub update_bad_pairs: bool,

    /// Explicit start asset
    pub start_asset: Option<Asset>,

    pub quote: QuoteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_token: DEFAULT_START_TOKEN.to_string(),
            start_amount: DEFAULT_START_AMOUNT.to_string(),
            token_list: DEFAULT_TOKEN_LIST.to_string(),
            pacing_ms: DEFAULT_PACING_MS,
            exclude_same_symbol: true,
            bad_pairs_file: None,
            update_bad_pairs: false,
            start_asset: None,
            quote: QuoteConfig::default(),
        }
    }
}

impl Config {
    /// Defaults, then the optional TOML file, then `.env`/environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Override fields from environment variables
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Override fields from any `KEY -> value` lookup. Unparseable values keep
    /// the current setting.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("START_TOKEN") {
            self.start_token = v;
            self.start_asset = None;
        }
        if let Some(v) = lookup("START_AMOUNT") {
            self.start_amount = v;
        }
        if let Some(v) = lookup("TOKEN_LIST") {
            self.token_list = v;
        }

        // Quote service
        if let Some(v) = lookup("QUOTE_API_URL") {
            self.quote.api_url = v;
        }
        self.quote.timeout_ms = lookup("QUOTE_TIMEOUT_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.quote.timeout_ms);
        if let Some(v) = lookup("GAS_PRICE") {
            self.quote.gas_price = v;
        }
        if let Some(v) = lookup("QUOTE_PROTOCOLS") {
            self.quote.protocols = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(v) = lookup("USER_AGENT") {
            self.quote.user_agent = v;
        }

        // Scan policy
        self.pacing_ms = lookup("PACING_MS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.pacing_ms);
        self.exclude_same_symbol = lookup("EXCLUDE_SAME_SYMBOL")
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.exclude_same_symbol);
        if let Some(v) = lookup("BAD_PAIRS_FILE") {
            self.bad_pairs_file = Some(v);
        }
        self.update_bad_pairs = lookup("UPDATE_BAD_PAIRS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.update_bad_pairs);
    }

    /// The asset every round trip starts and ends in
    pub fn start_asset(&self) -> Result<Asset, ConfigError> {
        match &self.start_asset {
            Some(asset) => Ok(asset.clone()),
            None => tokens::start_preset(&self.start_token)
                .ok_or_else(|| ConfigError::UnknownPreset(self.start_token.clone())),
        }
    }

    pub fn start_amount(&self) -> Result<Amount, ConfigError> {
        Ok(Amount::parse(&self.start_amount)?)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    /// Validate configuration before scanning
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.start_asset()?;

        if self.start_amount()?.is_zero() {
            return Err(ConfigError::Invalid(
                "START_AMOUNT must be greater than zero".to_string(),
            ));
        }
        if self.quote.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid("QUOTE_API_URL is empty".to_string()));
        }
        if self.quote.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "QUOTE_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }
        if self.token_list.trim().is_empty() {
            return Err(ConfigError::Invalid("TOKEN_LIST is empty".to_string()));
        }
        if self.update_bad_pairs && self.bad_pairs_file.is_none() {
            return Err(ConfigError::Invalid(
                "UPDATE_BAD_PAIRS requires BAD_PAIRS_FILE".to_string(),
            ));
        }

        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        let start = self
            .start_asset()
            .map(|a| format!("{} ({})", a.symbol, a.short_address()))
            .unwrap_or_else(|_| format!("? ({})", self.start_token));

        println!("╔════════════════════════════════════════════════════════════╗");
        println!("║              ROUNDTRIP - CONFIGURATION                     ║");
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ Start Token:       {:<40} ║", start);
        println!("║ Start Amount:      {:<40} ║", self.start_amount);
        println!("║ Token List:        {:<40} ║", self.token_list);
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ QUOTES                                                     ║");
        println!("║ • Endpoint:        {:<40} ║", self.quote.api_url);
        println!("║ • Timeout:         {:<37} ms ║", self.quote.timeout_ms);
        println!("║ • Gas Price:       {:<36} wei ║", self.quote.gas_price);
        println!("║ • Protocols:       {:<40} ║", self.quote.protocols.len());
        println!("╠════════════════════════════════════════════════════════════╣");
        println!("║ FILTERS                                                    ║");
        println!("║ • Pacing:          {:<37} ms ║", self.pacing_ms);
        println!("║ • Same Symbol:     {:<40} ║",
            if self.exclude_same_symbol { "✓ Excluded" } else { "✗ Allowed" }
        );
        println!("║ • Bad Pairs:       {:<40} ║",
            self.bad_pairs_file.as_deref().unwrap_or("✗ Not Set")
        );
        println!("╚════════════════════════════════════════════════════════════╝");
    }
}

// ============================================
// TESTS
// ============================================
