//! 1inch Pathfinder quote client
//!
//! API: {base}/chain/{chainId}/router/v4/quotes-by-presets
//!
//! One GET per quote. The gas price and the protocol allow-list are opaque
//! values handed to the server verbatim.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::USER_AGENT;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, trace};

use super::QuoteSource;
use crate::amount::Amount;
use crate::config::QuoteConfig;
use crate::errors::QuoteError;
use crate::tokens::Asset;

// ============================================
// CONSTANTS
// ============================================

/// Pathfinder base URL
pub const DEFAULT_API_URL: &str = "https://pathfinder.1inch.io/v1.2";

/// Per-request timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 2_000;

/// Gas price (wei) passed to the router
pub const DEFAULT_GAS_PRICE: &str = "57539833193";

/// Liquidity sources the router may use
const DEFAULT_PROTOCOLS: &[&str] = &[
    "UNISWAP_V1", "UNISWAP_V2", "SUSHI", "MOONISWAP", "BALANCER", "COMPOUND", "CURVE",
    "CURVE_V2_SPELL_2_ASSET", "CURVE_V2_SGT_2_ASSET", "CURVE_V2_THRESHOLDNETWORK_2_ASSET",
    "CHAI", "OASIS", "KYBER", "AAVE", "IEARN", "BANCOR", "PMM1", "CREAMSWAP", "SWERVE",
    "BLACKHOLESWAP", "DODO", "DODO_V2", "VALUELIQUID", "SHELL", "DEFISWAP", "SAKESWAP",
    "LUASWAP", "MINISWAP", "MSTABLE", "PMM2", "SYNTHETIX", "AAVE_V2", "ST_ETH",
    "ONE_INCH_LP", "ONE_INCH_LP_1_1", "LINKSWAP", "S_FINANCE", "PSM", "POWERINDEX", "PMM3",
    "XSIGMA", "CREAM_LENDING", "SMOOTHY_FINANCE", "SADDLE", "PMM4", "KYBER_DMM",
    "BALANCER_V2", "UNISWAP_V3", "SETH_WRAPPER", "CURVE_V2", "CURVE_V2_EURS_2_ASSET",
    "CURVE_V2_EURT_2_ASSET", "CURVE_V2_XAUT_2_ASSET", "CURVE_V2_ETH_CRV", "CURVE_V2_ETH_CVX",
    "CONVERGENCE_X", "ONE_INCH_LIMIT_ORDER", "ONE_INCH_LIMIT_ORDER_V2", "DFX_FINANCE",
    "FIXED_FEE_SWAP", "DXSWAP", "CLIPPER", "SHIBASWAP", "UNIFI", "PMMX", "PMM5", "PSM_PAX",
    "PMM2MM1", "WSTETH", "DEFI_PLAZA", "FIXED_FEE_SWAP_V3", "SYNTHETIX_WRAPPER", "SYNAPSE",
    "CURVE_V2_YFI_2_ASSET", "CURVE_V2_ETH_PAL", "POOLTOGETHER", "ETH_BANCOR_V3", "PMM6",
    "ELASTICSWAP", "BALANCER_V2_WRAPPER", "SYNTHETIX_ATOMIC",
];

pub fn default_protocols() -> Vec<String> {
    DEFAULT_PROTOCOLS.iter().map(|p| p.to_string()).collect()
}

// ============================================
// API RESPONSE TYPES
// ============================================

#[derive(Debug, Deserialize)]
struct QuotesByPresetsResponse {
    #[serde(rename = "maxReturnResult")]
    max_return_result: MaxReturnResult,
}

#[derive(Debug, Deserialize)]
struct MaxReturnResult {
    #[serde(rename = "toTokenAmount")]
    to_token_amount: String,

    #[serde(rename = "gasUnitsConsumed", default)]
    #[allow(dead_code)]
    gas_units_consumed: Option<serde_json::Value>,
}

/// Decode a quotes-by-presets body into the destination amount
pub fn parse_quote_response(body: &[u8]) -> Result<Amount, QuoteError> {
    let response: QuotesByPresetsResponse = serde_json::from_slice(body)
        .map_err(|e| QuoteError::MalformedResponse(e.to_string()))?;

    let raw = response.max_return_result.to_token_amount;
    Amount::parse(&raw).map_err(|_| QuoteError::MalformedResponse(format!("invalid amt: {}", raw)))
}

// ============================================
// CLIENT
// ============================================

pub struct OneInchClient {
    http_client: Client,
    base_url: Url,
    gas_price: String,
    protocols: String,
    user_agent: String,
}

impl OneInchClient {
    pub fn new(config: &QuoteConfig) -> Result<Self, QuoteError> {
        let http_client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Self::with_http_client(config, http_client)
    }

    /// Use a prebuilt client; `config.timeout_ms` is not applied to it
    pub fn with_http_client(config: &QuoteConfig, http_client: Client) -> Result<Self, QuoteError> {
        let base_url = Url::parse(&config.api_url)
            .map_err(|_| QuoteError::InvalidEndpoint(config.api_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(QuoteError::InvalidEndpoint(config.api_url.clone()));
        }

        Ok(Self {
            http_client,
            base_url,
            gas_price: config.gas_price.clone(),
            protocols: config.protocols.join(","),
            user_agent: config.user_agent.clone(),
        })
    }

    /// Full request URL for one leg at unix time `timestamp`
    pub fn quote_url(
        &self,
        from: &Asset,
        to: &Asset,
        amount: &Amount,
        timestamp: i64,
    ) -> Result<Url, QuoteError> {
        let chain_id = from.chain_id.to_string();
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| QuoteError::InvalidEndpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["chain", chain_id.as_str(), "router", "v4", "quotes-by-presets"]);

        url.query_pairs_mut()
            .append_pair("chainId", &chain_id)
            .append_pair("fromTokenAddress", &from.address)
            .append_pair("toTokenAddress", &to.address)
            .append_pair("amount", &amount.to_string())
            .append_pair("gasPrice", &self.gas_price)
            .append_pair("maxReturnProtocols", &self.protocols)
            .append_pair("time", &timestamp.to_string());

        Ok(url)
    }
}

#[async_trait]
impl QuoteSource for OneInchClient {
    async fn fetch_quote(
        &self,
        from: &Asset,
        to: &Asset,
        amount: &Amount,
    ) -> Result<Amount, QuoteError> {
        let url = self.quote_url(from, to, amount, Utc::now().timestamp())?;
        trace!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuoteError::Upstream {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let out = parse_quote_response(&body)?;

        debug!("Quote {} {} -> {} {}", amount, from.symbol, out, to.symbol);
        Ok(out)
    }

    fn name(&self) -> &str {
        "1inch"
    }
}

// ============================================
// TESTS
// ============================================
