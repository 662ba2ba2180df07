//! Quote sources
//!
//! A quote answers one question: how much of `to` does `amount` of `from`
//! buy right now. The scanner only sees the `QuoteSource` trait; the HTTP
//! aggregator client lives in `oneinch`.

pub mod oneinch;

use async_trait::async_trait;

use crate::amount::Amount;
use crate::errors::QuoteError;
use crate::tokens::Asset;

pub use oneinch::OneInchClient;

/// Anything that can price a single swap leg.
///
/// Implementations make exactly one attempt per call: no caching, no retry.
/// A stale quote is worse than a missing one.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Output amount of `to` for `amount` base units of `from`
    async fn fetch_quote(
        &self,
        from: &Asset,
        to: &Asset,
        amount: &Amount,
    ) -> Result<Amount, QuoteError>;

    /// Source name for logging
    fn name(&self) -> &str;
}
