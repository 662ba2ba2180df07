//! The round-trip scanner
//!
//! Responsible for:
//! - Filtering catalog entries against the start asset
//! - Quoting both legs of each round trip
//! - Pacing requests to the quote service
//! - Tracking pairs the quote service cannot price

pub mod bad_pairs;
pub mod filter;
pub mod pacer;
mod round_trip;

pub use bad_pairs::BadPairs;
pub use filter::{ExclusionPolicy, SkipReason};
pub use pacer::{FixedDelay, MinInterval, NoDelay, Pacer};
pub use round_trip::{Finding, Leg, LegFailure, ScanEvent, Scanner};
