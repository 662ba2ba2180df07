//! Candidate Filter
//!
//! Decides which catalog entries are worth two quote calls. Address and
//! chain checks always apply; the symbol and bad-pair checks are policy.

use std::fmt;

use super::bad_pairs::BadPairs;
use crate::tokens::Asset;

/// Why a candidate was not evaluated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Same contract as the start asset
    SameAddress,

    /// Different network
    OtherChain { chain_id: u64 },

    /// Shares the start asset's ticker (usually a wrapped or bridged copy)
    SameSymbol,

    /// Listed in the bad-pairs file
    KnownBadPair,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::SameAddress => write!(f, "same address"),
            SkipReason::OtherChain { chain_id } => write!(f, "chain {}", chain_id),
            SkipReason::SameSymbol => write!(f, "same symbol"),
            SkipReason::KnownBadPair => write!(f, "known bad pair"),
        }
    }
}

/// Exclusion rules for one scan
#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    exclude_same_symbol: bool,
    bad_pairs: BadPairs,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self {
            exclude_same_symbol: true,
            bad_pairs: BadPairs::new(),
        }
    }
}

impl ExclusionPolicy {
    pub fn new(exclude_same_symbol: bool, bad_pairs: BadPairs) -> Self {
        Self {
            exclude_same_symbol,
            bad_pairs,
        }
    }

    /// `Some(reason)` if `candidate` must not be quoted against `start`
    pub fn is_excluded(&self, start: &Asset, candidate: &Asset) -> Option<SkipReason> {
        if candidate.address == start.address {
            return Some(SkipReason::SameAddress);
        }
        if candidate.chain_id != start.chain_id {
            return Some(SkipReason::OtherChain {
                chain_id: candidate.chain_id,
            });
        }
        if self.exclude_same_symbol && candidate.symbol == start.symbol {
            return Some(SkipReason::SameSymbol);
        }
        if self.bad_pairs.contains(&start.symbol, &candidate.symbol) {
            return Some(SkipReason::KnownBadPair);
        }
        None
    }
}
