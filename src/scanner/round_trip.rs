//! Round-trip scanner
//!
//! For every candidate C in catalog order:
//!   start --(forward leg)--> C --(return leg)--> start
//! and report when more of the start asset comes back than went out.
//!
//! Everything is sequential: the return leg needs the forward leg's output,
//! and the next candidate waits for the pacer. Results come out as a lazy
//! stream so findings are reported the moment they exist.

use futures::stream::{self, Stream, StreamExt};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

use super::filter::{ExclusionPolicy, SkipReason};
use super::pacer::Pacer;
use crate::amount::{self, Amount};
use crate::errors::QuoteError;
use crate::quoter::QuoteSource;
use crate::tokens::Asset;

// ============================================
// SCAN RESULTS
// ============================================

/// Direction of a quote within a round trip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// start -> candidate
    Forward,
    /// candidate -> start
    Return,
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leg::Forward => write!(f, "forward"),
            Leg::Return => write!(f, "return"),
        }
    }
}

/// A quote that could not be obtained
#[derive(Debug)]
pub struct LegFailure {
    pub leg: Leg,
    pub from: Asset,
    pub to: Asset,
    /// Amount of `from` we asked to price
    pub amount: Amount,
    pub error: QuoteError,
}

/// A profitable round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub start: Asset,
    pub candidate: Asset,
    pub start_amount: Amount,
    /// Candidate received on the forward leg
    pub intermediate_amount: Amount,
    /// Start asset received on the return leg
    pub return_amount: Amount,
    /// Truncated gain in basis points
    pub gain_bps: Amount,
}

impl Finding {
    /// `Some` only if `return_amount > start_amount`
    pub fn from_round_trip(
        start: &Asset,
        candidate: &Asset,
        start_amount: &Amount,
        intermediate_amount: Amount,
        return_amount: Amount,
    ) -> Option<Self> {
        let gain_bps = amount::gain_basis_points(start_amount, &return_amount)?;
        Some(Self {
            start: start.clone(),
            candidate: candidate.clone(),
            start_amount: start_amount.clone(),
            intermediate_amount,
            return_amount,
            gain_bps,
        })
    }

    /// Gain as a two-decimal percentage, e.g. `"5.00"`
    pub fn gain_pct(&self) -> String {
        amount::format_basis_points(&self.gain_bps)
    }
}

/// One step of a scan. Every catalog entry produces exactly one event.
#[derive(Debug)]
pub enum ScanEvent {
    Skipped { candidate: Asset, reason: SkipReason },
    LegFailed(LegFailure),
    Unprofitable {
        candidate: Asset,
        intermediate_amount: Amount,
        return_amount: Amount,
    },
    Found(Finding),
}

impl ScanEvent {
    pub fn candidate(&self) -> &Asset {
        match self {
            ScanEvent::Skipped { candidate, .. } => candidate,
            ScanEvent::LegFailed(failure) => match failure.leg {
                Leg::Forward => &failure.to,
                Leg::Return => &failure.from,
            },
            ScanEvent::Unprofitable { candidate, .. } => candidate,
            ScanEvent::Found(finding) => &finding.candidate,
        }
    }
}

// ============================================
// SCANNER
// ============================================

pub struct Scanner {
    start: Asset,
    start_amount: Amount,
    quotes: Arc<dyn QuoteSource>,
    pacer: Arc<dyn Pacer>,
    policy: ExclusionPolicy,
}

struct ScanState<'a> {
    scanner: &'a Scanner,
    candidates: std::slice::Iter<'a, Asset>,
    pause_pending: bool,
}

impl Scanner {
    pub fn new(
        start: Asset,
        start_amount: Amount,
        quotes: Arc<dyn QuoteSource>,
        pacer: Arc<dyn Pacer>,
        policy: ExclusionPolicy,
    ) -> Self {
        Self {
            start,
            start_amount,
            quotes,
            pacer,
            policy,
        }
    }

    pub fn start(&self) -> &Asset {
        &self.start
    }

    pub fn start_amount(&self) -> &Amount {
        &self.start_amount
    }

    /// Lazily evaluate `candidates` in order, one event per candidate.
    ///
    /// The pacer runs after each evaluated candidate (success or failure),
    /// before the next one starts. Candidates rejected by the exclusion policy
    /// cost no quotes and are not paced. The pause after the last candidate
    /// runs when the stream is polled for its end.
    pub fn events<'a>(&'a self, candidates: &'a [Asset]) -> impl Stream<Item = ScanEvent> + 'a {
        let state = ScanState {
            scanner: self,
            candidates: candidates.iter(),
            pause_pending: false,
        };

        stream::unfold(state, |mut state| async move {
            if state.pause_pending {
                state.scanner.pacer.pause().await;
                state.pause_pending = false;
            }

            let candidate = state.candidates.next()?;
            let scanner = state.scanner;

            if let Some(reason) = scanner.policy.is_excluded(&scanner.start, candidate) {
                debug!("Skipping {} ({}): {}", candidate.symbol, candidate.short_address(), reason);
                return Some((
                    ScanEvent::Skipped {
                        candidate: candidate.clone(),
                        reason,
                    },
                    state,
                ));
            }

            let event = scanner.evaluate(candidate).await;
            state.pause_pending = true;
            Some((event, state))
        })
    }

    /// Only the profitable round trips
    pub fn scan<'a>(&'a self, candidates: &'a [Asset]) -> impl Stream<Item = Finding> + 'a {
        self.events(candidates).filter_map(|event| async move {
            match event {
                ScanEvent::Found(finding) => Some(finding),
                _ => None,
            }
        })
    }

    /// Quote both legs for one candidate and compare
    pub async fn evaluate(&self, candidate: &Asset) -> ScanEvent {
        let intermediate = match self
            .quotes
            .fetch_quote(&self.start, candidate, &self.start_amount)
            .await
        {
            Ok(amount) => amount,
            Err(error) => {
                return self.leg_failed(Leg::Forward, &self.start, candidate, &self.start_amount, error)
            }
        };

        let returned = match self
            .quotes
            .fetch_quote(candidate, &self.start, &intermediate)
            .await
        {
            Ok(amount) => amount,
            Err(error) => {
                return self.leg_failed(Leg::Return, candidate, &self.start, &intermediate, error)
            }
        };

        match Finding::from_round_trip(
            &self.start,
            candidate,
            &self.start_amount,
            intermediate.clone(),
            returned.clone(),
        ) {
            Some(finding) => {
                debug!(
                    "💰 FOUND: {} -> {} +{}% ({})",
                    finding.start.symbol,
                    finding.candidate.symbol,
                    finding.gain_pct(),
                    finding.candidate.address
                );
                ScanEvent::Found(finding)
            }
            None => {
                trace!(
                    "{} -> {} -> {}: {} -> {} -> {}",
                    self.start.symbol, candidate.symbol, self.start.symbol,
                    self.start_amount, intermediate, returned
                );
                ScanEvent::Unprofitable {
                    candidate: candidate.clone(),
                    intermediate_amount: intermediate,
                    return_amount: returned,
                }
            }
        }
    }

    fn leg_failed(
        &self,
        leg: Leg,
        from: &Asset,
        to: &Asset,
        amount: &Amount,
        error: QuoteError,
    ) -> ScanEvent {
        debug!(
            "[err] {} {} -> {} ({} leg via {}): {}",
            amount, from.symbol, to.symbol, leg, self.quotes.name(), error
        );
        ScanEvent::LegFailed(LegFailure {
            leg,
            from: from.clone(),
            to: to.clone(),
            amount: amount.clone(),
            error,
        })
    }
}

// ============================================
// TESTS
// ============================================
