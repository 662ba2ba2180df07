//! Console reporting
//!
//! Plain-text lines for findings and failed legs, plus the end-of-scan
//! tally. Styling is applied by the caller.

use console::style;

use crate::amount::Amount;
use crate::scanner::{BadPairs, Finding, Leg, LegFailure, ScanEvent};
use crate::tokens::Asset;

/// `FOUND: MANA -> DAI 0x6B17... +5.00%`
pub fn finding_headline(finding: &Finding) -> String {
    format!(
        "FOUND: {} -> {} {} +{}%",
        finding.start.symbol,
        finding.candidate.symbol,
        finding.candidate.address,
        finding.gain_pct()
    )
}

/// `start -> intermediate -> return`, in base units, optionally followed by
/// the decimal-scaled values
pub fn finding_amounts(finding: &Finding, human: bool) -> String {
    let mut line = format!(
        "       {} -> {} -> {}",
        finding.start_amount, finding.intermediate_amount, finding.return_amount
    );
    if human {
        line.push_str(&format!(
            "  ({} -> {} -> {})",
            display_amount(&finding.start, &finding.start_amount),
            display_amount(&finding.candidate, &finding.intermediate_amount),
            display_amount(&finding.start, &finding.return_amount),
        ));
    }
    line
}

/// `[err] 10000 MANA -> USDC: invalid http status: 500`
pub fn failure_line(failure: &LegFailure) -> String {
    format!(
        "[err] {} {} -> {}: {}",
        failure.amount, failure.from.symbol, failure.to.symbol, failure.error
    )
}

fn display_amount(asset: &Asset, amount: &Amount) -> String {
    format!("{} {}", amount.to_decimal_string(asset.decimals), asset.symbol)
}

// ============================================
// SCAN SUMMARY
// ============================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub candidates: usize,
    pub skipped: usize,
    pub failed: usize,
    pub unprofitable: usize,
    pub found: usize,
    /// Pairs whose quotes failed during this scan
    pub new_bad_pairs: BadPairs,
}

impl ScanSummary {
    pub fn record(&mut self, event: &ScanEvent) {
        self.candidates += 1;
        match event {
            ScanEvent::Skipped { .. } => self.skipped += 1,
            ScanEvent::LegFailed(failure) => {
                self.failed += 1;
                let (start, candidate) = match failure.leg {
                    Leg::Forward => (&failure.from, &failure.to),
                    Leg::Return => (&failure.to, &failure.from),
                };
                self.new_bad_pairs.insert(&start.symbol, &candidate.symbol);
            }
            ScanEvent::Unprofitable { .. } => self.unprofitable += 1,
            ScanEvent::Found(_) => self.found += 1,
        }
    }

    pub fn evaluated(&self) -> usize {
        self.candidates - self.skipped
    }

    pub fn print(&self) {
        println!("Summary:");
        println!("  • Candidates:   {}", self.candidates);
        println!("  • Filtered:     {}", self.skipped);
        println!("  • Evaluated:    {}", self.evaluated());
        println!("  • Quote errors: {}", self.failed);
        println!("  • Unprofitable: {}", self.unprofitable);
        if !self.new_bad_pairs.is_empty() {
            println!("  • New bad pairs: {}", self.new_bad_pairs.len());
        }
        println!(
            "  • Profitable:   {}",
            if self.found > 0 {
                style(self.found).green().bold().to_string()
            } else {
                self.found.to_string()
            }
        );
    }
}
