//! Roundtrip - Two-Leg Arbitrage Scanner
//!
//! Run with: cargo run -- scan --start mana --amount 10000000000000000000000 --tokens 1inch
//!
//! For every token on the start asset's chain, quote start -> token -> start
//! through the 1inch router and report round trips that come back larger
//! than they left.

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};
use console::style;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod amount;
mod config;
mod errors;
mod quoter;
mod report;
mod scanner;
mod tokens;

use amount::Amount;
use config::Config;
use quoter::{OneInchClient, QuoteSource};
use report::ScanSummary;
use scanner::{
    BadPairs, ExclusionPolicy, FixedDelay, MinInterval, NoDelay, Pacer, ScanEvent, Scanner,
};
use tokens::{Asset, Catalog};

// ============================================
// CLI
// ============================================

#[derive(Parser, Debug)]
#[command(name = "roundtrip", version, about = "Two-leg round-trip arbitrage scanner")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan the token list for profitable round trips
    Scan(ScanArgs),

    /// Fetch a single quote
    Quote(QuoteArgs),

    /// List built-in start tokens
    Presets,

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Args, Debug, Default)]
struct ScanArgs {
    /// Start token preset (mana, dai, usdc, ...)
    #[arg(long)]
    start: Option<String>,

    /// Start amount in base units
    #[arg(long)]
    amount: Option<String>,

    /// Token list file or name
    #[arg(long)]
    tokens: Option<String>,

    /// Pause after each evaluated candidate
    #[arg(long)]
    pacing_ms: Option<u64>,

    /// Per-request timeout
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Count time spent quoting towards the pause
    #[arg(long)]
    min_interval: bool,

    /// Also evaluate candidates sharing the start token's symbol
    #[arg(long)]
    no_symbol_filter: bool,

    /// Known bad pairs JSON file
    #[arg(long)]
    bad_pairs: Option<String>,

    /// Write newly failing pairs back to the bad pairs file
    #[arg(long)]
    update_bad_pairs: bool,

    /// Also show amounts scaled by token decimals
    #[arg(long)]
    human: bool,

    /// Print findings only: no failure lines, summary or bad pair bookkeeping
    #[arg(long, conflicts_with = "update_bad_pairs")]
    only_found: bool,

    /// No banner, summary box or progress bar
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Args, Debug)]
struct QuoteArgs {
    /// Source token: preset key, address or symbol from the token list
    #[arg(long)]
    from: String,

    /// Destination token: preset key, address or symbol from the token list
    #[arg(long)]
    to: String,

    /// Amount of the source token in base units
    #[arg(long)]
    amount: String,

    /// Token list file or name
    #[arg(long)]
    tokens: Option<String>,
}

impl ScanArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(start) = &self.start {
            config.start_token = start.clone();
            config.start_asset = None;
        }
        if let Some(amount) = &self.amount {
            config.start_amount = amount.clone();
        }
        if let Some(tokens) = &self.tokens {
            config.token_list = tokens.clone();
        }
        if let Some(pacing_ms) = self.pacing_ms {
            config.pacing_ms = pacing_ms;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.quote.timeout_ms = timeout_ms;
        }
        if self.no_symbol_filter {
            config.exclude_same_symbol = false;
        }
        if let Some(bad_pairs) = &self.bad_pairs {
            config.bad_pairs_file = Some(bad_pairs.clone());
        }
        if self.update_bad_pairs {
            config.update_bad_pairs = true;
        }
    }
}

// ============================================
// OUTPUT HELPERS
// ============================================

fn print_banner() {
    println!();
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!(
        "{}",
        style(" 🔁 ROUNDTRIP - Two-Leg Arbitrage Scanner").cyan().bold()
    );
    println!(
        "{}",
        style("    start -> token -> start | exact integer math").cyan()
    );
    println!(
        "{}",
        style("═══════════════════════════════════════════════════════════════").cyan()
    );
    println!();
}

fn progress_bar(len: usize, quiet: bool) -> Result<ProgressBar> {
    if quiet {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(len as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=>-"),
    );
    Ok(bar)
}

fn build_pacer(config: &Config, min_interval: bool) -> Arc<dyn Pacer> {
    let pacing = config.pacing();
    if pacing.is_zero() {
        Arc::new(NoDelay)
    } else if min_interval {
        Arc::new(MinInterval::new(pacing))
    } else {
        Arc::new(FixedDelay(pacing))
    }
}

/// Preset key, exact address, or symbol from the token list
fn resolve_asset(key: &str, catalog: Option<&Catalog>) -> Option<Asset> {
    if let Some(asset) = tokens::start_preset(key) {
        return Some(asset);
    }
    let catalog = catalog?;
    catalog
        .find_by_address(key)
        .or_else(|| catalog.find_by_symbol(key))
        .cloned()
}

// ============================================
// COMMANDS
// ============================================

async fn run_scan(mut config: Config, args: ScanArgs) -> Result<()> {
    args.apply(&mut config);

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        return Err(e.into());
    }

    if !args.quiet {
        print_banner();
        config.print_summary();
        println!();
    }

    let start = config.start_asset()?;
    let start_amount = config.start_amount()?;

    // Token list + bad pairs
    let catalog = Catalog::load(&config.token_list)?;
    let known_bad = match &config.bad_pairs_file {
        Some(path) => BadPairs::load(path)?,
        None => BadPairs::new(),
    };

    let on_chain = catalog.count_on_chain(start.chain_id);
    info!(
        "Scanning {} tokens ({} on chain {}), {} known bad pairs",
        catalog.len(),
        on_chain,
        start.chain_id,
        known_bad.len()
    );
    if catalog.is_empty() {
        warn!("Token list {} is empty", config.token_list);
    } else if on_chain == 0 {
        warn!("No tokens on chain {} in {}", start.chain_id, config.token_list);
    }

    let client = OneInchClient::new(&config.quote)?;
    let scanner = Scanner::new(
        start,
        start_amount,
        Arc::new(client),
        build_pacer(&config, args.min_interval),
        ExclusionPolicy::new(config.exclude_same_symbol, known_bad.clone()),
    );

    info!(
        "Start: {} {} via {}",
        scanner.start_amount(),
        scanner.start().symbol,
        config.quote.api_url
    );

    if args.only_found {
        return print_findings(&scanner, catalog.assets(), args.human).await;
    }

    let bar = progress_bar(catalog.len(), args.quiet)?;
    let started = Instant::now();
    let mut summary = ScanSummary::default();

    let events = scanner.events(catalog.assets());
    futures::pin_mut!(events);

    while let Some(event) = events.next().await {
        summary.record(&event);

        match &event {
            ScanEvent::Found(finding) => bar.suspend(|| {
                println!("{}", style(report::finding_headline(finding)).green().bold());
                println!("{}", report::finding_amounts(finding, args.human));
            }),
            ScanEvent::LegFailed(failure) => bar.suspend(|| {
                println!("{}", style(report::failure_line(failure)).red());
            }),
            ScanEvent::Skipped { .. } | ScanEvent::Unprofitable { .. } => {}
        }

        bar.set_message(event.candidate().symbol.clone());
        bar.inc(1);
    }
    bar.finish_and_clear();

    info!("Scan finished in {:?}", started.elapsed());

    // Bad pair bookkeeping
    let mut all_bad = known_bad;
    let added = all_bad.merge(&summary.new_bad_pairs);
    match (&config.bad_pairs_file, config.update_bad_pairs) {
        (Some(path), true) if added > 0 => {
            all_bad.save(path)?;
            println!(
                "{} Saved {} new bad pairs to {}",
                style("📝").cyan(),
                added,
                path
            );
        }
        _ => println!("Bad Pairs {}", all_bad.to_json()),
    }

    if !args.quiet {
        println!();
        summary.print();
        println!();
    }

    Ok(())
}

/// Findings-only scan: each profitable round trip as soon as it is found
async fn print_findings(scanner: &Scanner, candidates: &[Asset], human: bool) -> Result<()> {
    let findings = scanner.scan(candidates);
    futures::pin_mut!(findings);

    let mut found = 0usize;
    while let Some(finding) = findings.next().await {
        println!("{}", style(report::finding_headline(&finding)).green().bold());
        println!("{}", report::finding_amounts(&finding, human));
        found += 1;
    }

    info!("{} profitable round trips", found);
    Ok(())
}

async fn run_quote(config: Config, args: QuoteArgs) -> Result<()> {
    let list = args.tokens.as_deref().unwrap_or(&config.token_list);
    let catalog = match Catalog::load(list) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            warn!("{}; only preset tokens can be resolved", e);
            None
        }
    };

    let from = resolve_asset(&args.from, catalog.as_ref())
        .ok_or_else(|| eyre!("unknown token {:?}", args.from))?;
    let to = resolve_asset(&args.to, catalog.as_ref())
        .ok_or_else(|| eyre!("unknown token {:?}", args.to))?;
    let amount = Amount::parse(&args.amount)?;

    let client = OneInchClient::new(&config.quote)?;
    let out = client.fetch_quote(&from, &to, &amount).await?;

    println!("{} {} -> {} {}", amount, from.symbol, out, to.symbol);
    println!(
        "       ({} {} -> {} {})",
        amount.to_decimal_string(from.decimals),
        from.symbol,
        out.to_decimal_string(to.decimals),
        to.symbol
    );
    Ok(())
}

fn print_presets() {
    println!("{:<6} {:<6} {:>8}  {}", "KEY", "SYMBOL", "DECIMALS", "ADDRESS");
    for (key, asset) in tokens::start_presets() {
        println!(
            "{:<6} {:<6} {:>8}  {}",
            key, asset.symbol, asset.decimals, asset.address
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("roundtrip=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Scan(args) => run_scan(config, args).await,
        Command::Quote(args) => run_quote(config, args).await,
        Command::Presets => {
            print_presets();
            Ok(())
        }
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_scan_flags() {
        let cli = Cli::try_parse_from([
            "roundtrip",
            "scan",
            "--start",
            "dai",
            "--amount",
            "1000000000000000000000",
            "--tokens",
            "gemini",
            "--pacing-ms",
            "0",
            "--no-symbol-filter",
        ])
        .unwrap();

        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        let mut config = Config::default();
        args.apply(&mut config);

        assert_eq!(config.start_asset().unwrap().symbol, "DAI");
        assert_eq!(config.start_amount, "1000000000000000000000");
        assert_eq!(config.token_list, "gemini");
        assert_eq!(config.pacing_ms, 0);
        assert!(!config.exclude_same_symbol);
    }

    #[test]
    fn test_only_found_conflicts_with_bad_pair_updates() {
        let cli = Cli::try_parse_from(["roundtrip", "scan", "--only-found", "--human"]).unwrap();
        let Command::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert!(args.only_found);
        assert!(args.human);

        let err = Cli::try_parse_from([
            "roundtrip",
            "scan",
            "--only-found",
            "--update-bad-pairs",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_scan_args_leave_config_alone_by_default() {
        let mut config = Config::default();
        ScanArgs::default().apply(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_build_pacer_accepts_zero_pacing() {
        let config = Config {
            pacing_ms: 0,
            ..Config::default()
        };
        tokio_test::block_on(async {
            let start = std::time::Instant::now();
            build_pacer(&config, false).pause().await;
            build_pacer(&config, true).pause().await;
            assert!(start.elapsed() < std::time::Duration::from_millis(50));
        });
    }

    #[test]
    fn test_resolve_asset() {
        let catalog = Catalog::from_json(
            br#"{"tokens": [{"address": "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984", "chainId": 1, "symbol": "UNI", "decimals": 18}]}"#,
        )
        .unwrap();

        assert_eq!(resolve_asset("weth", None).unwrap().symbol, "WETH");
        assert_eq!(resolve_asset("uni", Some(&catalog)).unwrap().symbol, "UNI");
        assert_eq!(
            resolve_asset("0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984", Some(&catalog))
                .unwrap()
                .symbol,
            "UNI"
        );
        assert!(resolve_asset("uni", None).is_none());
    }
}
