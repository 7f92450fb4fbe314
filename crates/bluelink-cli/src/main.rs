//! BlueLink CLI
//!
//! Evaluates bond token and offering snapshots: redemption values,
//! redeemability, subscription progress and portfolio totals.

mod client;
mod config;

use anyhow::Context;
use bluelink_accrual::{
    compute_expected_interest, compute_redemption_amount, days_until_maturity, is_issuer,
    is_matured, projected_interest, validate_purchase, validate_withdrawal, AccrualCalculator,
    OfferingSummary, Portfolio, PortfolioFilter, PortfolioSummary, RedemptionQuote,
};
use bluelink_core::units::{format_interest_rate, format_sui, parse_sui, truncate_address};
use bluelink_core::{
    decode_payload, BondError, BondOffering, BondToken, Clock, ManualClock, Mist, SystemClock,
    TimestampMs,
};
use chrono::{TimeZone, Utc};
use clap::{ArgGroup, Parser, Subcommand};
use crate::client::BackendClient;
use crate::config::{BlueLinkConfig, WatchConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "bluelink")]
#[command(version)]
#[command(about = "BlueLink - bond token redemption and portfolio calculator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, global = true, default_value = "bluelink.toml")]
    config: PathBuf,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Redemption value of a single position
    Value {
        /// Principal in MIST
        #[arg(long)]
        principal: u64,

        /// Annual rate in basis points (500 = 5.00%)
        #[arg(long)]
        rate_bps: u32,

        /// Purchase time, Unix ms
        #[arg(long)]
        purchase_ms: i64,

        /// Maturity time, Unix ms
        #[arg(long)]
        maturity_ms: i64,

        /// Evaluation time, Unix ms (default: now)
        #[arg(long)]
        now_ms: Option<i64>,
    },

    /// Quote tokens from a JSON snapshot
    Token {
        /// Token snapshot (array, single object or API envelope)
        #[arg(short, long)]
        file: PathBuf,

        /// Evaluation time, Unix ms (default: now)
        #[arg(long)]
        now_ms: Option<i64>,
    },

    /// Portfolio totals and listing
    #[command(group(ArgGroup::new("source").required(true).args(["file", "owner"])))]
    Portfolio {
        /// Token snapshot file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Owner wallet address, fetched from the backend
        #[arg(short, long)]
        owner: Option<String>,

        /// all, active, matured or redeemed
        #[arg(long, default_value = "all")]
        filter: PortfolioFilter,

        /// Evaluation time, Unix ms (default: now)
        #[arg(long)]
        now_ms: Option<i64>,
    },

    /// Offering progress and purchase/withdrawal checks
    #[command(group(ArgGroup::new("source").required(true).args(["file", "id", "issuer"])))]
    Offering {
        /// Offering snapshot file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Backend offering id
        #[arg(long)]
        id: Option<u64>,

        /// Issuer wallet address
        #[arg(long)]
        issuer: Option<String>,

        /// Check a purchase of this many SUI
        #[arg(long, conflicts_with = "withdraw")]
        buy: Option<String>,

        /// Check an issuer withdrawal of this many SUI
        #[arg(long)]
        withdraw: Option<String>,

        /// Wallet performing the withdrawal
        #[arg(long, requires = "withdraw")]
        wallet: Option<String>,

        /// Also fetch the tokens sold by each offering
        #[arg(long)]
        tokens: bool,

        /// Evaluation time, Unix ms (default: now)
        #[arg(long)]
        now_ms: Option<i64>,
    },

    /// Poll an owner's tokens and report changes
    Watch {
        /// Owner wallet address
        #[arg(short, long)]
        owner: String,

        /// Poll interval in seconds (default: from config)
        #[arg(long)]
        interval_secs: Option<u64>,
    },

    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Version information
    Version,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
}

fn init_logging(verbose: bool, level: &str) {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn expand_path(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if path_str == "~" || path_str.starts_with("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(path_str.trim_start_matches('~').trim_start_matches('/'));
            }
        }
    }
    path.to_path_buf()
}

/// Calculator pinned at `now_ms`, or at the current wall-clock time
fn calculator_at(now_ms: Option<TimestampMs>) -> AccrualCalculator<ManualClock> {
    let now = now_ms.unwrap_or_else(|| SystemClock.now_ms());
    AccrualCalculator::new(ManualClock::new(now))
}

/// Read a snapshot file holding either a list or a single record
fn read_snapshot<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    match decode_payload::<Vec<T>>(&raw) {
        Ok(records) => Ok(records),
        Err(list_err) => match decode_payload::<T>(&raw) {
            Ok(record) => Ok(vec![record]),
            Err(_) => Err(list_err).with_context(|| format!("invalid snapshot {}", path.display())),
        },
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn format_instant(ms: TimestampMs) -> String {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_else(|| format!("{} ms", ms))
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn print_quote(token: &BondToken, quote: &RedemptionQuote) {
    println!("{}", token);
    println!("  Token:             {}", truncate_address(&token.on_chain_id, 6, 4));
    println!("  Owner:             {}", truncate_address(&token.owner, 6, 4));
    println!("  Rate:              {}", format_interest_rate(token.annual_interest_rate));
    println!("  Status:            {}", quote.status);
    println!("  Principal:         {} SUI", format_sui(quote.principal));
    println!("  Interest:          {} SUI", format_sui(quote.interest));
    println!("  Redemption amount: {} SUI", format_sui(quote.redemption_amount));
    println!("  Days held:         {:.2}", quote.elapsed_days);
    println!("  Days to maturity:  {}", quote.days_until_maturity);
    println!("  Redeemable:        {}", yes_no(quote.redeemable));
}

fn print_summary(summary: &PortfolioSummary) {
    println!("Portfolio at {}", format_instant(summary.evaluated_at_ms));
    println!(
        "  Tokens:            {} ({} active, {} matured, {} redeemed)",
        summary.total_tokens, summary.active, summary.matured, summary.redeemed
    );
    println!("  Invested:          {} SUI", format_sui(summary.total_invested));
    println!(
        "  Expected returns:  {} SUI",
        format_sui(summary.total_expected_returns)
    );
    println!(
        "  Expected interest: {} SUI",
        format_sui(summary.total_expected_interest)
    );
    println!("  Redeemable now:    {}", summary.redeemable.len());
    for skipped in &summary.skipped {
        println!(
            "  Skipped #{}: [{}] {}",
            skipped.token_id, skipped.code, skipped.reason
        );
    }
}

fn print_offering(offering: &BondOffering, report: &OfferingReport) {
    let summary = &report.summary;
    println!("{}", offering);
    println!("  Issuer:            {}", truncate_address(&offering.issuer_address, 6, 4));
    println!("  Rate:              {}", summary.rate);
    println!(
        "  Raised:            {} / {} SUI",
        format_sui(summary.amount_raised),
        format_sui(summary.total_amount)
    );
    println!("  Progress:          {:.2}%", summary.progress_percent);
    println!("  Available:         {} SUI", format_sui(summary.available));
    println!("  Sold out:          {}", yes_no(summary.sold_out));
    println!("  Open for purchase: {}", yes_no(summary.can_purchase));
    println!("  Matured:           {}", yes_no(summary.matured));
    println!("  Days to maturity:  {}", summary.days_until_maturity);

    if let Some(sold) = &report.tokens_sold {
        println!(
            "  Tokens sold:       {} ({} SUI outstanding)",
            sold.count,
            format_sui(sold.outstanding)
        );
    }
    if let Some(purchase) = &report.purchase {
        match (&purchase.reason, purchase.projected_interest) {
            (Some(reason), _) => println!(
                "  Purchase {} SUI:  rejected, {}",
                format_sui(purchase.amount),
                reason
            ),
            (None, interest) => println!(
                "  Purchase {} SUI:  ok, one year of interest {} SUI",
                format_sui(purchase.amount),
                format_sui(interest.unwrap_or_default())
            ),
        }
    }
    if let Some(withdrawal) = &report.withdrawal {
        match &withdrawal.reason {
            Some(reason) => println!(
                "  Withdraw {} SUI:  rejected, {}",
                format_sui(withdrawal.amount),
                reason
            ),
            None => println!("  Withdraw {} SUI:  ok", format_sui(withdrawal.amount)),
        }
    }
}

/// Purchase and withdrawal amounts to check against each offering
#[derive(Debug, Default)]
struct OfferingChecks {
    buy: Option<Mist>,
    withdraw: Option<Mist>,
    wallet: Option<String>,
}

/// Verdict of one purchase or withdrawal check
#[derive(Debug, PartialEq, Serialize)]
struct CheckOutcome {
    amount: Mist,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    projected_interest: Option<Mist>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl CheckOutcome {
    fn from_result(amount: Mist, result: bluelink_core::Result<Option<Mist>>) -> Self {
        match result {
            Ok(projected_interest) => Self {
                amount,
                ok: true,
                projected_interest,
                reason: None,
            },
            Err(e) => Self {
                amount,
                ok: false,
                projected_interest: None,
                reason: Some(e.to_string()),
            },
        }
    }
}

/// Tokens sold by an offering
#[derive(Debug, PartialEq, Serialize)]
struct TokensSold {
    count: usize,
    outstanding: Mist,
}

impl TokensSold {
    fn of(tokens: &[BondToken]) -> Self {
        let outstanding = tokens
            .iter()
            .filter(|t| !t.is_redeemed)
            .fold(0u64, |acc, t| acc.saturating_add(t.amount));
        Self {
            count: tokens.len(),
            outstanding,
        }
    }
}

/// Everything `offering` reports for one offering
#[derive(Debug, Serialize)]
struct OfferingReport {
    #[serde(flatten)]
    summary: OfferingSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    purchase: Option<CheckOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    withdrawal: Option<CheckOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tokens_sold: Option<TokensSold>,
}

impl OfferingReport {
    fn build(
        offering: &BondOffering,
        now_ms: TimestampMs,
        checks: &OfferingChecks,
        tokens_sold: Option<TokensSold>,
    ) -> Self {
        let purchase = checks.buy.map(|amount| {
            let result = validate_purchase(offering, amount)
                .and_then(|()| projected_interest(amount, offering.annual_interest_rate))
                .map(Some);
            CheckOutcome::from_result(amount, result)
        });

        let withdrawal = checks.withdraw.map(|amount| {
            let result = match checks.wallet.as_deref() {
                Some(wallet) if !is_issuer(offering, wallet) => Err(BondError::InvalidInput(
                    format!("{} is not the issuer", truncate_address(wallet, 6, 4)),
                )),
                _ => validate_withdrawal(offering, amount).map(|()| None),
            };
            CheckOutcome::from_result(amount, result)
        });

        Self {
            summary: OfferingSummary::of(offering, now_ms),
            purchase,
            withdrawal,
            tokens_sold,
        }
    }
}

/// One refresh of a watched snapshot
trait Poller {
    async fn poll(&mut self) -> anyhow::Result<()>;
}

/// Owner portfolio refreshed from the backend
struct PortfolioWatch {
    client: BackendClient,
    owner: String,
    calculator: AccrualCalculator,
    announced: HashSet<u64>,
    json: bool,
}

impl Poller for PortfolioWatch {
    async fn poll(&mut self) -> anyhow::Result<()> {
        let tokens = match self.client.tokens_by_owner(&self.owner).await {
            Ok(tokens) => tokens,
            Err(e @ (BondError::ConnectionFailed(_) | BondError::Api(_))) => {
                tracing::warn!(code = e.code(), error = %e, "poll failed, retrying");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let summary = Portfolio::new(tokens).summary(self.calculator.now_ms())?;
        for id in &summary.redeemable {
            if self.announced.insert(*id) {
                tracing::info!(token_id = id, "token is now redeemable");
            }
        }

        if self.json {
            println!("{}", serde_json::to_string(&summary)?);
        } else {
            print_summary(&summary);
        }
        Ok(())
    }
}

/// Poll every `period` until `shutdown` resolves
///
/// `shutdown` is pinned once, so a signal that lands while a poll is in
/// flight stops the loop before the next tick.
async fn run_watch<P: Poller>(
    period: Duration,
    poller: &mut P,
    shutdown: impl Future,
) -> anyhow::Result<()> {
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(period);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!("stopping watch");
                return Ok(());
            }
            _ = ticker.tick() => poller.poll().await?,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config_path = expand_path(&cli.config);

    let config = match &cli.command {
        Commands::Config {
            action: ConfigCommands::Init { .. },
        } => BlueLinkConfig::default(),
        _ => BlueLinkConfig::load(&config_path)
            .with_context(|| format!("failed to load {}", config_path.display()))?,
    };
    init_logging(cli.verbose, &config.logging.level);

    match cli.command {
        Commands::Value {
            principal,
            rate_bps,
            purchase_ms,
            maturity_ms,
            now_ms,
        } => {
            let now = now_ms.unwrap_or_else(|| SystemClock.now_ms());
            let amount =
                compute_redemption_amount(principal, rate_bps, purchase_ms, maturity_ms, now)?;
            let interest =
                compute_expected_interest(principal, rate_bps, purchase_ms, maturity_ms, now)?;

            if cli.json {
                print_json(&serde_json::json!({
                    "evaluated_at_ms": now,
                    "principal": principal,
                    "interest": interest,
                    "redemption_amount": amount,
                    "matured": is_matured(maturity_ms, now),
                    "days_until_maturity": days_until_maturity(maturity_ms, now),
                }))?;
            } else {
                println!("Evaluated at:      {}", format_instant(now));
                println!("Principal:         {} SUI ({} MIST)", format_sui(principal), principal);
                println!("Rate:              {}", format_interest_rate(rate_bps));
                println!("Interest:          {} SUI ({} MIST)", format_sui(interest), interest);
                println!("Redemption amount: {} SUI ({} MIST)", format_sui(amount), amount);
                println!("Matured:           {}", yes_no(is_matured(maturity_ms, now)));
                println!("Days to maturity:  {}", days_until_maturity(maturity_ms, now));
            }
        }

        Commands::Token { file, now_ms } => {
            let tokens: Vec<BondToken> = read_snapshot(&expand_path(&file))?;
            let calculator = calculator_at(now_ms);

            let mut quotes = Vec::new();
            for token in &tokens {
                match calculator.quote(token) {
                    Ok(quote) => quotes.push((token, quote)),
                    Err(e) => tracing::warn!(token_id = token.id, error = %e, "token skipped"),
                }
            }

            if cli.json {
                let quotes: Vec<&RedemptionQuote> = quotes.iter().map(|(_, q)| q).collect();
                print_json(&quotes)?;
            } else {
                for (token, quote) in &quotes {
                    print_quote(token, quote);
                }
            }
        }

        Commands::Portfolio {
            file,
            owner,
            filter,
            now_ms,
        } => {
            let tokens = match (file, owner) {
                (Some(file), _) => read_snapshot(&expand_path(&file))?,
                (None, Some(owner)) => {
                    BackendClient::new(&config.api)?
                        .tokens_by_owner(&owner)
                        .await?
                }
                (None, None) => anyhow::bail!("either --file or --owner is required"),
            };

            let calculator = calculator_at(now_ms);
            let now = calculator.now_ms();
            let portfolio = Portfolio::new(tokens);
            let summary = portfolio.summary(now)?;

            let quotes: Vec<RedemptionQuote> = portfolio
                .quotes(filter, now)
                .into_iter()
                .filter_map(|(_, quote)| quote.ok())
                .collect();

            if cli.json {
                print_json(&serde_json::json!({
                    "summary": summary,
                    "tokens": quotes,
                }))?;
            } else {
                print_summary(&summary);
                println!();
                for token in portfolio.filter(filter, now) {
                    if let Some(quote) = quotes.iter().find(|q| q.token_id == token.id) {
                        print_quote(token, quote);
                    }
                }
            }
        }

        Commands::Offering {
            file,
            id,
            issuer,
            buy,
            withdraw,
            wallet,
            tokens,
            now_ms,
        } => {
            let client = BackendClient::new(&config.api)?;
            let offerings: Vec<BondOffering> = match (file, id, issuer) {
                (Some(file), _, _) => read_snapshot(&expand_path(&file))?,
                (None, Some(id), _) => vec![client.bond(id).await?],
                (None, None, Some(issuer)) => client.bonds_by_issuer(&issuer).await?,
                (None, None, None) => {
                    anyhow::bail!("one of --file, --id or --issuer is required")
                }
            };

            let checks = OfferingChecks {
                buy: buy.as_deref().map(parse_sui).transpose()?,
                withdraw: withdraw.as_deref().map(parse_sui).transpose()?,
                wallet,
            };
            let now = calculator_at(now_ms).now_ms();

            let mut reports = Vec::with_capacity(offerings.len());
            for offering in &offerings {
                let sold = if tokens {
                    let sold = client.tokens_by_project(&offering.on_chain_id).await?;
                    Some(TokensSold::of(&sold))
                } else {
                    None
                };
                reports.push(OfferingReport::build(offering, now, &checks, sold));
            }

            if cli.json {
                print_json(&reports)?;
            } else {
                for (offering, report) in offerings.iter().zip(&reports) {
                    print_offering(offering, report);
                }
            }
        }

        Commands::Watch {
            owner,
            interval_secs,
        } => {
            let client = BackendClient::new(&config.api)?;
            let calculator = AccrualCalculator::system();
            let period = match interval_secs {
                Some(secs) => WatchConfig { interval_secs: secs }.interval(),
                None => config.watch.interval(),
            };

            match client.health().await {
                Ok(_) => tracing::debug!(url = %config.api.base_url, "backend reachable"),
                Err(e) => tracing::warn!(error = %e, "backend health check failed"),
            }

            tracing::info!(
                owner = %truncate_address(&owner, 6, 4),
                interval_secs = period.as_secs(),
                "watching portfolio"
            );

            let mut watch = PortfolioWatch {
                client,
                owner,
                calculator,
                announced: HashSet::new(),
                json: cli.json,
            };
            run_watch(period, &mut watch, tokio::signal::ctrl_c()).await?;
        }

        Commands::Config { action } => match action {
            ConfigCommands::Init { force } => {
                if config_path.exists() && !force {
                    anyhow::bail!(
                        "{} already exists, pass --force to overwrite",
                        config_path.display()
                    );
                }
                if let Some(parent) = config_path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                std::fs::write(&config_path, toml::to_string_pretty(&config)?)?;
                println!("Configuration written to {}", config_path.display());
            }
            ConfigCommands::Show => {
                for key in config.missing_keys() {
                    tracing::warn!(key, "configuration key not set");
                }
                if cli.json {
                    print_json(&config)?;
                } else {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
        },

        Commands::Version => {
            println!("BlueLink v{}", env!("CARGO_PKG_VERSION"));
            println!("Accrual: simple interest, 365-day year, basis points");
            println!("Units: 1 SUI = 1,000,000,000 MIST");
        }
    }

    Ok(())
}
