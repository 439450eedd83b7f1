use clap::{Args, Parser, Subcommand, ValueEnum};
use miette::{IntoDiagnostic, Result, miette};
use rust_decimal::Decimal;
use stablepay::application::checkout::{CheckoutFlow, FlowEvent};
use stablepay::application::rates::RateComparisonEngine;
use stablepay::config::{AppConfig, CheckoutConfig, RatesConfig};
use stablepay::domain::checkout::{Currency, Outcome, Step};
use stablepay::domain::comparison::{ComparisonQuery, SortField, SortOrder};
use stablepay::domain::ports::OutcomePolicyBox;
use stablepay::infrastructure::catalog::{built_in_providers, load_providers};
use stablepay::infrastructure::outcome::{FixedOutcomePolicy, RandomOutcomePolicy};
use stablepay::interfaces::csv::quote_writer::{QuoteRow, QuoteWriter};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file. Defaults apply to anything it leaves out.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare what each payment provider pays out
    Rates(RatesArgs),
    /// Run a simulated stablecoin checkout
    Checkout(CheckoutArgs),
}

#[derive(Args)]
struct RatesArgs {
    /// Case-insensitive filter on provider names and features
    #[arg(long, default_value = "")]
    search: String,

    /// name, fee, processingTime, payout or rating
    #[arg(long, default_value = "payout")]
    sort: SortField,

    /// asc or desc
    #[arg(long, default_value = "desc")]
    order: SortOrder,

    /// Reference amount; must be one of the configured presets
    #[arg(long)]
    amount: Option<Decimal>,

    /// Provider table (CSV) replacing the built-in one
    #[arg(long)]
    providers: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

#[derive(Args)]
struct CheckoutArgs {
    /// Amount to pay
    #[arg(long, allow_hyphen_values = true)]
    amount: String,

    /// USDC, USDT or DAI
    #[arg(long, default_value = "USDC")]
    currency: Currency,

    /// Wallet to pay with. Defaults to the first configured wallet.
    #[arg(long)]
    wallet: Option<String>,

    /// Force the outcome of every attempt (success or failure)
    #[arg(long)]
    outcome: Option<Outcome>,

    /// Seed for the random outcome policy
    #[arg(long)]
    seed: Option<u64>,

    /// How many times to retry a failed attempt
    #[arg(long, default_value_t = 0)]
    retries: u32,

    /// Override the simulated processing delay
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Print the final flow state as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path).into_diagnostic()?,
        None => AppConfig::default(),
    };

    match cli.command {
        Command::Rates(args) => run_rates(&config.rates, args),
        Command::Checkout(args) => run_checkout(config.checkout, args).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run_rates(config: &RatesConfig, args: RatesArgs) -> Result<()> {
    let providers = match args.providers.as_ref().or(config.providers.as_ref()) {
        Some(path) => load_providers(path),
        None => built_in_providers(),
    }
    .into_diagnostic()?;
    let engine = RateComparisonEngine::with_presets(providers, config.reference_presets.clone())
        .into_diagnostic()?;

    let query = ComparisonQuery {
        search_term: args.search,
        sort_field: args.sort,
        sort_order: args.order,
        reference_amount: args.amount.unwrap_or(engine.presets()[0]),
    };
    let quotes = engine.query(&query).into_diagnostic()?;
    tracing::debug!(visible = quotes.len(), "rate comparison computed");

    let stdout = io::stdout();
    match args.format {
        Format::Csv => QuoteWriter::new(stdout.lock())
            .write_quotes(&quotes)
            .into_diagnostic()?,
        Format::Json => {
            let rows: Vec<QuoteRow> = quotes.iter().map(QuoteRow::from).collect();
            serde_json::to_writer_pretty(stdout.lock(), &rows).into_diagnostic()?;
            println!();
        }
    }
    Ok(())
}

async fn run_checkout(mut config: CheckoutConfig, args: CheckoutArgs) -> Result<()> {
    if let Some(delay_ms) = args.delay_ms {
        config.processing_delay_ms = delay_ms;
    }
    let policy: OutcomePolicyBox = match (args.outcome, args.seed) {
        (Some(outcome), _) => Arc::new(FixedOutcomePolicy(outcome)),
        (None, Some(seed)) => {
            Arc::new(RandomOutcomePolicy::seeded(config.success_rate, seed).into_diagnostic()?)
        }
        (None, None) => Arc::new(RandomOutcomePolicy::new(config.success_rate).into_diagnostic()?),
    };
    let wallet = args
        .wallet
        .or_else(|| config.wallets.first().cloned())
        .ok_or_else(|| miette!("no wallet given and none configured"))?;
    let fee = config.fee;

    let (flow, mut events) = CheckoutFlow::new(config, policy);

    if flow.submit_amount(&args.amount, args.currency).await != Step::Wallet {
        return Err(miette!(
            "amount must be a positive number, got '{}'",
            args.amount
        ));
    }
    let state = flow.current_state().await;
    println!("Amount: {} {}", state.amount, state.currency);
    println!("Fee: {:.2} {}", fee, state.currency);
    println!("Total: {}", state.total_display(fee));

    let mut retries_left = args.retries;
    loop {
        flow.select_wallet(wallet.as_str()).await;
        println!("Connecting to {wallet}...");

        let outcome = loop {
            match events.recv().await {
                Some(FlowEvent::Settled { outcome, .. }) => break outcome,
                Some(FlowEvent::Closed) => continue,
                None => return Err(miette!("checkout flow stopped before settling")),
            }
        };
        if outcome == Outcome::Success || retries_left == 0 {
            break;
        }
        retries_left -= 1;
        tracing::warn!(retries_left, "payment attempt failed, retrying");
        flow.retry().await;
    }

    let state = flow.current_state().await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&state).into_diagnostic()?);
    }

    if state.step == Step::Success {
        println!("Payment Successful! {}", state.success_message());
        flow.done().await;
        Ok(())
    } else {
        println!("Payment Failed. Something went wrong. Please try again.");
        flow.cancel().await;
        Err(miette!("payment was not completed"))
    }
}
