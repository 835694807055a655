//! Stable arbitrage command line entry point

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ethers::prelude::*;
use stable_arbitrage::chain::ChainClient;
use stable_arbitrage::{
    log_metrics, log_success, ArbitrageConfig, ArbitrageEngine, ArbitrageError, Ledger, Quote,
    Router, SimulatedExchange,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit code for a refused trade; distinct from operational failures
const EXIT_NO_PROFIT: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "stable_arbitrage")]
#[command(author, version, about = "Two-token stable arbitrage engine", long_about = None)]
struct Cli {
    /// Configuration file (.toml or .json); defaults plus STABLE_ARB_* env otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Run against an in-memory exchange seeded from the [simulation] section;
    /// the simulated account is the owner unless one is configured
    #[arg(long, global = true)]
    simulate: bool,

    /// Identity to act as for owner-only commands (defaults to the configured owner)
    #[arg(long, global = true, value_parser = parse_address)]
    caller: Option<Address>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the engine's holdings of both assets
    Balances,
    /// Quote both directions with current holdings and show the profitable one
    Quote,
    /// Quote an explicit amount in an explicit direction
    QuoteDirected {
        /// Input amount in raw token units
        #[arg(long, value_parser = parse_amount)]
        amount: U256,
        #[arg(long, value_enum)]
        direction: DirectionArg,
    },
    /// Swap the full holdings of one side if profitable
    Execute {
        #[arg(long, value_enum)]
        direction: DirectionArg,
    },
    /// Swap whichever side is profitable
    ExecuteAuto,
    /// Transfer holdings out of the engine
    Withdraw {
        #[arg(long, value_parser = parse_address)]
        asset: Address,
        /// Amount in raw token units
        #[arg(long, value_parser = parse_amount)]
        amount: U256,
        #[arg(long, value_parser = parse_address)]
        recipient: Address,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum DirectionArg {
    FirstToSecond,
    SecondToFirst,
}

impl DirectionArg {
    fn is_first_to_second(self) -> bool {
        matches!(self, DirectionArg::FirstToSecond)
    }
}

fn parse_amount(value: &str) -> std::result::Result<U256, String> {
    U256::from_dec_str(value).map_err(|_| format!("invalid amount: {}", value))
}

fn parse_address(value: &str) -> std::result::Result<Address, String> {
    value
        .parse::<Address>()
        .map_err(|_| format!("invalid address: {}", value))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stable_arbitrage=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let refused = e
                .downcast_ref::<ArbitrageError>()
                .map_or(false, ArbitrageError::is_no_profit);
            if refused {
                info!("{}", e);
                ExitCode::from(EXIT_NO_PROFIT)
            } else {
                error!("{:#}", e);
                ExitCode::FAILURE
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ArbitrageConfig::from_file(path)?,
        None => ArbitrageConfig::default(),
    };
    config.apply_env_overrides();
    let seed = cli.simulate.then(|| config.prepare_simulation());
    config.validate().context("Invalid configuration")?;

    let caller = cli.caller.unwrap_or(config.owner);

    if let Some(seed) = seed {
        let exchange = Arc::new(SimulatedExchange::seeded(
            &config.asset_pair()?,
            config.router.fee,
            &seed,
        ));
        info!("Using simulated exchange for account {:?}", seed.account);
        let mut engine =
            ArbitrageEngine::from_config(&config, seed.account, exchange.clone(), exchange)?;
        return execute(&mut engine, cli.command, caller).await;
    }

    let client = Arc::new(connect(&config).await?);
    let account = client.address();
    let chain = Arc::new(ChainClient::new(
        client,
        config.router.address,
        account,
        Duration::from_secs(config.router.deadline_secs),
    ));
    info!("Connected to {} as {:?}", config.router.endpoint, account);
    let mut engine = ArbitrageEngine::from_config(&config, account, chain.clone(), chain)?;
    execute(&mut engine, cli.command, caller).await
}

async fn connect(config: &ArbitrageConfig) -> Result<SignerMiddleware<Provider<Http>, LocalWallet>> {
    let provider = Provider::<Http>::try_from(config.router.endpoint.as_str())
        .with_context(|| format!("Invalid RPC endpoint {}", config.router.endpoint))?;
    let chain_id = provider
        .get_chainid()
        .await
        .context("Failed to query chain id")?;

    let key = std::env::var("STABLE_ARB_PRIVATE_KEY")
        .context("STABLE_ARB_PRIVATE_KEY must be set unless --simulate is used")?;
    let wallet = key
        .parse::<LocalWallet>()
        .context("STABLE_ARB_PRIVATE_KEY is not a valid private key")?
        .with_chain_id(chain_id.as_u64());

    Ok(SignerMiddleware::new(provider, wallet))
}

async fn execute<R: Router, L: Ledger>(
    engine: &mut ArbitrageEngine<R, L>,
    command: Command,
    caller: Address,
) -> Result<()> {
    let pair = engine.pair().clone();

    match command {
        Command::Balances => {
            let holdings = engine.balances().await?;
            println!("{}: {}", pair.first().symbol, pair.first().format_amount(holdings.first));
            println!("{}: {}", pair.second().symbol, pair.second().format_amount(holdings.second));
        }
        Command::Quote => {
            let quote = engine.quote_both_directions().await?;
            print_quote(&pair, &quote);
        }
        Command::QuoteDirected { amount, direction } => {
            let quote = engine
                .quote_directed(amount, direction.is_first_to_second())
                .await?;
            print_quote(&pair, &quote);
        }
        Command::Execute { direction } => {
            let receipt = engine
                .execute_directed(caller, direction.is_first_to_second())
                .await?;
            log_success!("Swapped along {}", receipt.path);
            println!("{} -> {}", receipt.amount_in, receipt.amount_out);
        }
        Command::ExecuteAuto => {
            let receipt = engine.execute_auto(caller).await?;
            log_success!("Swapped along {}", receipt.path);
            println!("{} -> {}", receipt.amount_in, receipt.amount_out);
        }
        Command::Withdraw {
            asset,
            amount,
            recipient,
        } => {
            engine.withdraw(caller, asset, amount, recipient).await?;
            log_success!("Withdrawal of {} to {:?} complete", amount, recipient);
        }
    }

    let metrics = engine.metrics();
    log_metrics!(
        "quotes={} swaps={} refusals={} unauthorized={} withdrawals={} errors={}",
        metrics.quotes_served,
        metrics.swaps_executed,
        metrics.no_profit_refusals,
        metrics.unauthorized_attempts,
        metrics.withdrawals,
        metrics.errors
    );
    Ok(())
}

fn print_quote(pair: &stable_arbitrage::AssetPair, quote: &Quote) {
    let input = pair.asset(quote.path.input());
    let output = pair.asset(quote.path.output());
    match (input, output) {
        (Some(input), Some(output)) => println!(
            "{}: {} -> {}",
            quote.path,
            input.format_amount(quote.amount_in),
            output.format_amount(quote.amount_out)
        ),
        _ => println!("{}: {} -> {}", quote.path, quote.amount_in, quote.amount_out),
    }
}
