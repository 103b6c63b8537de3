mod render;
mod telemetry;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use cryptopulse_core::models::coin::MarketSort;
use cryptopulse_core::models::portfolio::AddEntryRequest;
use cryptopulse_core::models::settings::Settings;
use cryptopulse_core::polling::poller::MarketPoller;
use cryptopulse_core::providers::registry::SourceRegistry;
use cryptopulse_core::storage::backend::FileBackend;
use cryptopulse_core::CryptoPulse;

#[derive(Debug, Parser)]
#[command(name = "cryptopulse", version, about = "Crypto market lists and portfolio profit/loss")]
struct Cli {
    /// Directory holding the persisted portfolio
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Market data source (coingecko, coincap)
    #[arg(long, global = true)]
    source: Option<String>,

    /// Quote currency (e.g. usd, eur)
    #[arg(long, global = true)]
    currency: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List coins from the market source
    Markets {
        /// Case-insensitive name filter
        #[arg(long, default_value = "")]
        search: String,
        /// price_asc, price_desc, marketcap_asc or marketcap_desc
        #[arg(long)]
        sort: Option<MarketSort>,
        /// Rows to print
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Add a holding of a coin listed by the market source
    Add {
        coin_id: String,
        quantity: String,
        buy_price: String,
    },
    /// Remove the holding at the given position
    Remove { index: usize },
    /// Value the portfolio once
    Show,
    /// Keep refreshing prices and re-valuing the portfolio
    Watch {
        /// Seconds between refreshes (defaults to the configured poll interval)
        #[arg(long)]
        interval: Option<u64>,
        /// Stop after this many refreshes
        #[arg(long)]
        ticks: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_json)?;

    let settings = resolve_settings(&cli)?;
    let data_dir = resolve_data_dir(&cli, &settings)?;
    info!(data_dir = %data_dir.display(), source = %settings.source, "starting");

    let registry = SourceRegistry::new_with_defaults(&settings);
    let source = registry.get(&settings.source)?;
    let poller = MarketPoller::new(source, settings.market_query());
    let mut tracker = CryptoPulse::open(FileBackend::new(data_dir));

    match cli.command {
        Command::Markets { search, sort, limit } => {
            let batch = poller.fetch_once().await.context("failed to fetch market data")?;
            tracker.apply_batch(batch);
            let rows = tracker.market_list(&search, sort);
            let shown = &rows[..rows.len().min(limit)];
            print!("{}", render::market_table(shown));
        }
        Command::Add {
            coin_id,
            quantity,
            buy_price,
        } => {
            let batch = poller.fetch_once().await.context("failed to fetch market data")?;
            tracker.apply_batch(batch);
            let request = AddEntryRequest::new(coin_id, quantity, buy_price);
            let entry = tracker.add_entry(&request)?;
            println!(
                "Added {} {} ({}) at {}",
                entry.quantity, entry.name, entry.symbol, entry.buy_price
            );
        }
        Command::Remove { index } => match tracker.remove_entry(index)? {
            Some(removed) => println!("Removed {} ({})", removed.name, removed.symbol),
            None => println!("No entry at position {index}"),
        },
        Command::Show => {
            match poller.fetch_once().await {
                Ok(batch) => tracker.apply_batch(batch),
                Err(e) => warn!(error = %e, "market data unavailable; valuing without live prices"),
            }
            print!("{}", render::portfolio_table(&tracker.valuation()));
        }
        Command::Watch { interval, ticks } => {
            let period = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| settings.poll_interval());
            watch(&poller, &mut tracker, period, ticks).await;
        }
    }

    Ok(())
}

async fn watch(
    poller: &MarketPoller,
    tracker: &mut CryptoPulse,
    period: Duration,
    ticks: Option<usize>,
) {
    let mut subscription = poller.subscribe(period);
    let mut status = subscription.status_watch();
    let mut seen = 0usize;

    loop {
        tokio::select! {
            Ok(()) = status.changed() => {
                let current = status.borrow_and_update().clone();
                if let Some(line) = render::feed_status_line(&current, tracker.last_updated()) {
                    println!("{line}");
                }
            }
            batch = subscription.next() => {
                let Some(batch) = batch else { break };
                let fetched_at = batch.fetched_at;
                tracker.apply_batch(batch);
                println!("── {} ──", fetched_at.format("%Y-%m-%d %H:%M:%S UTC"));
                print!("{}", render::portfolio_table(&tracker.valuation()));
                seen += 1;
                if ticks.is_some_and(|max| seen >= max) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    subscription.stop();
}

fn resolve_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = Settings::from_env()?;
    if let Some(source) = &cli.source {
        settings.source = source.to_lowercase();
    }
    if let Some(currency) = &cli.currency {
        settings.vs_currency = currency.to_lowercase();
    }
    Ok(settings)
}

fn resolve_data_dir(cli: &Cli, settings: &Settings) -> anyhow::Result<PathBuf> {
    if let Some(dir) = &cli.data_dir {
        return Ok(dir.clone());
    }
    if let Some(dir) = &settings.data_dir {
        return Ok(PathBuf::from(dir));
    }
    dirs::data_dir()
        .map(|d| d.join("cryptopulse"))
        .context("no data directory found; pass --data-dir or set CRYPTOPULSE_DATA_DIR")
}
