pub mod cache;
pub mod cli;
pub mod config;
pub mod ledger;
pub mod log;
pub mod market_data;
pub mod providers;
pub mod server;
pub mod snapshot;
pub mod store;
pub mod valuation;

use crate::config::AppConfig;
use crate::ledger::{Category, TradeSide};
use crate::market_data::{MarketDataProvider, NewsProvider};
use crate::providers::{coingecko::CoinGeckoProvider, newsapi::NewsApiProvider};
use crate::server::ApiState;
use crate::store::{LedgerStore, disk::DiskLedgerStore};
use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum ExpensesCommand {
    List {
        search: String,
        category: Option<Category>,
    },
    Add {
        description: String,
        amount: f64,
        category: Category,
        date: Option<NaiveDate>,
        notes: Option<String>,
    },
    Remove {
        id: u64,
    },
}

#[derive(Debug, Clone)]
pub enum PortfolioCommand {
    Show,
    Add {
        id: String,
        symbol: String,
        name: String,
        amount: f64,
        purchase_price: f64,
    },
    Buy {
        id: String,
        quantity: f64,
    },
    Sell {
        id: String,
        quantity: f64,
    },
}

#[derive(Debug, Clone)]
pub enum AppCommand {
    Dashboard { watch: bool },
    Expenses(ExpensesCommand),
    Portfolio(PortfolioCommand),
    News,
    Serve { port: u16 },
}

fn build_market_provider(config: &AppConfig) -> CoinGeckoProvider {
    let base_url = config
        .providers
        .market
        .as_ref()
        .map_or("https://api.coingecko.com", |p| p.base_url.as_str());
    CoinGeckoProvider::new(base_url)
}

fn build_news_provider(config: &AppConfig) -> NewsApiProvider {
    let (base_url, api_key, query) = config
        .providers
        .news
        .as_ref()
        .map_or(("https://newsapi.org", "demo", "cryptocurrency bitcoin ethereum"), |p| {
            (p.base_url.as_str(), p.api_key.as_str(), p.query.as_str())
        });
    NewsApiProvider::new(base_url, api_key, query)
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("finboard starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let store = DiskLedgerStore::open(&config.default_data_path()?)?;
    run_command_with_store(command, &config, &store).await
}

/// Dispatch with an injected store so tests can run against memory.
pub async fn run_command_with_store(
    command: AppCommand,
    config: &AppConfig,
    store: &dyn LedgerStore,
) -> Result<()> {
    let market = build_market_provider(config);
    let news = build_news_provider(config);

    match command {
        AppCommand::Dashboard { watch: false } => {
            cli::dashboard::show(store, &market, &news, config).await
        }
        AppCommand::Dashboard { watch: true } => {
            cli::dashboard::watch(store, &market, &news, config).await
        }
        AppCommand::Expenses(cmd) => match cmd {
            ExpensesCommand::List { search, category } => {
                cli::expenses::list(store, &search, category)
            }
            ExpensesCommand::Add {
                description,
                amount,
                category,
                date,
                notes,
            } => cli::expenses::add(store, &description, amount, category, date, notes),
            ExpensesCommand::Remove { id } => cli::expenses::remove(store, id),
        },
        AppCommand::Portfolio(cmd) => match cmd {
            PortfolioCommand::Show => cli::portfolio::show(store, &market).await,
            PortfolioCommand::Add {
                id,
                symbol,
                name,
                amount,
                purchase_price,
            } => cli::portfolio::add(store, &id, &symbol, &name, amount, purchase_price),
            PortfolioCommand::Buy { id, quantity } => {
                cli::portfolio::trade(store, &market, &id, TradeSide::Buy, quantity).await
            }
            PortfolioCommand::Sell { id, quantity } => {
                cli::portfolio::trade(store, &market, &id, TradeSide::Sell, quantity).await
            }
        },
        AppCommand::News => cli::news::show(&news).await,
        AppCommand::Serve { port } => {
            let state = Arc::new(ApiState {
                market: Arc::new(build_market_provider(config)) as Arc<dyn MarketDataProvider>,
                news: Arc::new(build_news_provider(config)) as Arc<dyn NewsProvider>,
                coin_ids: config.coin_ids(),
            });
            server::serve(state, port).await
        }
    }
}
