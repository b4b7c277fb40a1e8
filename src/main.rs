use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use finboard::ledger::Category;
use finboard::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show the combined dashboard
    Dashboard {
        /// Keep refreshing on the configured cadence until ctrl-c
        #[arg(long)]
        watch: bool,
    },
    /// Track everyday expenses
    Expenses {
        #[command(subcommand)]
        command: ExpensesCommands,
    },
    /// Track crypto holdings
    Portfolio {
        #[command(subcommand)]
        command: PortfolioCommands,
    },
    /// Show market headlines
    News,
    /// Run the proxy API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value_t = 3001)]
        port: u16,
    },
}

#[derive(Subcommand)]
enum ExpensesCommands {
    /// List expenses with summary figures
    List {
        /// Match against description or notes
        #[arg(long, default_value = "")]
        search: String,
        /// Restrict to one category
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,
    },
    /// Record a new expense
    Add {
        description: String,
        amount: f64,
        #[arg(value_parser = parse_category)]
        category: Category,
        /// Expense date (YYYY-MM-DD), today when omitted
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete an expense by id
    Rm { id: u64 },
}

#[derive(Subcommand)]
enum PortfolioCommands {
    /// Show holdings with live valuations
    Show,
    /// Add a holding (merges into an existing coin id)
    Add {
        /// Coin id, e.g. "bitcoin"
        id: String,
        symbol: String,
        name: String,
        amount: f64,
        purchase_price: f64,
    },
    /// Buy more of a held coin at the live price
    Buy { id: String, quantity: f64 },
    /// Sell part of a held coin (clamped at zero)
    Sell { id: String, quantity: f64 },
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::parse(s).ok_or_else(|| {
        format!(
            "unknown category '{s}', expected one of: {}",
            Category::ALL.map(|c| c.to_string()).join(", ")
        )
    })
}

impl From<Commands> for finboard::AppCommand {
    fn from(cmd: Commands) -> finboard::AppCommand {
        match cmd {
            Commands::Dashboard { watch } => finboard::AppCommand::Dashboard { watch },
            Commands::Expenses { command } => finboard::AppCommand::Expenses(match command {
                ExpensesCommands::List { search, category } => {
                    finboard::ExpensesCommand::List { search, category }
                }
                ExpensesCommands::Add {
                    description,
                    amount,
                    category,
                    date,
                    notes,
                } => finboard::ExpensesCommand::Add {
                    description,
                    amount,
                    category,
                    date,
                    notes,
                },
                ExpensesCommands::Rm { id } => finboard::ExpensesCommand::Remove { id },
            }),
            Commands::Portfolio { command } => finboard::AppCommand::Portfolio(match command {
                PortfolioCommands::Show => finboard::PortfolioCommand::Show,
                PortfolioCommands::Add {
                    id,
                    symbol,
                    name,
                    amount,
                    purchase_price,
                } => finboard::PortfolioCommand::Add {
                    id,
                    symbol,
                    name,
                    amount,
                    purchase_price,
                },
                PortfolioCommands::Buy { id, quantity } => {
                    finboard::PortfolioCommand::Buy { id, quantity }
                }
                PortfolioCommands::Sell { id, quantity } => {
                    finboard::PortfolioCommand::Sell { id, quantity }
                }
            }),
            Commands::News => finboard::AppCommand::News,
            Commands::Serve { port } => finboard::AppCommand::Serve { port },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => finboard::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = finboard::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
coins:
  - id: "bitcoin"
    symbol: "BTC"
    name: "Bitcoin"
  - id: "ethereum"
    symbol: "ETH"
    name: "Ethereum"
  - id: "cardano"
    symbol: "ADA"
    name: "Cardano"
  - id: "solana"
    symbol: "SOL"
    name: "Solana"

providers:
  market:
    base_url: "https://api.coingecko.com"
  news:
    base_url: "https://newsapi.org"
    api_key: "demo"

currency: "USD"
quote_refresh_secs: 60
news_refresh_secs: 1800
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
