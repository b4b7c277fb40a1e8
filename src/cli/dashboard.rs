use crate::cli::{news as news_cli, ui};
use crate::config::AppConfig;
use crate::market_data::{MarketDataProvider, NewsArticle, NewsProvider, fallback_quotes};
use crate::snapshot::QuoteCell;
use crate::store::LedgerStore;
use crate::valuation::{self, quote_map};
use anyhow::Result;
use comfy_table::Cell;
use std::time::Duration;
use tracing::{debug, warn};

/// One-shot overview: portfolio figures, expense summary, headlines.
pub async fn show(
    store: &dyn LedgerStore,
    market: &dyn MarketDataProvider,
    news: &dyn NewsProvider,
    config: &AppConfig,
) -> Result<()> {
    let cell = QuoteCell::new();
    let spinner = ui::new_fetch_spinner("Refreshing dashboard...");
    let (refreshed, headlines) = futures::future::join(
        cell.refresh(market, &config.coin_ids()),
        news.fetch_headlines(),
    )
    .await;
    let headlines = headlines?;
    spinner.finish_and_clear();

    let quotes = if refreshed {
        cell.snapshot()
    } else {
        warn!("Quote source unavailable, using fallback quotes");
        quote_map(fallback_quotes())
    };
    render(store, &quotes, &headlines, config)?;
    Ok(())
}

/// Watch mode: periodic quote and news refresh on the configured cadences,
/// redrawing after each completed cycle until ctrl-c. A cycle in flight
/// when the loop is torn down is abandoned whole.
pub async fn watch(
    store: &dyn LedgerStore,
    market: &dyn MarketDataProvider,
    news: &dyn NewsProvider,
    config: &AppConfig,
) -> Result<()> {
    let cell = QuoteCell::new();
    let coin_ids = config.coin_ids();
    let mut headlines: Vec<NewsArticle> = Vec::new();

    let mut quote_tick = tokio::time::interval(Duration::from_secs(config.quote_refresh_secs));
    let mut news_tick = tokio::time::interval(Duration::from_secs(config.news_refresh_secs));

    loop {
        tokio::select! {
            _ = quote_tick.tick() => {
                cell.refresh(market, &coin_ids).await;
                redraw(store, &cell, &headlines, config)?;
            }
            _ = news_tick.tick() => {
                if let Ok(fresh) = news.fetch_headlines().await {
                    headlines = fresh;
                }
                redraw(store, &cell, &headlines, config)?;
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Watch loop cancelled");
                break;
            }
        }
    }
    Ok(())
}

fn redraw(
    store: &dyn LedgerStore,
    cell: &QuoteCell,
    headlines: &[NewsArticle],
    config: &AppConfig,
) -> Result<()> {
    let term = console::Term::stdout();
    let _ = term.clear_screen();
    render(store, &cell.snapshot(), headlines, config)
}

fn render(
    store: &dyn LedgerStore,
    quotes: &valuation::QuoteMap,
    headlines: &[NewsArticle],
    config: &AppConfig,
) -> Result<()> {
    let ledger = store.load()?;

    let total_value = valuation::total_portfolio_value(&ledger.holdings, quotes);
    let total_invested = valuation::total_invested(&ledger.holdings);
    let total_gain = total_value - total_invested;
    let gain_pct = if total_invested > 0.0 {
        total_gain / total_invested * 100.0
    } else {
        0.0
    };
    let gain_style = if total_gain >= 0.0 {
        ui::StyleType::Gain
    } else {
        ui::StyleType::Loss
    };

    println!(
        "{}\n",
        ui::style_text("Personal Finance Dashboard", ui::StyleType::Title)
    );
    println!(
        "Portfolio ({}): {}   {}",
        config.currency,
        ui::style_text(&format!("${total_value:.2}"), ui::StyleType::TotalLabel),
        ui::style_text(&format!("{total_gain:+.2} ({gain_pct:+.2}%)"), gain_style)
    );

    let all: Vec<_> = ledger.expenses.iter().collect();
    let spent = valuation::total_expenses(all.iter().copied());
    match valuation::top_category(all.iter().copied()) {
        Some((category, amount)) => println!(
            "Expenses: ${spent:.2} across {} transactions, led by {category} (${amount:.2})",
            all.len()
        ),
        None => println!("Expenses: none recorded"),
    }

    // Market strip for the tracked coins that have quotes right now.
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Coin"),
        ui::header_cell("Price"),
        ui::header_cell("24h"),
    ]);
    for coin in &config.coins {
        if let Some(quote) = quotes.get(&coin.id) {
            table.add_row(vec![
                Cell::new(format!("{} ({})", quote.name, quote.symbol)),
                ui::money_cell(quote.current_price),
                ui::change_cell(quote.change_24h),
            ]);
        }
    }
    println!("\n{table}");

    if !headlines.is_empty() {
        ui::print_separator();
        news_cli::render(&headlines[..headlines.len().min(3)]);
    }
    Ok(())
}
