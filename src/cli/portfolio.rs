use crate::cli::ui;
use crate::ledger::TradeSide;
use crate::market_data::{MarketDataProvider, fallback_quotes};
use crate::snapshot::QuoteCell;
use crate::store::LedgerStore;
use crate::valuation::{self, QuoteMap, quote_map};
use anyhow::Result;
use comfy_table::Cell;
use tracing::warn;

/// Fetches a quote snapshot for the held coins; a failed fetch degrades to
/// the fixed two-asset fallback set rather than erroring.
async fn load_quotes(market: &dyn MarketDataProvider, ids: &[String]) -> QuoteMap {
    let spinner = ui::new_fetch_spinner("Fetching market quotes...");
    let cell = QuoteCell::new();
    let refreshed = cell.refresh(market, ids).await;
    spinner.finish_and_clear();

    if refreshed {
        cell.snapshot()
    } else {
        warn!("Quote source unavailable, using fallback quotes");
        quote_map(fallback_quotes())
    }
}

/// Renders the holdings table with live valuations and unrealized
/// gain/loss per position.
pub async fn show(store: &dyn LedgerStore, market: &dyn MarketDataProvider) -> Result<()> {
    let ledger = store.load()?;
    let ids: Vec<String> = ledger.holdings.iter().map(|h| h.id.clone()).collect();
    let quotes = load_quotes(market, &ids).await;

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Coin"),
        ui::header_cell("Amount"),
        ui::header_cell("Price"),
        ui::header_cell("24h"),
        ui::header_cell("Value"),
        ui::header_cell("Invested"),
        ui::header_cell("Gain/Loss"),
        ui::header_cell("%"),
    ]);

    for holding in &ledger.holdings {
        let change = quotes.get(&holding.id).map(|q| q.change_24h).unwrap_or(0.0);
        table.add_row(vec![
            Cell::new(format!("{} ({})", holding.name, holding.symbol)),
            ui::amount_cell(holding.amount),
            ui::money_cell(valuation::current_price_for(holding, &quotes)),
            ui::change_cell(change),
            ui::money_cell(valuation::holding_value(holding, &quotes)),
            ui::money_cell(valuation::invested_value(holding)),
            ui::signed_money_cell(valuation::gain_loss(holding, &quotes)),
            ui::change_cell(valuation::gain_loss_percent(holding, &quotes)),
        ]);
    }

    let total_value = valuation::total_portfolio_value(&ledger.holdings, &quotes);
    let total_invested = valuation::total_invested(&ledger.holdings);
    let total_gain = total_value - total_invested;
    let gain_style = if total_gain >= 0.0 {
        ui::StyleType::Gain
    } else {
        ui::StyleType::Loss
    };

    println!(
        "{}\n\n{table}",
        ui::style_text("Crypto Portfolio", ui::StyleType::Title)
    );
    println!(
        "\nPortfolio value: {}   Invested: ${total_invested:.2}   Unrealized: {}",
        ui::style_text(&format!("${total_value:.2}"), ui::StyleType::TotalLabel),
        ui::style_text(&format!("{total_gain:+.2}"), gain_style)
    );
    Ok(())
}

/// Adds (or merges into) a holding and persists the ledger.
pub fn add(
    store: &dyn LedgerStore,
    id: &str,
    symbol: &str,
    name: &str,
    amount: f64,
    purchase_price: f64,
) -> Result<()> {
    let mut ledger = store.load()?;
    ledger.add_holding(id, symbol, name, amount, purchase_price);
    store.save(&ledger)?;
    println!("Holding {id} now at {:.4} units", ledger.holding(id).map(|h| h.amount).unwrap_or(0.0));
    Ok(())
}

/// Executes a buy or sell at the live price (cost-basis fallback when the
/// quote source is down) and persists the result.
pub async fn trade(
    store: &dyn LedgerStore,
    market: &dyn MarketDataProvider,
    id: &str,
    side: TradeSide,
    quantity: f64,
) -> Result<()> {
    let mut ledger = store.load()?;
    let Some(holding) = ledger.holding(id) else {
        println!("No holding with id {id}");
        return Ok(());
    };

    let quotes = load_quotes(market, &[id.to_string()]).await;
    let price = valuation::current_price_for(holding, &quotes);

    ledger.buy_sell(id, side, quantity, price);
    store.save(&ledger)?;

    let verb = match side {
        TradeSide::Buy => "Bought",
        TradeSide::Sell => "Sold",
    };
    let amount = ledger.holding(id).map(|h| h.amount).unwrap_or(0.0);
    println!("{verb} {quantity} {id} at ${price:.2}; position now {amount:.4}");
    Ok(())
}
