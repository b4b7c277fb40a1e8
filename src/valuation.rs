//! Pure aggregate functions over a ledger snapshot and a quote snapshot.
//!
//! Nothing here mutates state or performs IO: every displayed figure is
//! recomputed from its inputs, so the functions are safe to call repeatedly
//! in any order. When a coin has no live quote its purchase price stands in
//! for the current price, which reads as zero unrealized gain/loss rather
//! than a missing-data error.

use crate::ledger::{Category, CryptoHolding, Expense};
use crate::market_data::Quote;
use std::collections::HashMap;

/// Map from coin id to its latest quote. An empty map is a valid input and
/// yields cost-basis pricing throughout.
pub type QuoteMap = HashMap<String, Quote>;

pub fn quote_map(quotes: Vec<Quote>) -> QuoteMap {
    quotes.into_iter().map(|q| (q.id.clone(), q)).collect()
}

/// Search/category filter applied upstream of the aggregates. The search
/// term matches case-insensitively against description or notes.
pub fn filter_expenses<'a>(
    expenses: &'a [Expense],
    search: &str,
    category: Option<Category>,
) -> Vec<&'a Expense> {
    let needle = search.to_lowercase();
    expenses
        .iter()
        .filter(|e| {
            let matches_search = needle.is_empty()
                || e.description.to_lowercase().contains(&needle)
                || e.notes
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle));
            let matches_category = category.is_none_or(|c| e.category == c);
            matches_search && matches_category
        })
        .collect()
}

pub fn total_expenses<'a, I>(expenses: I) -> f64
where
    I: IntoIterator<Item = &'a Expense>,
{
    expenses.into_iter().map(|e| e.amount).sum()
}

/// Mean expense amount, zero for an empty working set.
pub fn average_expense(expenses: &[&Expense]) -> f64 {
    if expenses.is_empty() {
        return 0.0;
    }
    total_expenses(expenses.iter().copied()) / expenses.len() as f64
}

/// Per-category totals, sorted by descending amount. The sort is stable and
/// seeded in category enumeration order, so equal totals keep that order.
/// Categories with no spend are omitted.
pub fn expenses_by_category<'a, I>(expenses: I) -> Vec<(Category, f64)>
where
    I: IntoIterator<Item = &'a Expense>,
{
    let mut totals: HashMap<Category, f64> = HashMap::new();
    for expense in expenses {
        *totals.entry(expense.category).or_default() += expense.amount;
    }

    let mut breakdown: Vec<(Category, f64)> = Category::ALL
        .into_iter()
        .filter_map(|c| totals.get(&c).map(|total| (c, *total)))
        .collect();
    breakdown.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    breakdown
}

pub fn top_category<'a, I>(expenses: I) -> Option<(Category, f64)>
where
    I: IntoIterator<Item = &'a Expense>,
{
    expenses_by_category(expenses).into_iter().next()
}

/// Live price when a quote exists, otherwise the holding's purchase price.
pub fn current_price_for(holding: &CryptoHolding, quotes: &QuoteMap) -> f64 {
    quotes
        .get(&holding.id)
        .map(|q| q.current_price)
        .unwrap_or(holding.purchase_price)
}

pub fn holding_value(holding: &CryptoHolding, quotes: &QuoteMap) -> f64 {
    holding.amount * current_price_for(holding, quotes)
}

pub fn invested_value(holding: &CryptoHolding) -> f64 {
    holding.amount * holding.purchase_price
}

pub fn gain_loss(holding: &CryptoHolding, quotes: &QuoteMap) -> f64 {
    holding_value(holding, quotes) - invested_value(holding)
}

/// Unrealized gain/loss as a percentage of invested value, zero when
/// nothing is invested.
pub fn gain_loss_percent(holding: &CryptoHolding, quotes: &QuoteMap) -> f64 {
    let invested = invested_value(holding);
    if invested == 0.0 {
        return 0.0;
    }
    gain_loss(holding, quotes) / invested * 100.0
}

pub fn total_portfolio_value(holdings: &[CryptoHolding], quotes: &QuoteMap) -> f64 {
    holdings.iter().map(|h| holding_value(h, quotes)).sum()
}

pub fn total_invested(holdings: &[CryptoHolding]) -> f64 {
    holdings.iter().map(invested_value).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn expense(amount: f64, category: Category) -> Expense {
        Expense {
            id: 0,
            description: "test".into(),
            amount,
            category,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            notes: None,
        }
    }

    fn holding(id: &str, amount: f64, purchase_price: f64) -> CryptoHolding {
        CryptoHolding {
            id: id.into(),
            symbol: id.to_uppercase(),
            name: id.into(),
            amount,
            purchase_price,
        }
    }

    fn quote(id: &str, price: f64) -> Quote {
        Quote {
            id: id.into(),
            symbol: id.to_uppercase(),
            name: id.into(),
            current_price: price,
            change_24h: 0.0,
            market_cap: 0.0,
            volume_24h: 0.0,
            image: None,
        }
    }

    #[test]
    fn test_total_matches_filtered_subset() {
        let expenses = vec![
            expense(85.5, Category::Food),
            expense(45.0, Category::Transportation),
            expense(12.75, Category::Food),
        ];
        let food = filter_expenses(&expenses, "", Some(Category::Food));
        assert!((total_expenses(food.iter().copied()) - 98.25).abs() < 1e-9);

        let all = filter_expenses(&expenses, "", None);
        assert!((total_expenses(all.iter().copied()) - 143.25).abs() < 1e-9);
    }

    #[test]
    fn test_filter_matches_description_and_notes() {
        let mut a = expense(10.0, Category::Food);
        a.description = "Grocery Store".into();
        let mut b = expense(20.0, Category::Other);
        b.description = "Misc".into();
        b.notes = Some("grocery run".into());
        let expenses = vec![a, b];

        let hits = filter_expenses(&expenses, "GROCERY", None);
        assert_eq!(hits.len(), 2);
        let misses = filter_expenses(&expenses, "fuel", None);
        assert!(misses.is_empty());
    }

    #[test]
    fn test_average_expense_edge_cases() {
        assert_eq!(average_expense(&[]), 0.0);
        let single = expense(42.5, Category::Bills);
        assert!((average_expense(&[&single]) - 42.5).abs() < 1e-9);
    }

    #[test]
    fn test_expenses_by_category_sorted_desc() {
        let expenses = vec![
            expense(85.5, Category::Food),
            expense(45.0, Category::Transportation),
            expense(12.75, Category::Food),
        ];
        let breakdown = expenses_by_category(&expenses);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].0, Category::Food);
        assert!((breakdown[0].1 - 98.25).abs() < 1e-9);
        assert_eq!(breakdown[1].0, Category::Transportation);
        assert!((breakdown[1].1 - 45.0).abs() < 1e-9);

        assert_eq!(top_category(&expenses).unwrap().0, Category::Food);
    }

    #[test]
    fn test_category_tie_breaks_in_enumeration_order() {
        let expenses = vec![
            expense(50.0, Category::Bills),
            expense(50.0, Category::Food),
            expense(50.0, Category::Health),
        ];
        let breakdown = expenses_by_category(&expenses);
        let order: Vec<Category> = breakdown.into_iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec![Category::Food, Category::Health, Category::Bills]);
    }

    #[test]
    fn test_current_price_falls_back_to_purchase_price() {
        let h = holding("bitcoin", 0.25, 41000.0);
        let empty = QuoteMap::new();
        assert_eq!(current_price_for(&h, &empty), 41000.0);
        assert_eq!(gain_loss(&h, &empty), 0.0);

        let quotes = quote_map(vec![quote("bitcoin", 43200.0)]);
        assert_eq!(current_price_for(&h, &quotes), 43200.0);
    }

    #[test]
    fn test_bitcoin_gain_scenario() {
        let h = holding("bitcoin", 0.25, 41000.0);
        let quotes = quote_map(vec![quote("bitcoin", 43200.0)]);

        assert!((holding_value(&h, &quotes) - 10800.0).abs() < 1e-9);
        assert!((invested_value(&h) - 10250.0).abs() < 1e-9);
        assert!((gain_loss(&h, &quotes) - 550.0).abs() < 1e-9);
        assert!((gain_loss_percent(&h, &quotes) - 5.365853658536586).abs() < 1e-9);
    }

    #[test]
    fn test_zero_invested_means_zero_percent() {
        let empty_position = holding("bitcoin", 0.0, 41000.0);
        let quotes = quote_map(vec![quote("bitcoin", 43200.0)]);
        assert_eq!(gain_loss_percent(&empty_position, &quotes), 0.0);

        let free_coins = holding("airdrop", 100.0, 0.0);
        let quotes = quote_map(vec![quote("airdrop", 5.0)]);
        assert_eq!(gain_loss_percent(&free_coins, &quotes), 0.0);
    }

    #[test]
    fn test_portfolio_totals() {
        let holdings = vec![holding("bitcoin", 0.25, 41000.0), holding("ethereum", 2.0, 2800.0)];
        let quotes = quote_map(vec![quote("bitcoin", 43200.0)]);

        // Bitcoin priced live, ethereum at cost basis.
        assert!((total_portfolio_value(&holdings, &quotes) - (10800.0 + 5600.0)).abs() < 1e-9);
        assert!((total_invested(&holdings) - (10250.0 + 5600.0)).abs() < 1e-9);
    }

    #[test]
    fn test_totals_are_order_independent() {
        let mut holdings = vec![
            holding("bitcoin", 0.25, 41000.0),
            holding("ethereum", 2.0, 2800.0),
            holding("solana", 15.0, 85.0),
        ];
        let quotes = quote_map(vec![quote("bitcoin", 43200.0), quote("solana", 95.0)]);
        let forward = total_portfolio_value(&holdings, &quotes);
        holdings.reverse();
        let reverse = total_portfolio_value(&holdings, &quotes);
        assert!((forward - reverse).abs() < 1e-9);
    }
}
