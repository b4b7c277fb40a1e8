use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Closed set of expense categories. The breakdown chart and the
/// category filter both iterate [`Category::ALL`] in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum Category {
    Food,
    Transportation,
    Entertainment,
    Health,
    Education,
    Shopping,
    Bills,
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Transportation,
        Category::Entertainment,
        Category::Health,
        Category::Education,
        Category::Shopping,
        Category::Bills,
        Category::Other,
    ];

    pub fn parse(s: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Food => "Food",
            Category::Transportation => "Transportation",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health",
            Category::Education => "Education",
            Category::Shopping => "Shopping",
            Category::Bills => "Bills",
            Category::Other => "Other",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: u64,
    pub description: String,
    pub amount: f64,
    pub category: Category,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoHolding {
    /// Exchange-agnostic coin key, e.g. "bitcoin". Unique within the ledger.
    pub id: String,
    pub symbol: String,
    pub name: String,
    /// Quantity held. Never negative.
    pub amount: f64,
    /// Cost basis per unit from the first acquisition. Deliberately not
    /// recomputed on later buys.
    pub purchase_price: f64,
}

/// Partial update for [`Ledger::update_holding`]. Unset fields are left as-is.
#[derive(Debug, Clone, Default)]
pub struct HoldingUpdate {
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub purchase_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// The persisted record of user-entered expenses and crypto holdings.
///
/// All writes go through the methods here; derived figures live in
/// [`crate::valuation`] and are recomputed from a snapshot on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub expenses: Vec<Expense>,
    pub holdings: Vec<CryptoHolding>,
}

impl Ledger {
    pub fn empty() -> Self {
        Ledger {
            expenses: Vec::new(),
            holdings: Vec::new(),
        }
    }

    /// Built-in dataset used when no stored ledger exists yet.
    pub fn seed() -> Self {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        Ledger {
            expenses: vec![
                Expense {
                    id: 1,
                    description: "Grocery Store".into(),
                    amount: 85.5,
                    category: Category::Food,
                    date: d(2024, 1, 15),
                    notes: Some("Weekly groceries".into()),
                },
                Expense {
                    id: 2,
                    description: "Gas Station".into(),
                    amount: 45.0,
                    category: Category::Transportation,
                    date: d(2024, 1, 14),
                    notes: Some("Fill up tank".into()),
                },
                Expense {
                    id: 3,
                    description: "Coffee Shop".into(),
                    amount: 12.75,
                    category: Category::Food,
                    date: d(2024, 1, 14),
                    notes: None,
                },
                Expense {
                    id: 4,
                    description: "Netflix Subscription".into(),
                    amount: 15.99,
                    category: Category::Entertainment,
                    date: d(2024, 1, 13),
                    notes: None,
                },
                Expense {
                    id: 5,
                    description: "Uber Ride".into(),
                    amount: 18.5,
                    category: Category::Transportation,
                    date: d(2024, 1, 12),
                    notes: None,
                },
                Expense {
                    id: 6,
                    description: "Restaurant Dinner".into(),
                    amount: 67.25,
                    category: Category::Food,
                    date: d(2024, 1, 11),
                    notes: None,
                },
                Expense {
                    id: 7,
                    description: "Gym Membership".into(),
                    amount: 29.99,
                    category: Category::Health,
                    date: d(2024, 1, 10),
                    notes: None,
                },
                Expense {
                    id: 8,
                    description: "Book Purchase".into(),
                    amount: 24.99,
                    category: Category::Education,
                    date: d(2024, 1, 9),
                    notes: None,
                },
            ],
            holdings: vec![
                CryptoHolding {
                    id: "bitcoin".into(),
                    symbol: "BTC".into(),
                    name: "Bitcoin".into(),
                    amount: 0.25,
                    purchase_price: 41000.0,
                },
                CryptoHolding {
                    id: "ethereum".into(),
                    symbol: "ETH".into(),
                    name: "Ethereum".into(),
                    amount: 2.1,
                    purchase_price: 2800.0,
                },
                CryptoHolding {
                    id: "cardano".into(),
                    symbol: "ADA".into(),
                    name: "Cardano".into(),
                    amount: 1500.0,
                    purchase_price: 0.48,
                },
                CryptoHolding {
                    id: "solana".into(),
                    symbol: "SOL".into(),
                    name: "Solana".into(),
                    amount: 15.0,
                    purchase_price: 85.0,
                },
            ],
        }
    }

    /// Records a new expense at the front of the list so the most recent
    /// entry displays first. Returns the assigned id, or `None` when the
    /// submission is invalid (blank description or non-positive amount);
    /// invalid submissions are a silent no-op.
    pub fn add_expense(
        &mut self,
        description: &str,
        amount: f64,
        category: Category,
        date: NaiveDate,
        notes: Option<String>,
    ) -> Option<u64> {
        let description = description.trim();
        if description.is_empty() || amount <= 0.0 {
            debug!(%amount, "Rejected expense submission");
            return None;
        }

        let id = self.expenses.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        self.expenses.insert(
            0,
            Expense {
                id,
                description: description.to_string(),
                amount,
                category,
                date,
                notes,
            },
        );
        Some(id)
    }

    /// Removes the expense with the given id. Unknown ids are a no-op.
    pub fn delete_expense(&mut self, id: u64) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        self.expenses.len() != before
    }

    pub fn holding(&self, id: &str) -> Option<&CryptoHolding> {
        self.holdings.iter().find(|h| h.id == id)
    }

    /// Adds a holding. The coin id is a unique key: adding an id that
    /// already exists merges quantities into the existing holding and
    /// refreshes its display fields. The purchase price of the first
    /// acquisition is kept.
    pub fn add_holding(
        &mut self,
        id: &str,
        symbol: &str,
        name: &str,
        amount: f64,
        purchase_price: f64,
    ) {
        if let Some(existing) = self.holdings.iter_mut().find(|h| h.id == id) {
            debug!(coin = %id, "Merging into existing holding");
            existing.amount += amount.max(0.0);
            existing.symbol = symbol.to_string();
            existing.name = name.to_string();
            return;
        }
        self.holdings.push(CryptoHolding {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            amount: amount.max(0.0),
            purchase_price,
        });
    }

    /// Merges the set fields of `update` into the matching holding.
    /// Unknown ids are a no-op. A negative amount is clamped to zero.
    pub fn update_holding(&mut self, id: &str, update: HoldingUpdate) -> bool {
        let Some(holding) = self.holdings.iter_mut().find(|h| h.id == id) else {
            return false;
        };
        if let Some(symbol) = update.symbol {
            holding.symbol = symbol;
        }
        if let Some(name) = update.name {
            holding.name = name;
        }
        if let Some(amount) = update.amount {
            holding.amount = amount.max(0.0);
        }
        if let Some(purchase_price) = update.purchase_price {
            holding.purchase_price = purchase_price;
        }
        true
    }

    /// Applies a buy or sell to the matching holding. Buying adds to the
    /// quantity; selling subtracts, clamped at zero (selling more than held
    /// empties the position rather than erroring). The cost basis stays at
    /// the first purchase price; the execution price is recorded in the log
    /// only. Unknown ids are a no-op.
    pub fn buy_sell(&mut self, id: &str, side: TradeSide, quantity: f64, price: f64) -> bool {
        let Some(holding) = self.holdings.iter_mut().find(|h| h.id == id) else {
            return false;
        };
        let quantity = quantity.max(0.0);
        holding.amount = match side {
            TradeSide::Buy => holding.amount + quantity,
            TradeSide::Sell => (holding.amount - quantity).max(0.0),
        };
        debug!(coin = %id, ?side, %quantity, execution_price = %price, new_amount = %holding.amount, "Applied trade");
        true
    }
}
