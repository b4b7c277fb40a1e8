use crate::cli::ui;
use crate::ledger::Category;
use crate::store::LedgerStore;
use crate::valuation;
use anyhow::Result;
use chrono::{Local, NaiveDate};
use comfy_table::Cell;
use console::style;
use tracing::info;

/// Renders the expense list with summary figures, optionally narrowed by a
/// search term and category.
pub fn list(store: &dyn LedgerStore, search: &str, category: Option<Category>) -> Result<()> {
    let ledger = store.load()?;
    let working_set = valuation::filter_expenses(&ledger.expenses, search, category);

    let total = valuation::total_expenses(working_set.iter().copied());
    let average = valuation::average_expense(&working_set);
    let top = valuation::top_category(working_set.iter().copied());

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Date"),
        ui::header_cell("Description"),
        ui::header_cell("Category"),
        ui::header_cell("Amount"),
        ui::header_cell("Notes"),
    ]);
    for expense in &working_set {
        table.add_row(vec![
            Cell::new(expense.id),
            Cell::new(expense.date),
            Cell::new(&expense.description),
            Cell::new(expense.category),
            ui::money_cell(expense.amount),
            Cell::new(expense.notes.as_deref().unwrap_or("")),
        ]);
    }

    println!(
        "{}\n\n{table}",
        ui::style_text("Expense Tracker", ui::StyleType::Title)
    );
    println!(
        "\nTotal: {}  ({} transactions)",
        ui::style_text(&format!("${total:.2}"), ui::StyleType::TotalLabel),
        working_set.len()
    );
    println!("Average: ${average:.2} per transaction");
    if let Some((category, amount)) = top {
        println!("Top category: {category} (${amount:.2})");
    }

    let breakdown = valuation::expenses_by_category(working_set.iter().copied());
    if !breakdown.is_empty() {
        ui::print_separator();
        println!("{}", ui::style_text("By category", ui::StyleType::Title));
        for (category, amount) in breakdown {
            let share = if total > 0.0 { amount / total * 100.0 } else { 0.0 };
            println!("  {category:<15} ${amount:>10.2}  {}", style(format!("{share:.1}%")).dim());
        }
    }
    Ok(())
}

/// Adds an expense and persists the ledger. An invalid submission prints
/// nothing and changes nothing, mirroring a form that simply does not
/// submit.
pub fn add(
    store: &dyn LedgerStore,
    description: &str,
    amount: f64,
    category: Category,
    date: Option<NaiveDate>,
    notes: Option<String>,
) -> Result<()> {
    let mut ledger = store.load()?;
    let date = date.unwrap_or_else(|| Local::now().date_naive());

    match ledger.add_expense(description, amount, category, date, notes) {
        Some(id) => {
            store.save(&ledger)?;
            println!("Added expense #{id}: {description} (${amount:.2})");
        }
        None => {
            info!("Expense submission rejected");
        }
    }
    Ok(())
}

pub fn remove(store: &dyn LedgerStore, id: u64) -> Result<()> {
    let mut ledger = store.load()?;
    if ledger.delete_expense(id) {
        store.save(&ledger)?;
        println!("Deleted expense #{id}");
    } else {
        println!("No expense with id {id}");
    }
    Ok(())
}
