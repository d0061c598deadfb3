use std::collections::HashMap;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::api::ApiClient;
use crate::cli::{client, date_or_dash, display_currency};
use crate::error::{HearthError, Result};
use crate::fmt;
use crate::history::{self, SortDirection, SortField};
use crate::models::{BalanceEntry, ItemKind, ItemRef};
use crate::settings::load_settings;

/// Name and currency of the account or loan being viewed.
pub(crate) fn lookup_item(api: &ApiClient, item: ItemRef) -> Result<(String, Option<String>)> {
    let found = match item {
        ItemRef::Account(id) => api
            .accounts()?
            .into_iter()
            .find(|a| a.id == id)
            .map(|a| (a.name, a.currency)),
        ItemRef::Loan(id) => api
            .loans()?
            .into_iter()
            .find(|l| l.id == id)
            .map(|l| (l.name, l.currency)),
    };
    found.ok_or(HearthError::UnknownItem {
        kind: item.kind().label(),
        id: item.id(),
    })
}

pub fn run(kind: ItemKind, id: i64, sort: SortField, asc: bool, all: bool) -> Result<()> {
    let settings = load_settings();
    let api = client(&settings)?;
    let item = kind.item(id);
    let (info, entries) = rayon::join(|| lookup_item(&api, item), || api.balances(kind));
    let (name, item_currency) = info?;
    let entries = entries?;

    let direction = if asc { SortDirection::Asc } else { SortDirection::Desc };
    let limit = (!all).then_some(settings.history_limit);
    let rows = history::historical_table(item, &entries, sort, direction, limit);
    let total = history::entry_count(item, &entries);
    let deltas = chronological_deltas(item, &entries);

    let base = settings.currency();
    let mut table = Table::new();
    table.set_header(vec!["Entry", "Date", "Balance", "Change", "Currency", "Notes"]);
    for row in &rows {
        let currency = display_currency(&[row.currency.as_deref(), item_currency.as_deref()], base);
        let change = deltas.get(&row.id).copied().flatten();
        let change_text = fmt::delta(change, currency);
        let change_cell = match change {
            Some(d) if d < 0.0 => Cell::new(change_text.red()),
            Some(d) if d > 0.0 => Cell::new(change_text.green()),
            _ => Cell::new(change_text),
        };
        table.add_row(vec![
            Cell::new(row.id),
            Cell::new(row.date_entered),
            Cell::new(fmt::balance(row.balance, currency)),
            change_cell,
            Cell::new(row.currency.as_deref().unwrap_or("")),
            Cell::new(row.notes.as_deref().unwrap_or("")),
        ]);
    }

    let summary = history::summarize(item, &entries);
    let currency = display_currency(&[item_currency.as_deref()], base);
    println!("{}: {name}", kind.label().to_uppercase().bold());
    println!("Current:      {}", fmt::balance(summary.current, currency));
    println!("Last updated: {}", date_or_dash(summary.last_updated));
    println!(
        "Best ever:    {} ({})",
        fmt::balance(summary.best, currency),
        date_or_dash(summary.best_date)
    );
    println!("vs best:      {}", fmt::delta(summary.delta_vs_best, currency));
    println!();

    if rows.is_empty() {
        println!("No balance entries recorded yet.");
        return Ok(());
    }
    println!("{table}");
    if rows.len() < total {
        println!("Showing {} of {total} entries (use --all to see every entry).", rows.len());
    }
    Ok(())
}

/// Change from the previous snapshot by date, keyed by entry id.
fn chronological_deltas(item: ItemRef, entries: &[BalanceEntry]) -> HashMap<i64, Option<f64>> {
    let sorted = history::historical_table(item, entries, SortField::Date, SortDirection::Desc, None);
    sorted
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id, history::delta_vs_previous(&sorted, i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(id: i64, d: &str, balance: f64) -> BalanceEntry {
        BalanceEntry {
            id,
            account_id: Some(1),
            loan_id: None,
            balance: Some(balance),
            date_entered: NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(),
            currency: None,
            notes: None,
        }
    }

    #[test]
    fn test_chronological_deltas_ignore_display_order() {
        let entries = vec![
            entry(1, "2024-01-01", 1000.0),
            entry(2, "2024-03-01", 1200.0),
            entry(3, "2024-02-01", 900.0),
        ];
        let deltas = chronological_deltas(ItemRef::Account(1), &entries);
        assert_eq!(deltas[&2], Some(300.0));
        assert_eq!(deltas[&3], Some(-100.0));
        assert_eq!(deltas[&1], None);
    }

    #[test]
    fn test_chronological_deltas_same_day_uses_higher_id_as_newer() {
        let entries = vec![
            entry(5, "2024-01-01", 20.0),
            entry(7, "2024-01-01", 10.0),
            entry(1, "2023-12-01", 15.0),
        ];
        let deltas = chronological_deltas(ItemRef::Account(1), &entries);
        assert_eq!(deltas[&7], Some(-10.0));
        assert_eq!(deltas[&5], Some(5.0));
        assert_eq!(deltas[&1], None);
    }
}
