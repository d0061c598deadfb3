use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{client, date_or_dash, display_currency};
use crate::error::Result;
use crate::fmt;
use crate::history::{self, current_entry};
use crate::models::{BalanceEntry, Item, ItemKind};
use crate::settings::{load_settings, Settings};

pub fn accounts() -> Result<()> {
    let settings = load_settings();
    let api = client(&settings)?;
    let (items, entries) = rayon::join(|| api.accounts(), || api.balances(ItemKind::Account));
    let table = item_table(&items?, &entries?, &settings);
    println!("Accounts\n{table}");
    Ok(())
}

pub fn loans() -> Result<()> {
    let settings = load_settings();
    let api = client(&settings)?;
    let (items, entries) = rayon::join(|| api.loans(), || api.balances(ItemKind::Loan));
    let table = item_table(&items?, &entries?, &settings);
    println!("Loans\n{table}");
    Ok(())
}

pub(crate) fn item_table<I: Item>(items: &[I], entries: &[BalanceEntry], settings: &Settings) -> Table {
    let base = settings.currency();
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Current", "Last Updated", "Entries", "Best Ever", "vs Best"]);

    for item in items {
        let item_ref = item.item_ref();
        let summary = history::summarize(item_ref, entries);
        let currency = display_currency(
            &[
                current_entry(item_ref, entries).and_then(|e| e.currency.as_deref()),
                item.currency(),
            ],
            base,
        );
        let delta = fmt::delta(summary.delta_vs_best, currency);
        let delta_cell = match summary.delta_vs_best {
            Some(d) if d < 0.0 => Cell::new(delta.red()),
            Some(_) => Cell::new(delta.green()),
            None => Cell::new(delta),
        };
        table.add_row(vec![
            Cell::new(item_ref.id()),
            Cell::new(item.name()),
            Cell::new(fmt::balance(summary.current, currency)),
            Cell::new(date_or_dash(summary.last_updated)),
            Cell::new(summary.entry_count),
            Cell::new(fmt::balance(summary.best, currency)),
            delta_cell,
        ]);
    }

    let total = history::total_across_items_in(items, entries, &settings.fx());
    table.add_row(vec![
        Cell::new(""),
        Cell::new("Total".bold()),
        Cell::new(fmt::money(total, base).bold()),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
        Cell::new(""),
    ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Account;
    use chrono::NaiveDate;

    fn entry(id: i64, account: i64, balance: Option<f64>) -> BalanceEntry {
        BalanceEntry {
            id,
            account_id: Some(account),
            loan_id: None,
            balance,
            date_entered: NaiveDate::from_ymd_opt(2024, 1, id as u32).unwrap(),
            currency: None,
            notes: None,
        }
    }

    fn account(id: i64, name: &str) -> Account {
        Account {
            id,
            name: name.to_string(),
            institution: None,
            account_type: None,
            currency: None,
        }
    }

    #[test]
    fn test_item_table_shows_not_set_and_zero() {
        colored::control::set_override(false);
        let accounts = vec![account(1, "Empty"), account(2, "Drained"), account(3, "Savings")];
        let entries = vec![entry(1, 2, Some(0.0)), entry(2, 3, Some(2500.0))];
        let rendered = item_table(&accounts, &entries, &Settings::default()).to_string();
        assert!(rendered.contains("Not set"));
        assert!(rendered.contains("€0.00"));
        assert!(rendered.contains("€2,500.00"));
        assert!(rendered.contains("Total"));
    }
}
