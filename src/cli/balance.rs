use chrono::NaiveDate;

use crate::api::ApiClient;
use crate::cli::{authed_client, date_or_dash, display_currency, parse_currency_opt};
use crate::error::{HearthError, Result};
use crate::fmt;
use crate::history;
use crate::models::{BalanceEntry, ItemKind, ItemRef, NewBalanceEntry};
use crate::settings::{load_settings, Settings};

fn check_amount(amount: f64) -> Result<f64> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(HearthError::Validation(format!("Invalid amount: {amount}")))
    }
}

pub fn add(
    kind: ItemKind,
    id: i64,
    amount: f64,
    date: Option<NaiveDate>,
    currency: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    let body = NewBalanceEntry {
        balance: check_amount(amount)?,
        date_entered: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
        currency: parse_currency_opt(currency)?,
        notes: notes.filter(|n| !n.trim().is_empty()),
    };
    let settings = load_settings();
    let api = authed_client(&settings)?;
    let item = kind.item(id);
    let created = api.add_balance(item, &body)?;
    tracing::debug!(entry = created.id, "balance recorded");
    println!(
        "Recorded {} for {} {id} on {} (entry {}).",
        fmt::balance(created.balance, entry_currency(&created, &settings)),
        kind.label(),
        created.date_entered,
        created.id,
    );
    print_current(&api, item, &settings)
}

/// Fields left as `None` keep their stored values.
pub fn edit(
    kind: ItemKind,
    entry_id: i64,
    amount: Option<f64>,
    date: Option<NaiveDate>,
    currency: Option<String>,
    notes: Option<String>,
) -> Result<()> {
    if amount.is_none() && date.is_none() && currency.is_none() && notes.is_none() {
        return Err(HearthError::Validation(
            "Nothing to change: pass at least one of --amount, --date, --currency, --notes".to_string(),
        ));
    }
    let currency = parse_currency_opt(currency)?;
    let settings = load_settings();
    let api = authed_client(&settings)?;
    let existing = find_entry(&api, kind, entry_id)?;

    let body = merge_edit(&existing, amount.map(check_amount).transpose()?, date, currency, notes)?;
    let updated = api.update_balance(kind, entry_id, &body)?;
    println!(
        "Updated entry {entry_id}: {} on {}.",
        fmt::balance(updated.balance, entry_currency(&updated, &settings)),
        updated.date_entered
    );
    match existing.item() {
        Some(item) => print_current(&api, item, &settings),
        None => Ok(()),
    }
}

pub fn delete(kind: ItemKind, entry_id: i64) -> Result<()> {
    let settings = load_settings();
    let api = authed_client(&settings)?;
    let existing = find_entry(&api, kind, entry_id)?;
    api.delete_balance(kind, entry_id)?;
    println!("Deleted {} balance entry {entry_id}.", kind.label());
    match existing.item() {
        Some(item) => print_current(&api, item, &settings),
        None => Ok(()),
    }
}

fn find_entry(api: &ApiClient, kind: ItemKind, entry_id: i64) -> Result<BalanceEntry> {
    api.balances(kind)?
        .into_iter()
        .find(|e| e.id == entry_id)
        .ok_or(HearthError::UnknownItem {
            kind: "balance entry",
            id: entry_id,
        })
}

fn merge_edit(
    existing: &BalanceEntry,
    amount: Option<f64>,
    date: Option<NaiveDate>,
    currency: Option<String>,
    notes: Option<String>,
) -> Result<NewBalanceEntry> {
    let balance = amount.or(existing.balance).ok_or_else(|| {
        HearthError::Validation(format!("Entry {} has no balance; pass --amount", existing.id))
    })?;
    Ok(NewBalanceEntry {
        balance,
        date_entered: date.unwrap_or(existing.date_entered),
        currency: currency.or_else(|| existing.currency.clone()),
        // an empty --notes clears the note
        notes: match notes {
            Some(n) if n.trim().is_empty() => None,
            Some(n) => Some(n),
            None => existing.notes.clone(),
        },
    })
}

fn entry_currency(entry: &BalanceEntry, settings: &Settings) -> crate::fx::Currency {
    display_currency(&[entry.currency.as_deref()], settings.currency())
}

/// Re-fetch after a change so the printed figure is the server's view.
fn print_current(api: &ApiClient, item: ItemRef, settings: &Settings) -> Result<()> {
    let entries = api.balances(item.kind())?;
    let current = history::current_entry(item, &entries);
    let currency = display_currency(&[current.and_then(|e| e.currency.as_deref())], settings.currency());
    println!(
        "Current balance: {} (as of {})",
        fmt::balance(current.and_then(|e| e.balance), currency),
        date_or_dash(current.map(|e| e.date_entered))
    );
    Ok(())
}
