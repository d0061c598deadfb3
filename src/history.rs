//! Balance history aggregation shared by every account and loan view.
//!
//! "Current" is always the latest `date_entered`, never the latest inserted
//! entry; "best ever" is the largest balance regardless of date.

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::fx::FxTable;
use crate::models::{BalanceEntry, Item, ItemRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SortField {
    Date,
    Balance,
    Currency,
    Notes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Display-ready metrics for one account or loan.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSummary {
    pub current: Option<f64>,
    pub last_updated: Option<NaiveDate>,
    pub entry_count: usize,
    pub best: Option<f64>,
    pub best_date: Option<NaiveDate>,
    pub delta_vs_best: Option<f64>,
}

fn entries_for(item: ItemRef, entries: &[BalanceEntry]) -> impl Iterator<Item = &BalanceEntry> {
    entries.iter().filter(move |e| e.belongs_to(item))
}

/// Newest first: later date, then higher id on the same day.
fn recency(a: &BalanceEntry, b: &BalanceEntry) -> Ordering {
    b.date_entered
        .cmp(&a.date_entered)
        .then_with(|| b.id.cmp(&a.id))
}

/// Latest-dated entry for `item`. Same-day entries resolve to the higher id.
pub fn current_entry(item: ItemRef, entries: &[BalanceEntry]) -> Option<&BalanceEntry> {
    entries_for(item, entries).min_by(|a, b| recency(a, b))
}

pub fn current_balance(item: ItemRef, entries: &[BalanceEntry]) -> Option<f64> {
    current_entry(item, entries).and_then(|e| e.balance)
}

pub fn last_updated(item: ItemRef, entries: &[BalanceEntry]) -> Option<NaiveDate> {
    current_entry(item, entries).map(|e| e.date_entered)
}

pub fn entry_count(item: ItemRef, entries: &[BalanceEntry]) -> usize {
    entries_for(item, entries).count()
}

/// Entry with the highest balance. Ties keep the first occurrence.
pub fn best_ever(item: ItemRef, entries: &[BalanceEntry]) -> Option<&BalanceEntry> {
    let mut best: Option<(&BalanceEntry, f64)> = None;
    for entry in entries_for(item, entries) {
        let Some(value) = entry.balance else { continue };
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((entry, value)),
        }
    }
    best.map(|(entry, _)| entry)
}

pub fn delta_vs_best(item: ItemRef, entries: &[BalanceEntry]) -> Option<f64> {
    let current = current_balance(item, entries)?;
    let best = best_ever(item, entries)?.balance?;
    Some(current - best)
}

/// Change from the next-older entry; `sorted` must be newest first.
pub fn delta_vs_previous(sorted: &[BalanceEntry], index: usize) -> Option<f64> {
    let this = sorted.get(index)?.balance?;
    let previous = sorted.get(index + 1)?.balance?;
    Some(this - previous)
}

pub fn summarize(item: ItemRef, entries: &[BalanceEntry]) -> ItemSummary {
    let best = best_ever(item, entries);
    ItemSummary {
        current: current_balance(item, entries),
        last_updated: last_updated(item, entries),
        entry_count: entry_count(item, entries),
        best: best.and_then(|e| e.balance),
        best_date: best.map(|e| e.date_entered),
        delta_vs_best: delta_vs_best(item, entries),
    }
}

/// The most recent `limit` entries for `item` (all of them when `None`),
/// then sorted by `field`.
///
/// Date sorts break same-day ties by id in the same direction, so newest
/// first agrees with [`current_entry`]. Other fields tie-break on id
/// ascending. Unset values sort first when ascending.
pub fn historical_table(
    item: ItemRef,
    entries: &[BalanceEntry],
    field: SortField,
    direction: SortDirection,
    limit: Option<usize>,
) -> Vec<BalanceEntry> {
    let mut rows: Vec<BalanceEntry> = entries_for(item, entries).cloned().collect();
    rows.sort_by(recency);
    if let Some(n) = limit {
        rows.truncate(n);
    }
    rows.sort_by(|a, b| {
        let primary = compare_field(a, b, field);
        let primary = match direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    });
    rows
}

fn compare_field(a: &BalanceEntry, b: &BalanceEntry, field: SortField) -> Ordering {
    match field {
        SortField::Date => recency(b, a),
        SortField::Balance => match (a.balance, b.balance) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (x, y) => x.is_some().cmp(&y.is_some()),
        },
        SortField::Currency => a.currency.cmp(&b.currency),
        SortField::Notes => a.notes.cmp(&b.notes),
    }
}

/// Sum of current balances; items with no data count as zero.
pub fn total_across_items<I: Item>(items: &[I], entries: &[BalanceEntry]) -> f64 {
    items
        .iter()
        .filter_map(|i| current_balance(i.item_ref(), entries))
        .sum()
}

/// Copies of `entries` with every balance converted into the base currency.
/// The entry's currency wins over its item's.
pub fn in_base<I: Item>(items: &[I], entries: &[BalanceEntry], fx: &FxTable) -> Vec<BalanceEntry> {
    entries
        .iter()
        .map(|e| {
            let item_code = items
                .iter()
                .find(|i| e.belongs_to(i.item_ref()))
                .and_then(|i| i.currency());
            let code = e.currency.as_deref().or(item_code);
            BalanceEntry {
                balance: e.balance.map(|b| fx.convert_code(b, code)),
                currency: Some(fx.base.code().to_string()),
                ..e.clone()
            }
        })
        .collect()
}

/// [`total_across_items`] after converting into the base currency.
pub fn total_across_items_in<I: Item>(items: &[I], entries: &[BalanceEntry], fx: &FxTable) -> f64 {
    total_across_items(items, &in_base(items, entries, fx))
}

pub fn net_position<A: Item, L: Item>(
    accounts: &[A],
    account_entries: &[BalanceEntry],
    loans: &[L],
    loan_entries: &[BalanceEntry],
) -> f64 {
    total_across_items(accounts, account_entries) - total_across_items(loans, loan_entries)
}

pub fn net_position_in<A: Item, L: Item>(
    accounts: &[A],
    account_entries: &[BalanceEntry],
    loans: &[L],
    loan_entries: &[BalanceEntry],
    fx: &FxTable,
) -> f64 {
    net_position(
        accounts,
        &in_base(accounts, account_entries, fx),
        loans,
        &in_base(loans, loan_entries, fx),
    )
}
