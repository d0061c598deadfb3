use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{client, date_or_dash};
use crate::error::Result;
use crate::fmt::money;
use crate::fx::FxTable;
use crate::history;
use crate::models::{Account, BalanceEntry, Item, ItemKind, Loan};
use crate::settings::load_settings;

pub struct Overview {
    pub account_total: f64,
    pub loan_total: f64,
    pub net_position: f64,
    pub accounts_without_data: usize,
    pub loans_without_data: usize,
    pub last_updated: Option<chrono::NaiveDate>,
}

fn without_data<I: Item>(items: &[I], entries: &[BalanceEntry]) -> usize {
    items
        .iter()
        .filter(|i| history::current_balance(i.item_ref(), entries).is_none())
        .count()
}

pub fn build(
    accounts: &[Account],
    account_entries: &[BalanceEntry],
    loans: &[Loan],
    loan_entries: &[BalanceEntry],
    fx: &FxTable,
) -> Overview {
    let account_total = history::total_across_items_in(accounts, account_entries, fx);
    let loan_total = history::total_across_items_in(loans, loan_entries, fx);
    let last_updated = account_entries
        .iter()
        .chain(loan_entries)
        .map(|e| e.date_entered)
        .max();
    Overview {
        account_total,
        loan_total,
        net_position: history::net_position_in(accounts, account_entries, loans, loan_entries, fx),
        accounts_without_data: without_data(accounts, account_entries),
        loans_without_data: without_data(loans, loan_entries),
        last_updated,
    }
}

pub fn run() -> Result<()> {
    let settings = load_settings();
    let api = client(&settings)?;
    let ((accounts, loans), (account_entries, loan_entries)) = rayon::join(
        || rayon::join(|| api.accounts(), || api.loans()),
        || rayon::join(|| api.balances(ItemKind::Account), || api.balances(ItemKind::Loan)),
    );
    let (accounts, loans) = (accounts?, loans?);
    let (account_entries, loan_entries) = (account_entries?, loan_entries?);

    let base = settings.currency();
    let o = build(&accounts, &account_entries, &loans, &loan_entries, &settings.fx());

    let mut table = Table::new();
    table.set_header(vec!["", "Items", "Total"]);
    table.add_row(vec![
        Cell::new("Accounts"),
        Cell::new(accounts.len()),
        Cell::new(money(o.account_total, base)),
    ]);
    table.add_row(vec![
        Cell::new("Loans"),
        Cell::new(loans.len()),
        Cell::new(money(o.loan_total, base)),
    ]);
    let net = money(o.net_position, base);
    let net_cell = if o.net_position < 0.0 {
        Cell::new(net.red().bold())
    } else {
        Cell::new(net.green().bold())
    };
    table.add_row(vec![Cell::new("Net Position".bold()), Cell::new(""), net_cell]);

    println!("Overview ({base})\n{table}");
    println!("Last updated: {}", date_or_dash(o.last_updated));
    if o.accounts_without_data + o.loans_without_data > 0 {
        println!(
            "{}",
            format!(
                "{} account(s) and {} loan(s) have no balance recorded and count as zero.",
                o.accounts_without_data, o.loans_without_data
            )
            .yellow()
        );
    }
    Ok(())
}
