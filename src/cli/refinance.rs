use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::calc::refinance::{compare, RefinanceComparison, Terms};
use crate::cli::{client, display_currency};
use crate::error::{HearthError, Result};
use crate::fmt::money;
use crate::fx::Currency;
use crate::history;
use crate::models::{BalanceEntry, ItemKind, ItemRef, Loan};
use crate::settings::load_settings;

/// Current-loan figures given on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentLoan {
    pub principal: Option<f64>,
    pub rate: Option<f64>,
    pub years: Option<u32>,
}

pub fn run(loan: Option<i64>, flags: CurrentLoan, proposed: Terms, summary: bool) -> Result<()> {
    let settings = load_settings();
    let mut currency = settings.currency();
    let mut current = flags;

    if let Some(id) = loan {
        let api = client(&settings)?;
        let (loans, entries) = rayon::join(|| api.loans(), || api.balances(ItemKind::Loan));
        let loan = loans?
            .into_iter()
            .find(|l| l.id == id)
            .ok_or(HearthError::UnknownItem { kind: "loan", id })?;
        let entries = entries?;
        currency = display_currency(&[loan.currency.as_deref()], currency);
        current = fill_from_loan(flags, &loan, &entries);
    }

    let (principal, terms) = resolve(current)?;
    let result = compare(principal, terms, proposed)?;

    println!("Refinance Comparison\n{}", comparison_table(&result, currency));

    let saving = money(result.monthly_saving.abs(), currency);
    if result.monthly_saving >= 0.0 {
        println!("Monthly saving: {}", saving.green().bold());
    } else {
        println!("Monthly increase: {}", saving.red().bold());
    }
    let lifetime = money(result.lifetime_saving.abs(), currency);
    if result.lifetime_saving >= 0.0 {
        println!("Lifetime saving: {}", lifetime.green());
    } else {
        println!("Lifetime extra cost: {}", lifetime.red());
    }

    if !summary {
        println!("\nYear-by-Year Projection\n{}", projection_table(&result, currency));
    }
    Ok(())
}

/// Flags win; otherwise the latest recorded balance, then the loan's
/// original principal.
fn fill_from_loan(flags: CurrentLoan, loan: &Loan, entries: &[BalanceEntry]) -> CurrentLoan {
    let outstanding = history::current_balance(ItemRef::Loan(loan.id), entries);
    CurrentLoan {
        principal: flags.principal.or(outstanding).or(loan.principal),
        rate: flags.rate.or(loan.rate),
        years: flags.years.or(loan.term_years),
    }
}

fn resolve(current: CurrentLoan) -> Result<(f64, Terms)> {
    let missing = |what: &str| HearthError::Validation(format!("Missing current {what}: pass --{what} or --loan"));
    let principal = current.principal.ok_or_else(|| missing("principal"))?;
    let annual_rate_pct = current.rate.ok_or_else(|| missing("rate"))?;
    let years = current.years.ok_or_else(|| missing("years"))?;
    Ok((principal, Terms { annual_rate_pct, years }))
}

fn comparison_table(c: &RefinanceComparison, currency: Currency) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["", "Current", "Proposed"]);
    let principal = money(c.principal, currency);
    table.add_row(vec![Cell::new("Principal"), Cell::new(&principal), Cell::new(&principal)]);
    table.add_row(vec![
        Cell::new("Rate"),
        Cell::new(format!("{:.2}%", c.current.terms.annual_rate_pct)),
        Cell::new(format!("{:.2}%", c.proposed.terms.annual_rate_pct)),
    ]);
    table.add_row(vec![
        Cell::new("Term"),
        Cell::new(format!("{} years", c.current.terms.years)),
        Cell::new(format!("{} years", c.proposed.terms.years)),
    ]);
    table.add_row(vec![
        Cell::new("Monthly payment".bold()),
        Cell::new(money(c.current.monthly_payment, currency)),
        Cell::new(money(c.proposed.monthly_payment, currency)),
    ]);
    table.add_row(vec![
        Cell::new("Total paid"),
        Cell::new(money(c.current.total_paid, currency)),
        Cell::new(money(c.proposed.total_paid, currency)),
    ]);
    table.add_row(vec![
        Cell::new("Total interest"),
        Cell::new(money(c.current.total_interest, currency)),
        Cell::new(money(c.proposed.total_interest, currency)),
    ]);
    table
}

fn projection_table(c: &RefinanceComparison, currency: Currency) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Year",
        "Current Balance",
        "Current Interest",
        "Proposed Balance",
        "Proposed Interest",
    ]);
    for row in &c.projection {
        table.add_row(vec![
            Cell::new(row.year),
            Cell::new(money(row.current_balance, currency)),
            Cell::new(money(row.current_interest, currency)),
            Cell::new(money(row.proposed_balance, currency)),
            Cell::new(money(row.proposed_interest, currency)),
        ]);
    }
    table
}
