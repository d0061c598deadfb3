use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::calc::tax::{self, Jurisdiction};
use crate::error::{HearthError, Result};
use crate::fmt::{money, pct};
use crate::settings::load_settings;

pub fn company(revenue: f64, jurisdiction: Jurisdiction, expense_ratio: f64) -> Result<()> {
    let currency = load_settings().currency();
    let t = tax::company_tax(revenue, jurisdiction, expense_ratio)?;

    let mut table = Table::new();
    table.set_header(vec!["Item", "Amount"]);
    table.add_row(vec![Cell::new("Revenue (ex VAT)"), Cell::new(money(t.revenue, currency))]);
    table.add_row(vec![
        Cell::new(format!("VAT @ {}", pct(tax::VAT_RATE))),
        Cell::new(money(t.vat, currency)),
    ]);
    table.add_row(vec![Cell::new("Gross incl. VAT"), Cell::new(money(t.gross_with_vat, currency))]);
    table.add_row(vec![
        Cell::new(format!("Expenses @ {}", pct(expense_ratio))),
        Cell::new(money(-t.expenses, currency)),
    ]);
    table.add_row(vec![Cell::new("Profit".bold()), Cell::new(money(t.profit, currency))]);
    table.add_row(vec![
        Cell::new(format!("Corporation tax @ {}", pct(t.corporation_tax_rate))),
        Cell::new(money(-t.corporation_tax, currency)),
    ]);
    table.add_row(vec![
        Cell::new("Net profit".bold()),
        Cell::new(money(t.net_profit, currency).green().bold()),
    ]);

    println!("Company Tax Estimate\n{table}");
    Ok(())
}

pub fn pension(age: u32, earnings: f64, contribution: Option<f64>, marginal_rate: u32) -> Result<()> {
    if marginal_rate > 100 {
        return Err(HearthError::Validation("Marginal rate is a percentage (0-100)".to_string()));
    }
    let currency = load_settings().currency();
    let rate = f64::from(marginal_rate) / 100.0;
    let contribution = contribution.unwrap_or_else(|| tax::pension_limit(age, earnings));
    let r = tax::pension_relief(age, earnings, contribution, rate)?;

    let mut table = Table::new();
    table.set_header(vec!["Item", "Amount"]);
    table.add_row(vec![Cell::new("Earnings (capped)"), Cell::new(money(r.capped_earnings, currency))]);
    table.add_row(vec![
        Cell::new(format!("Age limit @ {}", pct(r.age_rate))),
        Cell::new(money(r.limit, currency)),
    ]);
    table.add_row(vec![Cell::new("Contribution"), Cell::new(money(r.contribution, currency))]);
    table.add_row(vec![Cell::new("Allowed for relief"), Cell::new(money(r.allowed, currency))]);
    table.add_row(vec![
        Cell::new(format!("Tax relief @ {}", pct(r.marginal_rate))),
        Cell::new(money(r.relief, currency).green()),
    ]);
    table.add_row(vec![Cell::new("Net cost".bold()), Cell::new(money(r.net_cost, currency))]);

    println!("Pension Contribution Relief\n{table}");
    if r.excess > 0.0 {
        println!(
            "{}",
            format!("{} exceeds the age-related limit and gets no relief.", money(r.excess, currency)).yellow()
        );
    }
    Ok(())
}
