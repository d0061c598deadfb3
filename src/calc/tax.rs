use crate::error::{HearthError, Result};

pub const VAT_RATE: f64 = 0.23;
pub const DEFAULT_EXPENSE_RATIO: f64 = 0.40;
pub const PENSION_EARNINGS_CAP: f64 = 115_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Jurisdiction {
    #[value(name = "ie")]
    Ireland,
    #[value(name = "uk")]
    Uk,
}

impl Jurisdiction {
    pub fn corporation_tax_rate(self) -> f64 {
        match self {
            Self::Ireland => 0.125,
            Self::Uk => 0.19,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyTax {
    pub revenue: f64,
    pub vat: f64,
    pub gross_with_vat: f64,
    pub expenses: f64,
    pub profit: f64,
    pub corporation_tax_rate: f64,
    pub corporation_tax: f64,
    pub net_profit: f64,
}

pub fn company_tax(revenue: f64, jurisdiction: Jurisdiction, expense_ratio: f64) -> Result<CompanyTax> {
    if !revenue.is_finite() || revenue < 0.0 {
        return Err(HearthError::Validation("Revenue cannot be negative".to_string()));
    }
    if !(0.0..=1.0).contains(&expense_ratio) {
        return Err(HearthError::Validation("Expense ratio must be between 0 and 1".to_string()));
    }
    let vat = revenue * VAT_RATE;
    let expenses = revenue * expense_ratio;
    let profit = revenue - expenses;
    let rate = jurisdiction.corporation_tax_rate();
    let corporation_tax = profit * rate;
    Ok(CompanyTax {
        revenue,
        vat,
        gross_with_vat: revenue + vat,
        expenses,
        profit,
        corporation_tax_rate: rate,
        corporation_tax,
        net_profit: profit - corporation_tax,
    })
}

/// Share of capped earnings that may be contributed with tax relief.
pub fn age_band_rate(age: u32) -> f64 {
    match age {
        0..=29 => 0.15,
        30..=39 => 0.20,
        40..=49 => 0.25,
        50..=54 => 0.30,
        55..=59 => 0.35,
        _ => 0.40,
    }
}

pub fn pension_limit(age: u32, earnings: f64) -> f64 {
    earnings.clamp(0.0, PENSION_EARNINGS_CAP) * age_band_rate(age)
}

#[derive(Debug, Clone, PartialEq)]
pub struct PensionRelief {
    pub age_rate: f64,
    pub capped_earnings: f64,
    pub limit: f64,
    pub contribution: f64,
    pub allowed: f64,
    pub excess: f64,
    pub marginal_rate: f64,
    pub relief: f64,
    /// Out-of-pocket cost of the allowed contribution after relief.
    pub net_cost: f64,
}

pub fn pension_relief(age: u32, earnings: f64, contribution: f64, marginal_rate: f64) -> Result<PensionRelief> {
    if !earnings.is_finite() || earnings < 0.0 {
        return Err(HearthError::Validation("Earnings cannot be negative".to_string()));
    }
    if !contribution.is_finite() || contribution < 0.0 {
        return Err(HearthError::Validation("Contribution cannot be negative".to_string()));
    }
    if !(0.0..=1.0).contains(&marginal_rate) {
        return Err(HearthError::Validation("Marginal rate must be between 0 and 1".to_string()));
    }
    let limit = pension_limit(age, earnings);
    let allowed = contribution.min(limit);
    let relief = allowed * marginal_rate;
    Ok(PensionRelief {
        age_rate: age_band_rate(age),
        capped_earnings: earnings.min(PENSION_EARNINGS_CAP),
        limit,
        contribution,
        allowed,
        excess: contribution - allowed,
        marginal_rate,
        relief,
        net_cost: allowed - relief,
    })
}
