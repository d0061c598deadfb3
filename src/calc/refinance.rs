use crate::error::{HearthError, Result};

/// Longest term either scenario may run for.
pub const MAX_TERM_YEARS: u32 = 50;

/// Rate and term for one repayment scenario.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Terms {
    /// Annual interest rate in percent, e.g. `4.5`.
    pub annual_rate_pct: f64,
    pub years: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub terms: Terms,
    pub monthly_payment: f64,
    pub total_paid: f64,
    pub total_interest: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionYear {
    pub year: u32,
    pub current_balance: f64,
    pub proposed_balance: f64,
    pub current_interest: f64,
    pub proposed_interest: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefinanceComparison {
    pub principal: f64,
    pub current: Scenario,
    pub proposed: Scenario,
    /// Positive when the proposed loan has the lower monthly payment.
    pub monthly_saving: f64,
    /// Positive when the proposed loan costs less over its lifetime.
    pub lifetime_saving: f64,
    pub projection: Vec<ProjectionYear>,
}

/// Standard amortised payment: `P * r(1+r)^n / ((1+r)^n - 1)`.
pub fn monthly_payment(principal: f64, annual_rate_pct: f64, years: u32) -> Result<f64> {
    validate(principal, Terms { annual_rate_pct, years })?;
    let n = f64::from(years) * 12.0;
    let r = annual_rate_pct / 100.0 / 12.0;
    if r == 0.0 {
        return Ok(principal / n);
    }
    let growth = (1.0 + r).powf(n);
    Ok(principal * r * growth / (growth - 1.0))
}

fn validate(principal: f64, terms: Terms) -> Result<()> {
    if !principal.is_finite() || principal <= 0.0 {
        return Err(HearthError::Validation("Principal must be greater than zero".to_string()));
    }
    if terms.years == 0 {
        return Err(HearthError::Validation("Term must be at least one year".to_string()));
    }
    if terms.years > MAX_TERM_YEARS {
        return Err(HearthError::Validation(format!(
            "Term cannot be longer than {MAX_TERM_YEARS} years"
        )));
    }
    if !terms.annual_rate_pct.is_finite() || terms.annual_rate_pct < 0.0 {
        return Err(HearthError::Validation("Interest rate cannot be negative".to_string()));
    }
    Ok(())
}

fn scenario(principal: f64, terms: Terms) -> Result<Scenario> {
    let monthly = monthly_payment(principal, terms.annual_rate_pct, terms.years)?;
    let total_paid = monthly * f64::from(terms.years) * 12.0;
    Ok(Scenario {
        terms,
        monthly_payment: monthly,
        total_paid,
        total_interest: total_paid - principal,
    })
}

/// One projection year: returns the year-end balance and the interest
/// accrued over the year. Interest accrues monthly on the running balance;
/// the balance then drops by (annual payment - annual interest), floored at
/// zero.
fn year_step(balance: f64, monthly_payment: f64, annual_rate_pct: f64, active: bool) -> (f64, f64) {
    if !active || balance <= 0.0 {
        return (balance.max(0.0), 0.0);
    }
    let r = annual_rate_pct / 100.0 / 12.0;
    let mut running = balance;
    let mut interest = 0.0;
    for _ in 0..12 {
        let month_interest = running * r;
        interest += month_interest;
        running = running + month_interest - monthly_payment;
    }
    let end = balance - (monthly_payment * 12.0 - interest);
    // float residue at the end of the term
    let end = if end < 0.005 { 0.0 } else { end };
    (end, interest)
}

pub fn compare(principal: f64, current: Terms, proposed: Terms) -> Result<RefinanceComparison> {
    let current = scenario(principal, current)?;
    let proposed = scenario(principal, proposed)?;

    let horizon = current.terms.years.max(proposed.terms.years);
    let mut projection = Vec::with_capacity(horizon as usize);
    let (mut cur_bal, mut new_bal) = (principal, principal);

    for year in 1..=horizon {
        let cur_active = year <= current.terms.years;
        let new_active = year <= proposed.terms.years;
        let (cur_end, cur_interest) =
            year_step(cur_bal, current.monthly_payment, current.terms.annual_rate_pct, cur_active);
        let (new_end, new_interest) =
            year_step(new_bal, proposed.monthly_payment, proposed.terms.annual_rate_pct, new_active);
        cur_bal = cur_end;
        new_bal = new_end;
        projection.push(ProjectionYear {
            year,
            current_balance: cur_bal,
            proposed_balance: new_bal,
            current_interest: cur_interest,
            proposed_interest: new_interest,
        });
    }

    Ok(RefinanceComparison {
        principal,
        monthly_saving: current.monthly_payment - proposed.monthly_payment,
        lifetime_saving: current.total_paid - proposed.total_paid,
        current,
        proposed,
        projection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT: Terms = Terms { annual_rate_pct: 4.5, years: 25 };
    const PROPOSED: Terms = Terms { annual_rate_pct: 3.5, years: 30 };

    #[test]
    fn test_monthly_payment_matches_amortization_tables() {
        let current = monthly_payment(200_000.0, 4.5, 25).unwrap();
        let proposed = monthly_payment(200_000.0, 3.5, 30).unwrap();
        assert!((current - 1111.66).abs() < 0.01, "got {current}");
        assert!((proposed - 898.09).abs() < 0.01, "got {proposed}");
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let m = monthly_payment(12_000.0, 0.0, 1).unwrap();
        assert!((m - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        assert!(monthly_payment(0.0, 4.0, 25).is_err());
        assert!(monthly_payment(-1.0, 4.0, 25).is_err());
        assert!(monthly_payment(1000.0, 4.0, 0).is_err());
        assert!(monthly_payment(1000.0, -1.0, 10).is_err());
    }

    #[test]
    fn test_rejects_terms_beyond_cap() {
        assert!(monthly_payment(1000.0, 4.0, MAX_TERM_YEARS).is_ok());
        let err = monthly_payment(1000.0, 4.0, MAX_TERM_YEARS + 1).unwrap_err();
        assert!(err.to_string().contains("longer than 50 years"));
        assert!(monthly_payment(1000.0, 4.0, u32::MAX).is_err());

        let absurd = Terms { annual_rate_pct: 3.0, years: 400_000_000 };
        assert!(compare(1000.0, CURRENT, absurd).is_err());
        assert!(compare(1000.0, absurd, PROPOSED).is_err());
    }

    #[test]
    fn test_compare_savings() {
        let c = compare(200_000.0, CURRENT, PROPOSED).unwrap();
        assert!((c.monthly_saving - 213.58).abs() < 0.01);
        assert!((c.current.total_interest - 133_499.49).abs() < 0.5);
        assert!((c.proposed.total_interest - 123_312.18).abs() < 0.5);
        assert!(c.lifetime_saving > 0.0);
    }

    #[test]
    fn test_projection_spans_longest_term() {
        let c = compare(200_000.0, CURRENT, PROPOSED).unwrap();
        assert_eq!(c.projection.len(), 30);
        assert_eq!(c.projection.first().unwrap().year, 1);
        let first = &c.projection[0];
        assert!((first.current_balance - 195_569.38).abs() < 0.01);
        assert!((first.current_interest - 8_909.36).abs() < 0.01);
    }

    #[test]
    fn test_projection_balances_floor_at_zero() {
        let c = compare(200_000.0, CURRENT, PROPOSED).unwrap();
        for row in &c.projection {
            assert!(row.current_balance >= 0.0);
            assert!(row.proposed_balance >= 0.0);
        }
        assert_eq!(c.projection[24].current_balance, 0.0);
        assert_eq!(c.projection[29].proposed_balance, 0.0);
        // nothing accrues once the current loan's term has ended
        assert_eq!(c.projection[27].current_interest, 0.0);
        assert!(c.projection[27].proposed_interest > 0.0);
    }
}
