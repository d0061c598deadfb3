use crate::fx::Currency;

pub const NOT_SET: &str = "Not set";
pub const NO_DELTA: &str = "—";

/// Format a float as a currency amount with thousands separators: €1,234.56
pub fn money(val: f64, currency: Currency) -> String {
    let (sign, grouped) = split_amount(val);
    format!("{sign}{}{grouped}", currency.symbol())
}

/// Balance cell: unset or non-finite values are "Not set", zero is a real amount.
pub fn balance(val: Option<f64>, currency: Currency) -> String {
    match val {
        Some(v) if v.is_finite() => money(v, currency),
        _ => NOT_SET.to_string(),
    }
}

/// Difference cell: always signed, zero included.
pub fn delta(val: Option<f64>, currency: Currency) -> String {
    match val {
        Some(v) if v.is_finite() => {
            let (sign, grouped) = split_amount(v);
            let sign = if sign.is_empty() { "+" } else { sign };
            format!("{sign}{}{grouped}", currency.symbol())
        }
        _ => NO_DELTA.to_string(),
    }
}

pub fn pct(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

fn split_amount(val: f64) -> (&'static str, String) {
    let cents = format!("{:.2}", val.abs());
    // -0.001 rounds to 0.00 and must not print as negative
    let negative = val < 0.0 && cents != "0.00";
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    (if negative { "-" } else { "" }, format!("{with_commas}.{dec_part}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56, Currency::Eur), "€1,234.56");
        assert_eq!(money(-500.00, Currency::Eur), "-€500.00");
        assert_eq!(money(0.0, Currency::Eur), "€0.00");
        assert_eq!(money(1000000.99, Currency::Gbp), "£1,000,000.99");
        assert_eq!(money(42.10, Currency::Eur), "€42.10");
    }

    #[test]
    fn test_balance_not_set() {
        assert_eq!(balance(None, Currency::Eur), "Not set");
        assert_eq!(balance(Some(f64::NAN), Currency::Eur), "Not set");
        assert_eq!(balance(Some(f64::INFINITY), Currency::Eur), "Not set");
    }

    #[test]
    fn test_balance_zero_is_not_unset() {
        assert_eq!(balance(Some(0.0), Currency::Eur), "€0.00");
    }

    #[test]
    fn test_delta_always_signed() {
        assert_eq!(delta(Some(12.0), Currency::Eur), "+€12.00");
        assert_eq!(delta(Some(-5.0), Currency::Eur), "-€5.00");
        assert_eq!(delta(Some(0.0), Currency::Eur), "+€0.00");
        assert_eq!(delta(Some(-0.001), Currency::Eur), "+€0.00");
        assert_eq!(delta(None, Currency::Eur), "—");
    }

    #[test]
    fn test_pct() {
        assert_eq!(pct(0.125), "12.5%");
        assert_eq!(pct(0.23), "23.0%");
    }
}
