use std::fmt;
use std::str::FromStr;

use crate::error::HearthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Eur,
    Gbp,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eur => "€",
            Self::Gbp => "£",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = HearthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EUR" | "€" => Ok(Self::Eur),
            "GBP" | "£" => Ok(Self::Gbp),
            other => Err(HearthError::Validation(format!("Unsupported currency: {other}"))),
        }
    }
}

/// Converts amounts into a single base currency.
#[derive(Debug, Clone, Copy)]
pub struct FxTable {
    pub base: Currency,
    /// Pounds per euro.
    pub gbp_per_eur: f64,
}

impl FxTable {
    pub fn new(base: Currency, gbp_per_eur: f64) -> Self {
        Self { base, gbp_per_eur }
    }

    pub fn convert(&self, amount: f64, from: Currency) -> f64 {
        match (from, self.base) {
            (Currency::Eur, Currency::Gbp) => amount * self.gbp_per_eur,
            (Currency::Gbp, Currency::Eur) => amount / self.gbp_per_eur,
            _ => amount,
        }
    }

    /// Converts from a currency code as the backend reports it. Missing or
    /// unrecognised codes are taken to already be in the base currency.
    pub fn convert_code(&self, amount: f64, code: Option<&str>) -> f64 {
        let Some(code) = code.filter(|c| !c.trim().is_empty()) else {
            return amount;
        };
        match code.parse::<Currency>() {
            Ok(from) => self.convert(amount, from),
            Err(_) => {
                tracing::warn!(code, "unknown currency code, treating as {}", self.base);
                amount
            }
        }
    }
}
