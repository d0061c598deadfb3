use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifies the account or loan a balance snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRef {
    Account(i64),
    Loan(i64),
}

impl ItemRef {
    pub fn id(self) -> i64 {
        match self {
            Self::Account(id) | Self::Loan(id) => id,
        }
    }

    pub fn kind(self) -> ItemKind {
        match self {
            Self::Account(_) => ItemKind::Account,
            Self::Loan(_) => ItemKind::Loan,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ItemKind {
    Account,
    Loan,
}

impl ItemKind {
    pub fn item(self, id: i64) -> ItemRef {
        match self {
            Self::Account => ItemRef::Account(id),
            Self::Loan => ItemRef::Loan(id),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Loan => "loan",
        }
    }

    /// Path segment under the API prefix, e.g. `/accounts`.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Account => "accounts",
            Self::Loan => "loans",
        }
    }
}

/// Anything that owns a balance history and can be totalled.
pub trait Item {
    fn item_ref(&self) -> ItemRef;
    fn name(&self) -> &str;
    fn currency(&self) -> Option<&str>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    #[serde(alias = "account_name")]
    pub name: String,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl Item for Account {
    fn item_ref(&self) -> ItemRef {
        ItemRef::Account(self.id)
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: i64,
    #[serde(alias = "loan_name")]
    pub name: String,
    #[serde(default, alias = "lender")]
    pub institution: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub principal: Option<f64>,
    /// Annual interest rate in percent.
    #[serde(default, alias = "interest_rate", deserialize_with = "lenient_amount")]
    pub rate: Option<f64>,
    #[serde(default)]
    pub term_years: Option<u32>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl Item for Loan {
    fn item_ref(&self) -> ItemRef {
        ItemRef::Loan(self.id)
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }
}

/// One dated snapshot of an account's or a loan's balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub id: i64,
    #[serde(default)]
    pub account_id: Option<i64>,
    #[serde(default)]
    pub loan_id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub balance: Option<f64>,
    #[serde(deserialize_with = "lenient_date")]
    pub date_entered: NaiveDate,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BalanceEntry {
    /// The owning item. Loan ids win when a payload carries both keys.
    pub fn item(&self) -> Option<ItemRef> {
        match (self.account_id, self.loan_id) {
            (_, Some(id)) => Some(ItemRef::Loan(id)),
            (Some(id), None) => Some(ItemRef::Account(id)),
            (None, None) => None,
        }
    }

    pub fn belongs_to(&self, item: ItemRef) -> bool {
        self.item() == Some(item)
    }
}

/// Request body for creating or editing a balance snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct NewBalanceEntry {
    pub balance: f64,
    pub date_entered: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Accepts numbers and numeric strings; anything else decodes as unset.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(parse_amount(&value))
}

pub(crate) fn parse_amount(value: &serde_json::Value) -> Option<f64> {
    let n = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|dt| dt.date())
}
