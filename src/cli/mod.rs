pub mod balance;
pub mod config;
pub mod history;
pub mod items;
pub mod overview;
pub mod refinance;
pub mod session;
pub mod status;
pub mod tax;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::api::ApiClient;
use crate::calc::tax::Jurisdiction;
use crate::error::{HearthError, Result};
use crate::fx::Currency;
use crate::history::SortField;
use crate::models::ItemKind;
use crate::settings::{load_session, Settings};

pub(crate) fn client(settings: &Settings) -> Result<ApiClient> {
    Ok(ApiClient::new(settings, load_session())?)
}

/// Client for endpoints that change data; these always need a token.
pub(crate) fn authed_client(settings: &Settings) -> Result<ApiClient> {
    let session = load_session();
    if !session.is_logged_in() {
        return Err(HearthError::NotLoggedIn);
    }
    Ok(ApiClient::new(settings, session)?)
}

/// Currency to display an amount in: the first recognised code, else the base.
pub(crate) fn display_currency(codes: &[Option<&str>], base: Currency) -> Currency {
    codes
        .iter()
        .flatten()
        .find_map(|c| c.parse().ok())
        .unwrap_or(base)
}

pub(crate) fn parse_currency_opt(currency: Option<String>) -> Result<Option<String>> {
    currency
        .map(|c| c.parse::<Currency>().map(|c| c.code().to_string()))
        .transpose()
}

pub(crate) fn date_or_dash(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "—".to_string())
}

#[derive(Parser)]
#[command(name = "hearth", about = "Household finance dashboard: balances, loans, net position and tax calculators.")]
pub struct Cli {
    /// Enable debug logging (overridden by HEARTH_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store the bearer token used for API requests.
    Login {
        /// API token issued by the backend
        #[arg(long)]
        token: String,
    },
    /// Forget the stored token.
    Logout,
    /// Show configuration and login state.
    Status,
    /// View or change settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// List bank accounts with their current balances.
    Accounts,
    /// List loans with their current balances.
    Loans,
    /// Show the balance history of one account or loan.
    History {
        /// Item type
        kind: ItemKind,
        /// Account or loan ID
        id: i64,
        /// Sort column
        #[arg(long, value_enum, default_value = "date")]
        sort: SortField,
        /// Sort ascending instead of newest/largest first
        #[arg(long)]
        asc: bool,
        /// Show every entry instead of the most recent few
        #[arg(long)]
        all: bool,
    },
    /// Record, edit or delete balance snapshots.
    Balance {
        #[command(subcommand)]
        command: BalanceCommands,
    },
    /// Totals across accounts and loans, and the resulting net position.
    Overview,
    /// Compare a loan's repayments against a refinanced rate and term.
    Refinance {
        /// Take principal, rate and term from this loan (flags still override)
        #[arg(long)]
        loan: Option<i64>,
        /// Outstanding principal
        #[arg(long)]
        principal: Option<f64>,
        /// Current annual rate in percent
        #[arg(long)]
        rate: Option<f64>,
        /// Current remaining term in years
        #[arg(long)]
        years: Option<u32>,
        /// Proposed annual rate in percent
        #[arg(long = "new-rate")]
        new_rate: f64,
        /// Proposed term in years
        #[arg(long = "new-years")]
        new_years: u32,
        /// Print only the payment comparison, not the yearly projection
        #[arg(long)]
        summary: bool,
    },
    /// Company and pension tax calculators.
    Tax {
        #[command(subcommand)]
        command: TaxCommands,
    },
    /// Print a shell completion script.
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the current settings.
    Show,
    /// Change one setting, e.g. `hearth config set api_url https://money.example.org`.
    Set {
        /// api_url, api_prefix, base_currency, history_limit, gbp_per_eur, timeout_secs
        key: String,
        value: String,
    },
}

#[derive(Subcommand)]
pub enum BalanceCommands {
    /// Record a new balance snapshot.
    Add {
        kind: ItemKind,
        /// Account or loan ID
        id: i64,
        /// Balance amount
        #[arg(long, allow_hyphen_values = true)]
        amount: f64,
        /// Snapshot date: YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Currency code: EUR or GBP
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Change an existing snapshot.
    Edit {
        kind: ItemKind,
        /// Balance entry ID (shown in `hearth history`)
        entry: i64,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<f64>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        currency: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a snapshot.
    Delete {
        kind: ItemKind,
        /// Balance entry ID (shown in `hearth history`)
        entry: i64,
    },
}

#[derive(Subcommand)]
pub enum TaxCommands {
    /// VAT, expenses and corporation tax on company revenue.
    Company {
        /// Revenue excluding VAT
        #[arg(long)]
        revenue: f64,
        #[arg(long, value_enum, default_value = "ie")]
        jurisdiction: Jurisdiction,
        /// Share of revenue treated as expenses (0-1)
        #[arg(long = "expense-ratio", default_value_t = crate::calc::tax::DEFAULT_EXPENSE_RATIO)]
        expense_ratio: f64,
    },
    /// Age-related pension contribution limit and tax relief.
    Pension {
        #[arg(long)]
        age: u32,
        /// Annual earnings
        #[arg(long)]
        earnings: f64,
        /// Planned contribution (default: the full limit)
        #[arg(long)]
        contribution: Option<f64>,
        /// Marginal income tax rate in percent
        #[arg(long = "marginal-rate", default_value_t = 40)]
        marginal_rate: u32,
    },
}
