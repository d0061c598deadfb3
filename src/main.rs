mod api;
mod calc;
mod cli;
mod error;
mod fmt;
mod fx;
mod history;
mod models;
mod settings;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use calc::refinance::Terms;
use cli::{BalanceCommands, Cli, Commands, ConfigCommands, TaxCommands};

/// Logs go to stderr so tables on stdout stay pipeable.
fn init_tracing(verbose: bool) {
    let default = if verbose { "hearth=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("HEARTH_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Login { token } => cli::session::login(&token),
        Commands::Logout => cli::session::logout(),
        Commands::Status => cli::status::run(),
        Commands::Config { command } => match command {
            ConfigCommands::Show => cli::config::show(),
            ConfigCommands::Set { key, value } => cli::config::set(&key, &value),
        },
        Commands::Accounts => cli::items::accounts(),
        Commands::Loans => cli::items::loans(),
        Commands::History {
            kind,
            id,
            sort,
            asc,
            all,
        } => cli::history::run(kind, id, sort, asc, all),
        Commands::Balance { command } => match command {
            BalanceCommands::Add {
                kind,
                id,
                amount,
                date,
                currency,
                notes,
            } => cli::balance::add(kind, id, amount, date, currency, notes),
            BalanceCommands::Edit {
                kind,
                entry,
                amount,
                date,
                currency,
                notes,
            } => cli::balance::edit(kind, entry, amount, date, currency, notes),
            BalanceCommands::Delete { kind, entry } => cli::balance::delete(kind, entry),
        },
        Commands::Overview => cli::overview::run(),
        Commands::Refinance {
            loan,
            principal,
            rate,
            years,
            new_rate,
            new_years,
            summary,
        } => cli::refinance::run(
            loan,
            cli::refinance::CurrentLoan { principal, rate, years },
            Terms {
                annual_rate_pct: new_rate,
                years: new_years,
            },
            summary,
        ),
        Commands::Tax { command } => match command {
            TaxCommands::Company {
                revenue,
                jurisdiction,
                expense_ratio,
            } => cli::tax::company(revenue, jurisdiction, expense_ratio),
            TaxCommands::Pension {
                age,
                earnings,
                contribution,
                marginal_rate,
            } => cli::tax::pension(age, earnings, contribution, marginal_rate),
        },
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "hearth", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
