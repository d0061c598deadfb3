use crate::api::join_url;
use crate::error::Result;
use crate::settings::{load_session, load_settings, settings_path};

pub fn run() -> Result<()> {
    let settings = load_settings();
    let path = settings_path();

    println!(
        "Settings:   {}{}",
        path.display(),
        if path.exists() { "" } else { " (defaults)" }
    );
    println!("API:        {}", join_url(&settings.api_url, &settings.api_prefix, ""));
    println!("Currency:   {}", settings.currency());
    println!("GBP/EUR:    {}", settings.gbp_per_eur);
    println!("History:    {} entries", settings.history_limit);
    println!(
        "Session:    {}",
        if load_session().is_logged_in() { "logged in" } else { "not logged in" }
    );
    Ok(())
}
