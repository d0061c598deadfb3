use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HearthError, Result};
use crate::fx::{Currency, FxTable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Pounds per euro, used when totalling mixed-currency balances.
    #[serde(default = "default_gbp_per_eur")]
    pub gbp_per_eur: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_base_currency() -> String {
    "EUR".to_string()
}

fn default_history_limit() -> usize {
    8
}

fn default_gbp_per_eur() -> f64 {
    0.85
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_prefix: default_api_prefix(),
            base_currency: default_base_currency(),
            history_limit: default_history_limit(),
            gbp_per_eur: default_gbp_per_eur(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Settings {
    pub fn currency(&self) -> Currency {
        self.base_currency.parse().unwrap_or(Currency::Eur)
    }

    pub fn fx(&self) -> FxTable {
        FxTable::new(self.currency(), self.gbp_per_eur)
    }

    /// Update a single field from its string form, as given on the command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |what: &str| HearthError::Settings(format!("{key}: expected {what}, got '{value}'"));
        match key {
            "api_url" => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(invalid("an http(s) URL"));
                }
                self.api_url = value.trim_end_matches('/').to_string();
            }
            "api_prefix" => {
                let trimmed = value.trim_matches('/');
                self.api_prefix = if trimmed.is_empty() { String::new() } else { format!("/{trimmed}") };
            }
            "base_currency" => {
                let currency: Currency = value.parse().map_err(|_| invalid("EUR or GBP"))?;
                self.base_currency = currency.code().to_string();
            }
            "history_limit" => {
                self.history_limit = value
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| invalid("a positive integer"))?;
            }
            "gbp_per_eur" => {
                self.gbp_per_eur = value
                    .parse::<f64>()
                    .ok()
                    .filter(|r| r.is_finite() && *r > 0.0)
                    .ok_or_else(|| invalid("a positive number"))?;
            }
            "timeout_secs" => {
                self.timeout_secs = value
                    .parse::<u64>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| invalid("a positive integer"))?;
            }
            other => return Err(HearthError::Settings(format!("Unknown setting: {other}"))),
        }
        Ok(())
    }
}

/// Bearer token for the backend. Passed explicitly into the API client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
}

impl Session {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("HEARTH_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("hearth")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn session_path() -> PathBuf {
    config_dir().join("session.json")
}

pub fn load_settings() -> Settings {
    load_settings_from(&settings_path())
}

/// Missing or unreadable files fall back to the defaults.
pub fn load_settings_from(path: &Path) -> Settings {
    if path.exists() {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), "ignoring unreadable settings: {e}");
            Settings::default()
        })
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    save_settings_to(&settings_path(), settings)
}

pub fn save_settings_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| HearthError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn load_session() -> Session {
    std::fs::read_to_string(session_path())
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

pub fn save_session(session: &Session) -> Result<()> {
    std::fs::create_dir_all(config_dir())?;
    let json = serde_json::to_string_pretty(session)?;
    std::fs::write(session_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn clear_session() -> Result<bool> {
    let path = session_path();
    if path.exists() {
        std::fs::remove_file(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            api_url: "https://money.example.org".to_string(),
            history_limit: 20,
            ..Settings::default()
        };
        save_settings_to(&path, &settings).unwrap();
        assert_eq!(load_settings_from(&path), settings);
    }

    #[test]
    fn test_load_missing_or_corrupt_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(load_settings_from(&path), Settings::default());
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(load_settings_from(&path), Settings::default());
    }

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.api_prefix, "/api");
        assert_eq!(s.history_limit, 8);
        assert_eq!(s.gbp_per_eur, 0.85);
        assert_eq!(s.currency(), Currency::Eur);
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let json = r#"{"api_url": "http://nas.local:9000", "base_currency": "GBP"}"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.api_url, "http://nas.local:9000");
        assert_eq!(s.currency(), Currency::Gbp);
        assert_eq!(s.history_limit, 8);
        assert_eq!(s.timeout_secs, 30);
    }

    #[test]
    fn test_set_normalizes_values() {
        let mut s = Settings::default();
        s.set("api_url", "https://money.example.org/").unwrap();
        assert_eq!(s.api_url, "https://money.example.org");
        s.set("api_prefix", "v2/").unwrap();
        assert_eq!(s.api_prefix, "/v2");
        s.set("api_prefix", "/").unwrap();
        assert_eq!(s.api_prefix, "");
        s.set("base_currency", "gbp").unwrap();
        assert_eq!(s.base_currency, "GBP");
        s.set("gbp_per_eur", "0.86").unwrap();
        assert_eq!(s.gbp_per_eur, 0.86);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut s = Settings::default();
        assert!(s.set("api_url", "ftp://nope").is_err());
        assert!(s.set("history_limit", "0").is_err());
        assert!(s.set("gbp_per_eur", "-1").is_err());
        assert!(s.set("base_currency", "USD").is_err());
        assert!(s.set("colour", "blue").is_err());
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn test_session_logged_in() {
        assert!(!Session::default().is_logged_in());
        assert!(!Session::with_token("").is_logged_in());
        assert!(Session::with_token("abc").is_logged_in());
    }
}
