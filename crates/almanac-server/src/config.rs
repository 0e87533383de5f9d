use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me", "dev-secret-change-me", "secret"];

/// Session lifetimes outside this range are refused at startup.
const SESSION_DAYS: std::ops::RangeInclusive<i64> = 1..=3650;

#[derive(Clone)]
pub struct Config {
    pub session_secret: String,
    pub session_days: i64,
    pub secure_cookies: bool,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub downloads_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let session_secret = var("ALMANAC_SESSION_SECRET").unwrap_or_default();
        if session_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&session_secret.as_str()) {
            bail!("ALMANAC_SESSION_SECRET is unset or still a placeholder");
        }

        let session_days = match var("ALMANAC_SESSION_DAYS") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("ALMANAC_SESSION_DAYS is not a number: {raw}"))?,
            None => 7,
        };
        if !SESSION_DAYS.contains(&session_days) {
            bail!(
                "ALMANAC_SESSION_DAYS must be between {} and {}, got {}",
                SESSION_DAYS.start(),
                SESSION_DAYS.end(),
                session_days
            );
        }

        let port = match var("ALMANAC_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("ALMANAC_PORT is not a port: {raw}"))?,
            None => 5000,
        };

        Ok(Self {
            session_secret,
            session_days,
            secure_cookies: var("ALMANAC_SECURE_COOKIES").is_some_and(|v| v == "1" || v == "true"),
            db_path: var("ALMANAC_DB_PATH").unwrap_or_else(|| "almanac.db".into()).into(),
            host: var("ALMANAC_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port,
            downloads_dir: var("ALMANAC_DOWNLOADS_DIR")
                .unwrap_or_else(|| "./downloads".into())
                .into(),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("session_secret", &"<redacted>")
            .field("session_days", &self.session_days)
            .field("secure_cookies", &self.secure_cookies)
            .field("db_path", &self.db_path)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("downloads_dir", &self.downloads_dir)
            .finish()
    }
}
