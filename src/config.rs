use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Server configuration from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub database_url: String,
    /// Organization whose calendar this server shows.
    pub org_id: String,
    /// E-mail addresses allowed to add and delete events.
    pub admin_emails: Vec<String>,
    /// Header the upstream authenticator puts the signed-in e-mail in.
    pub identity_header: String,
    pub watch_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    /// DATABASE_URL defaults to "sqlite://dalryeok.db"
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| "sqlite://dalryeok.db".to_string());

        let listen_addr = lookup("LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:3000".to_string())
            .parse()
            .map_err(|_| ConfigError::Invalid("LISTEN_ADDR", "must be a valid socket address"))?;

        let org_id = lookup("DALRYEOK_ORG_ID")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "gw-rehab-center".to_string());
        if org_id.is_empty() {
            return Err(ConfigError::Invalid("DALRYEOK_ORG_ID", "must not be empty"));
        }

        let admin_emails = lookup("DALRYEOK_ADMIN_EMAILS")
            .map(|s| parse_list(&s))
            .unwrap_or_default();

        let identity_header = lookup("DALRYEOK_IDENTITY_HEADER")
            .unwrap_or_else(|| "x-forwarded-email".to_string())
            .trim()
            .to_ascii_lowercase();
        if axum::http::HeaderName::from_bytes(identity_header.as_bytes()).is_err() {
            return Err(ConfigError::Invalid(
                "DALRYEOK_IDENTITY_HEADER",
                "must be a valid header name",
            ));
        }

        let watch_timeout_secs = match lookup("DALRYEOK_WATCH_TIMEOUT_SECS") {
            Some(s) => s.trim().parse::<u64>().map_err(|_| {
                ConfigError::Invalid("DALRYEOK_WATCH_TIMEOUT_SECS", "must be a whole number")
            })?,
            None => 25,
        };

        Ok(Config {
            listen_addr,
            database_url,
            org_id,
            admin_emails,
            identity_header,
            watch_timeout: Duration::from_secs(watch_timeout_secs),
        })
    }
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
