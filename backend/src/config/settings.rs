//! Application settings loaded via OrthoConfig.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::email::DEFAULT_SENDGRID_ENDPOINT;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;
const DEFAULT_UPLOAD_ROOT: &str = "uploads";
const DEFAULT_UPLOAD_PUBLIC_URL: &str = "http://localhost:8000/uploads";
const DEFAULT_MAIL_FROM: &str = "no-reply@marketplace.local";

/// Non-secret runtime settings.
///
/// Every field is optional on the command line, in the environment
/// (`MARKETPLACE_*`) and in configuration files; accessors apply defaults.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "MARKETPLACE")]
pub struct AppSettings {
    /// Socket the HTTP server binds to.
    pub bind_address: Option<String>,
    /// PostgreSQL connection string. Absent means in-memory storage.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Storefront base used in marketplace links.
    pub frontend_url: Option<String>,
    /// Public API base used in confirmation links.
    pub public_base_url: Option<String>,
    /// Bearer token lifetime in seconds.
    pub token_ttl_secs: Option<u64>,
    /// Directory uploads are written beneath.
    pub upload_root: Option<PathBuf>,
    /// Public URL prefix under which `upload_root` is served.
    pub upload_public_url: Option<String>,
    /// Sender address for outgoing email.
    pub mail_from: Option<String>,
    /// SendGrid v3 send endpoint.
    pub sendgrid_endpoint: Option<String>,
}

/// Errors raised while interpreting loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address '{value}': {source}")]
    BindAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid URL for {name} '{value}': {source}")]
    Url {
        name: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },
}

impl AppSettings {
    /// Parsed bind address, falling back to `0.0.0.0:8000`.
    pub fn bind_address(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_address.as_deref().unwrap_or(DEFAULT_BIND_ADDRESS);
        value.parse().map_err(|source| SettingsError::BindAddress {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn frontend_url(&self) -> &str {
        trimmed_base(self.frontend_url.as_deref(), DEFAULT_FRONTEND_URL)
    }

    pub fn public_base_url(&self) -> &str {
        trimmed_base(self.public_base_url.as_deref(), DEFAULT_PUBLIC_BASE_URL)
    }

    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS))
    }

    pub fn upload_root(&self) -> PathBuf {
        self.upload_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_ROOT))
    }

    pub fn upload_public_url(&self) -> &str {
        trimmed_base(
            self.upload_public_url.as_deref(),
            DEFAULT_UPLOAD_PUBLIC_URL,
        )
    }

    pub fn mail_from(&self) -> &str {
        self.mail_from.as_deref().unwrap_or(DEFAULT_MAIL_FROM)
    }

    /// Parsed SendGrid endpoint.
    pub fn sendgrid_endpoint(&self) -> Result<url::Url, SettingsError> {
        let value = self
            .sendgrid_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_SENDGRID_ENDPOINT);
        url::Url::parse(value).map_err(|source| SettingsError::Url {
            name: "sendgrid_endpoint",
            value: value.to_owned(),
            source,
        })
    }
}

fn trimmed_base<'a>(value: Option<&'a str>, default: &'a str) -> &'a str {
    value.unwrap_or(default).trim_end_matches('/')
}
