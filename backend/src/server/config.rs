//! Server configuration loaded from the environment.

use std::net::SocketAddr;

use crate::outbound::email::SmtpConfig;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent.
    #[error("missing required environment variable {name}")]
    Missing { name: &'static str },
    /// An environment variable is present but unparseable.
    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::Missing { name })
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Runtime configuration for the voting service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// SMTP relay settings; absent when email delivery is not configured,
    /// in which case every passcode falls back to on-screen display.
    pub smtp: Option<SmtpConfig>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// `DATABASE_URL` is required. `BIND_ADDR` defaults to `0.0.0.0:8080`.
    /// The SMTP block is read only when `SMTP_HOST` is set; then
    /// `SMTP_USERNAME`, `SMTP_PASSWORD`, and `SMTP_FROM` are required too.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?;

        let bind_addr = optional("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_owned())
            .parse()
            .map_err(|err: std::net::AddrParseError| ConfigError::Invalid {
                name: "BIND_ADDR",
                message: err.to_string(),
            })?;

        let smtp = match optional("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                username: required("SMTP_USERNAME")?,
                password: required("SMTP_PASSWORD")?,
                from_address: required("SMTP_FROM")?,
            }),
            None => None,
        };

        Ok(Self {
            bind_addr,
            database_url,
            smtp,
        })
    }
}
