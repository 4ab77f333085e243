use std::env;

use pushkind_common::models::config::CommonServerConfig;
use thiserror::Error;

/// Errors raised while reading the server configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("invalid value `{value}` for {name}")]
    Invalid { name: &'static str, value: String },
    #[error("SECRET_KEY must be at least {MIN_SECRET_LEN} bytes, got {0}")]
    ShortSecret(usize),
}

/// Smallest secret accepted by the session cookie signing key.
pub const MIN_SECRET_LEN: usize = 64;

/// Settings of the HTTP server read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_url: String,
    pub address: String,
    pub port: u16,
    /// Session signing secret. A random key is generated when unset.
    pub secret: Option<String>,
    pub auth_service_url: String,
    /// Cookie domain.
    pub domain: String,
    /// Reject membership filters from anonymous callers instead of ignoring them.
    pub strict_membership_filters: bool,
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| "app.db".to_string());
        let address = lookup("ADDRESS").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => 8080,
        };
        let secret = lookup("SECRET_KEY").filter(|secret| !secret.is_empty());
        if let Some(len) = secret
            .as_ref()
            .map(String::len)
            .filter(|len| *len < MIN_SECRET_LEN)
        {
            return Err(ConfigError::ShortSecret(len));
        }
        let auth_service_url =
            lookup("AUTH_SERVICE_URL").ok_or(ConfigError::Missing("AUTH_SERVICE_URL"))?;
        let domain = lookup("DOMAIN").unwrap_or_else(|| "localhost".to_string());
        let strict_membership_filters = match lookup("STRICT_MEMBERSHIP_FILTERS") {
            Some(value) => parse_flag(&value).ok_or(ConfigError::Invalid {
                name: "STRICT_MEMBERSHIP_FILTERS",
                value,
            })?,
            None => false,
        };

        Ok(Self {
            database_url,
            address,
            port,
            secret,
            auth_service_url,
            domain,
            strict_membership_filters,
        })
    }

    /// Settings shared with the pushkind_common extractors.
    pub fn common(&self) -> CommonServerConfig {
        CommonServerConfig {
            secret: self.secret.clone().unwrap_or_default(),
            auth_service_url: self.auth_service_url.clone(),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
