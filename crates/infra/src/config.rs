//! Runtime configuration loaded from `INVTRACK_*` environment variables.

use thiserror::Error;

use invtrack_core::OrderId;
use invtrack_observability::LogFormat;

use crate::store::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

pub const ENV_DATABASE_URL: &str = "INVTRACK_DATABASE_URL";
pub const ENV_PAGE_SIZE: &str = "INVTRACK_PAGE_SIZE";
pub const ENV_MAX_CONNECTIONS: &str = "INVTRACK_DB_MAX_CONNECTIONS";
pub const ENV_LOG: &str = "INVTRACK_LOG";
pub const ENV_LOG_FORMAT: &str = "INVTRACK_LOG_FORMAT";
pub const ENV_ADMIN_URL: &str = "INVTRACK_ADMIN_URL";
pub const ENV_PURCHASE_ORDER_IDS: &str = "INVTRACK_PURCHASE_ORDER_IDS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Postgres connection string; `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub page_size: u32,
    pub max_connections: u32,
    pub log_filter: String,
    pub log_format: LogFormat,
    /// Base URL of the shop admin, used for order links.
    pub admin_url: String,
    /// Order ids that are external purchase orders (comma separated in the env).
    pub purchase_order_ids: Vec<OrderId>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            max_connections: 5,
            log_filter: "info".to_string(),
            log_format: LogFormat::Json,
            admin_url: "/wp-admin/".to_string(),
            purchase_order_ids: Vec::new(),
        }
    }
}

impl TrackerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let page_size = match get(ENV_PAGE_SIZE) {
            Some(raw) => parse_positive(ENV_PAGE_SIZE, &raw)?.min(MAX_PAGE_SIZE),
            None => defaults.page_size,
        };
        let max_connections = match get(ENV_MAX_CONNECTIONS) {
            Some(raw) => parse_positive(ENV_MAX_CONNECTIONS, &raw)?,
            None => defaults.max_connections,
        };
        let log_format = match get(ENV_LOG_FORMAT) {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| ConfigError::Invalid {
                key: ENV_LOG_FORMAT,
                message: e.to_string(),
            })?,
            None => defaults.log_format,
        };
        let admin_url = match get(ENV_ADMIN_URL) {
            Some(mut url) => {
                if !url.ends_with('/') {
                    url.push('/');
                }
                url
            }
            None => defaults.admin_url,
        };
        let purchase_order_ids = match get(ENV_PURCHASE_ORDER_IDS) {
            Some(raw) => parse_order_ids(ENV_PURCHASE_ORDER_IDS, &raw)?,
            None => defaults.purchase_order_ids,
        };

        Ok(Self {
            database_url: get(ENV_DATABASE_URL),
            page_size,
            max_connections,
            log_filter: get(ENV_LOG).unwrap_or(defaults.log_filter),
            log_format,
            admin_url,
            purchase_order_ids,
        })
    }
}

fn parse_positive(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: raw.to_string(),
        }),
    }
}

fn parse_order_ids(key: &'static str, raw: &str) -> Result<Vec<OrderId>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<OrderId>().map_err(|e| ConfigError::Invalid {
                key,
                message: e.to_string(),
            })
        })
        .collect()
}
