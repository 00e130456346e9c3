//! Configuration loading from environment variables.
//!
//! Uses the following environment variables:
//! - `CAIRN_ADDR`: HTTP bind address (default: 0.0.0.0:24130)
//! - `CAIRN_ALLOWED_ORIGINS`: comma-separated CORS origin allow-list
//!   (default: http://localhost:3000)
//! - `CAIRN_ALLOWED_METHODS`: comma-separated method allow-list, `*`
//!   mirrors the request (default: *)
//! - `CAIRN_ALLOWED_HEADERS`: comma-separated header allow-list, `*`
//!   mirrors the request (default: *)

use std::{env, net::SocketAddr};

use anyhow::{Context, Result};

/// Default bind address for the parse server
pub const DEFAULT_ADDR: &str = "0.0.0.0:24130";

/// Origin the reference frontend is served from
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind address
    pub addr: SocketAddr,

    /// Cross-origin policy applied to every route
    pub cors: CorsConfig,
}

/// Cross-origin allow-lists, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    /// Origins allowed to make cross-origin requests
    pub allowed_origins: Vec<String>,
    /// Methods allowed cross-origin; `*` mirrors the request
    pub allowed_methods: Vec<String>,
    /// Headers allowed cross-origin; `*` mirrors the request
    pub allowed_headers: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
            allowed_methods: vec!["*".to_string()],
            allowed_headers: vec!["*".to_string()],
        }
    }
}

impl CorsConfig {
    /// Load the CORS allow-lists from environment variables
    fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            allowed_origins: env_list("CAIRN_ALLOWED_ORIGINS")
                .unwrap_or(defaults.allowed_origins),
            allowed_methods: env_list("CAIRN_ALLOWED_METHODS")
                .unwrap_or(defaults.allowed_methods),
            allowed_headers: env_list("CAIRN_ALLOWED_HEADERS")
                .unwrap_or(defaults.allowed_headers),
        }
    }

    /// Whether an allow-list is the single `*` wildcard entry.
    pub fn mirrors_any(list: &[String]) -> bool {
        list.len() == 1 && list[0] == "*"
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` file if present, then reads from environment.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let addr = env::var("CAIRN_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
        let addr: SocketAddr = addr.parse().context("invalid CAIRN_ADDR format")?;

        Ok(Self {
            addr,
            cors: CorsConfig::from_env(),
        })
    }
}

/// Parse a comma-separated environment variable into a trimmed list.
///
/// Returns None when the variable is unset or contains no entries so
/// the caller can fall back to its default.
fn env_list(name: &str) -> Option<Vec<String>> {
    let raw = env::var(name).ok()?;
    let values: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();
    if values.is_empty() { None } else { Some(values) }
}
