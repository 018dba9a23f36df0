//! Environment-driven configuration. `dotenv` is loaded at the binary edge,
//! so plain `std::env` lookups are enough here.

use std::env;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000/api";
/// Generous default because the hosted backend cold-starts on free tiers.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_DATA_DIR: &str = ".";

#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub timeout_secs: u64,
    pub data_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        let backend_url = env::var("INSIGHTHUB_BACKEND_URL")
            .unwrap_or_else(|_| DEFAULT_BACKEND_URL.to_string());
        let timeout_secs = env::var("INSIGHTHUB_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let data_dir =
            env::var("INSIGHTHUB_DATA_DIR").unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());

        Self {
            backend_url,
            timeout_secs,
            data_dir,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            data_dir: DEFAULT_DATA_DIR.to_string(),
        }
    }
}
