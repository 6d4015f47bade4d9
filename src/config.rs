// src/config.rs
// Environment-driven settings. `.env` files are loaded by the binary at
// startup via dotenvy; the library only reads the process environment.

use std::env;

pub const DEFAULT_ANALYZE_URL: &str = "http://localhost:8000/api/analyze";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Analysis service endpoint (`READALOUD_ANALYZE_URL`).
    pub analyze_url: String,
    /// Whole-request timeout for the analysis call
    /// (`READALOUD_HTTP_TIMEOUT_SECS`).
    pub http_timeout_secs: u64,
}

impl Settings {
    pub fn from_env() -> Self {
        let analyze_url = env::var("READALOUD_ANALYZE_URL")
            .unwrap_or_else(|_| DEFAULT_ANALYZE_URL.to_string());
        let http_timeout_secs = env::var("READALOUD_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

        Self {
            analyze_url,
            http_timeout_secs,
        }
    }
}
