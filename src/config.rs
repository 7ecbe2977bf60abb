use std::env;

/// Application-level constants
pub const APP_NAME: &str = "Veridoc";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the backend base URL.
pub const API_URL_ENV: &str = "VERIDOC_API_URL";

/// Development backend default.
pub const DEFAULT_API_URL: &str = "http://localhost:5001/api";

/// Resolve the backend base URL: `VERIDOC_API_URL` when set and non-empty,
/// the development default otherwise.
pub fn api_base_url() -> String {
    env::var(API_URL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Default tracing filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}
