//! Veridoc client core — typed access to the Veridoc health-document backend.
//!
//! Everything a patient-facing shell needs to talk to the backend: data
//! models, an authenticated REST transport ([`client`]), user and record
//! services, and the call-verification status poller ([`poller`]). Document
//! OCR, AI structuring, and telephony live behind the backend — this crate
//! only initiates and observes them.

pub mod call_verification;
pub mod client;
pub mod config;
pub mod models;
pub mod poller;
pub mod records;
pub mod users;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the host application. Call once at startup.
///
/// Respects `RUST_LOG` when set, otherwise falls back to
/// [`config::default_log_filter`].
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} client core v{}", config::APP_NAME, config::APP_VERSION);
}
