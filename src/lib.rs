//! Briefly — interaction core of a clinical-briefing viewer.
//!
//! A user browses patients, requests an AI-generated briefing for the
//! selected patient, and inspects flagged findings. This crate owns the
//! parts with non-trivial state and timing behavior:
//!
//! - [`briefing::lifecycle`] — the asynchronous generation lifecycle
//!   (start, cancel, timeout, retry, regenerate, reset-on-navigation)
//! - [`briefing::progress`] — the simulated multi-step progress display
//! - [`briefing::disclosure`] — per-finding expand/collapse resolution
//! - [`client`] — the HTTP boundary with classified errors
//!
//! Rendering, routing, styling, and the backend generation service are
//! external collaborators.

pub mod briefing;
pub mod client;
pub mod config;
pub mod models;

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the hosting application.
///
/// Honors `RUST_LOG` when set, otherwise falls back to the crate
/// default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
}
