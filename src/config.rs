//! Viewer configuration — constants and the overridable config surface.
//!
//! Every timing knob the interaction core consumes lives here so that
//! none of them is a magic number at the call site. All values can be
//! overridden per-instance (struct fields) or via `BRIEFLY_*` environment
//! variables without a code change.

/// Application-level constants
pub const APP_NAME: &str = "Briefly";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "briefly=debug,info";

/// Default briefing API base URL (local backend).
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// How long each simulated progress message stays on screen.
pub const DEFAULT_MESSAGE_INTERVAL_MS: u64 = 3_500;

/// Number of simulated progress phases (must match the message table).
pub const DEFAULT_PHASE_COUNT: usize = 11;

/// Delay before a hovered finding card expands.
pub const DEFAULT_HOVER_EXPAND_DELAY_MS: u64 = 300;

/// Client-side upper bound on a briefing-generation call.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;

/// Tracing filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Runtime configuration for the interaction core.
///
/// `Default` gives the reference values; `from_env` layers `BRIEFLY_*`
/// overrides on top. Unparseable override values are ignored (the
/// default wins) rather than failing startup.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Briefing API base URL, no trailing slash.
    pub base_url: String,
    /// Simulated progress: ms per status message.
    pub message_interval_ms: u64,
    /// Simulated progress: number of status messages.
    pub phase_count: usize,
    /// Disclosure: hover-to-expand delay in ms.
    pub hover_expand_delay_ms: u64,
    /// Client-side request deadline in ms.
    pub request_timeout_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            message_interval_ms: DEFAULT_MESSAGE_INTERVAL_MS,
            phase_count: DEFAULT_PHASE_COUNT,
            hover_expand_delay_ms: DEFAULT_HOVER_EXPAND_DELAY_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ViewerConfig {
    /// Defaults with `BRIEFLY_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("BRIEFLY_API_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = env_u64("BRIEFLY_MESSAGE_INTERVAL_MS") {
            config.message_interval_ms = ms;
        }
        if let Some(n) = env_u64("BRIEFLY_PHASE_COUNT") {
            config.phase_count = n as usize;
        }
        if let Some(ms) = env_u64("BRIEFLY_HOVER_EXPAND_DELAY_MS") {
            config.hover_expand_delay_ms = ms;
        }
        if let Some(ms) = env_u64("BRIEFLY_REQUEST_TIMEOUT_MS") {
            config.request_timeout_ms = ms;
        }
        config
    }
}

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok()?.parse().ok()
}
