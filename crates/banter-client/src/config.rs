//! Client configuration.

use banter_core::DebounceConfig;

/// Endpoint used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:3000";

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server the channel connects to.
    pub endpoint: String,
    /// Typing debounce settings.
    pub debounce: DebounceConfig,
}

impl ClientConfig {
    /// Configuration for an endpoint with default debounce settings.
    ///
    /// A blank endpoint falls back to [`DEFAULT_ENDPOINT`].
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let endpoint =
            if endpoint.trim().is_empty() { DEFAULT_ENDPOINT.to_string() } else { endpoint };
        Self { endpoint, debounce: DebounceConfig::default() }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }
}
