//! Client configuration passed into the session at construction.
//!
//! All settings have sensible defaults so the client can run against a local
//! backend with zero configuration. Nothing here is ambient global state.

use parley_shared::constants::{CHAT_NAMESPACE, DEFAULT_API_URL, DEFAULT_SOCKET_URL};

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the REST API (`GET /user`, `GET /chat/rooms`).
    /// Env: `PARLEY_API_URL`
    /// Default: `http://127.0.0.1:3000`
    pub api_base_url: String,

    /// Base URL of the realtime websocket endpoint.
    /// Env: `PARLEY_SOCKET_URL`
    /// Default: `ws://127.0.0.1:3000`
    pub socket_url: String,

    /// Namespace path the chat connection is scoped to.
    /// Env: `PARLEY_CHAT_NAMESPACE`
    /// Default: `/chat`
    pub namespace: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            socket_url: DEFAULT_SOCKET_URL.to_string(),
            namespace: CHAT_NAMESPACE.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: std::env::var("PARLEY_API_URL").unwrap_or(defaults.api_base_url),
            socket_url: std::env::var("PARLEY_SOCKET_URL").unwrap_or(defaults.socket_url),
            namespace: std::env::var("PARLEY_CHAT_NAMESPACE").unwrap_or(defaults.namespace),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.namespace, "/chat");
        assert!(config.api_base_url.starts_with("http://"));
        assert!(config.socket_url.starts_with("ws://"));
    }
}
