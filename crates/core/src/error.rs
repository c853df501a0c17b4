//! Error types for the mostrador domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all mostrador operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Gateway errors ---
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    // --- Session errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Calendar relay errors ---
    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Gateway not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Empty reply from model")]
    EmptyReply,
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// A send arrived while an exchange was in flight or a staggered chunk
    /// was still pending. The caller should disable input, not queue.
    #[error("An exchange is already in flight")]
    Busy,

    #[error("Session channel closed: {0}")]
    ChannelClosed(String),
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Upstream calendar request failed: {0}")]
    Upstream(String),

    #[error("Network error: {0}")]
    Network(String),
}
