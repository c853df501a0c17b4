//! The in-process token store.
//!
//! Holds the OAuth tokens acquired through the callback endpoint. The store
//! is created at process start and handed to the router as shared state;
//! nothing else in the process can reach the tokens. One set of tokens at a
//! time, matching the single-operator demo deployment.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// Tokens returned by the OAuth code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Thread-safe holder for the current tokens.
#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: RwLock<Option<OAuthTokens>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored tokens with a freshly exchanged set.
    pub fn set(&self, tokens: OAuthTokens) {
        *self.tokens.write().unwrap_or_else(|e| e.into_inner()) = Some(tokens);
    }

    /// The current tokens, if the callback has run.
    pub fn get(&self) -> Option<OAuthTokens> {
        self.tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Drop the stored tokens.
    pub fn clear(&self) {
        *self.tokens.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OAuthTokens {
        OAuthTokens {
            access_token: "ya29.token".into(),
            refresh_token: Some("1//refresh".into()),
        }
    }

    #[test]
    fn starts_unauthenticated() {
        let store = TokenStore::new();
        assert!(!store.is_authenticated());
        assert!(store.get().is_none());
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = TokenStore::new();
        store.set(sample());
        assert!(store.is_authenticated());
        assert_eq!(store.get(), Some(sample()));
    }

    #[test]
    fn clear_removes_tokens() {
        let store = TokenStore::new();
        store.set(sample());
        store.clear();
        assert!(!store.is_authenticated());
    }
}
