//! Error types.
//!
//! Fetch failures are per-provider and never fatal: the aggregator records
//! them for the error banner and keeps whatever the other providers returned.

use thiserror::Error;

use crate::source::Variant;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
    /// The provider could not be reached (DNS, connect, timeout, body read).
    #[error("{provider}: network error: {message}")]
    Transport { provider: Variant, message: String },

    /// The provider answered with a non-success status or an error payload.
    #[error("{provider}: provider error{}: {message}", status.map(|s| format!(" ({s})")).unwrap_or_default())]
    Provider {
        provider: Variant,
        status: Option<u16>,
        message: String,
    },

    /// The request parameters were rejected before reaching the network.
    #[error("{provider}: invalid request: {message}")]
    Validation { provider: Variant, message: String },
}

impl FetchError {
    pub fn provider(&self) -> Variant {
        match self {
            FetchError::Transport { provider, .. }
            | FetchError::Provider { provider, .. }
            | FetchError::Validation { provider, .. } => *provider,
        }
    }

    pub fn transport(provider: Variant, err: impl std::fmt::Display) -> Self {
        FetchError::Transport {
            provider,
            message: err.to_string(),
        }
    }

    pub fn validation(provider: Variant, message: impl Into<String>) -> Self {
        FetchError::Validation {
            provider,
            message: message.into(),
        }
    }
}

/// Failures of the key-value persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefsError {
    #[error("at least one category must be selected")]
    EmptyCategories,

    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_message_includes_status() {
        let err = FetchError::Provider {
            provider: Variant::Movie,
            status: Some(401),
            message: "Invalid API key".into(),
        };
        assert_eq!(err.to_string(), "Movies: provider error (401): Invalid API key");
    }

    #[test]
    fn provider_error_without_status() {
        let err = FetchError::Provider {
            provider: Variant::News,
            status: None,
            message: "bad payload".into(),
        };
        assert_eq!(err.to_string(), "News: provider error: bad payload");
        assert_eq!(err.provider(), Variant::News);
    }
}
