//! Error types for page fetching and configuration

use thiserror::Error;

/// Why a page fetch did not produce a page.
///
/// Carried inside [`crate::FeedEvent::FetchFailed`], so it must stay `Clone`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("fetch failed: {reason}")]
    Failed { reason: String },

    #[error("no async runtime available to dispatch the fetch")]
    NoRuntime,

    #[error("fetch task ended without reporting a result")]
    Disconnected,
}

impl FetchError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("page size must be at least 1")]
    InvalidPageSize,

    #[error("trigger threshold must be a finite, non-negative distance (got {0})")]
    InvalidThreshold(f64),

    #[error("invalid pagination config: {0}")]
    Parse(#[from] serde_json::Error),
}
