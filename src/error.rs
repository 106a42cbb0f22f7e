// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types shared by the API client and the synchronizer.

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No user identity has been resolved for this session.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The task service rejected our credentials (HTTP 401).
    #[error("Unauthorized by task service")]
    Unauthorized,

    /// The task service (or the local role gate) refused the operation.
    #[error("Forbidden")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A task draft failed local validation before being sent.
    #[error("Invalid task draft: {0}")]
    InvalidDraft(String),

    #[error("Network error: {0}")]
    Transport(String),

    #[error("Task service error: {0}")]
    Api(String),

    #[error("Local storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True when the operation failed because no identity is available.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, AppError::Unauthenticated | AppError::Unauthorized)
    }

    /// True for failures that a user-initiated retry (pull to refresh,
    /// re-tap) can plausibly fix.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Transport(_) => true,
            AppError::Api(msg) => msg.starts_with("HTTP 5") || msg.starts_with("HTTP 429"),
            _ => false,
        }
    }
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;
