//! Domain error model.

use thiserror::Error;

/// Result type used across the audit domain.
pub type AuditResult<T> = Result<T, AuditError>;

/// Domain-level error.
///
/// Deterministic failures detected while turning host state into audit
/// records. Storage failures live in the infra layer (`PersistenceError`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// A tracking-enabled snapshot carried no usable integer quantity.
    #[error("invalid stock snapshot: {0}")]
    InvalidSnapshot(String),

    /// A record had neither a before nor an after stock level.
    #[error("missing attribution: {0}")]
    MissingAttribution(String),

    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl AuditError {
    pub fn invalid_snapshot(msg: impl Into<String>) -> Self {
        Self::InvalidSnapshot(msg.into())
    }

    pub fn missing_attribution(msg: impl Into<String>) -> Self {
        Self::MissingAttribution(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}
