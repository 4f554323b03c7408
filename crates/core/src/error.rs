//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures (validation, invariants,
/// malformed campaign definitions). IO concerns belong to the host.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// A campaign or condition was configured with values it cannot use.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }
}

/// Configuration error raised while building conditions and discounts.
///
/// These describe a malformed campaign definition. They are surfaced when the
/// offending value is parsed or constructed and are never swallowed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid comparison type '{0}'")]
    InvalidComparison(String),

    #[error("unknown cart amount behaviour '{0}'")]
    UnknownAmountScope(String),

    #[error("unknown match kind '{0}'")]
    UnknownMatchKind(String),

    #[error("unknown match mode '{0}' (expected 'does' or 'does_not')")]
    UnknownMatchMode(String),

    #[error("unknown quantifier '{0}' (expected 'all' or 'any')")]
    UnknownQuantifier(String),

    #[error("amount of {0} currency units is out of range")]
    AmountOutOfRange(i64),

    #[error("percentage must be within 0..=100, got {0}")]
    InvalidPercentage(i64),

    #[error("fraction denominator must be positive, got {0}")]
    InvalidDenominator(i64),
}
