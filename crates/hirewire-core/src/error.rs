//! Domain-level error types.

use thiserror::Error;

/// Errors raised while building the admission-control configuration.
///
/// Nothing on the request path returns these: every runtime failure degrades
/// to admitting the request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid rate limit rule: {0}")]
    InvalidRule(String),

    #[error("Unknown rate limit profile: {0}")]
    UnknownProfile(String),
}
