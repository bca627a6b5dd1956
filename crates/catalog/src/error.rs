//! Unified error handling.
//!
//! Provides a crate-level `CatalogError` that the module-specific error
//! types convert into, so callers composing several stores can work with a
//! single `Result<T, CatalogError>`.

use thiserror::Error;

use crate::config::ConfigError;
use crate::identity::AuthError;
use crate::query::QueryError;
use crate::sheets::SheetsError;

/// Top-level error type for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Remote table backend operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] SheetsError),

    /// Authentication or registration failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Query input was rejected.
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl CatalogError {
    /// Whether retrying the same operation could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Backend(err) => err.is_retryable(),
            Self::Auth(AuthError::Backend(err)) => err.is_retryable(),
            Self::Auth(_) | Self::Query(_) | Self::Config(_) | Self::NotFound(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_retryability_is_forwarded() {
        let rate_limited = CatalogError::Backend(SheetsError::RateLimited(30));
        assert!(rate_limited.is_retryable());

        let missing = CatalogError::NotFound("sheet".to_owned());
        assert!(!missing.is_retryable());
    }

    #[test]
    fn displays_wrap_the_source() {
        let err = CatalogError::Backend(SheetsError::NotFound("orders".to_owned()));
        assert!(err.to_string().starts_with("Backend error:"));
    }
}
