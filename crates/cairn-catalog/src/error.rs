//! Catalog store error types.

use thiserror::Error;

/// Error that can occur accessing the catalog store.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// An expected record was absent at a point lookup.
    #[error("record not found at {pk} / {sk}")]
    NotFound { pk: String, sk: String },

    /// The underlying store failed (network, throttling, permissions).
    #[error("store error: {message}")]
    Store {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A stored item is missing a required field.
    #[error("malformed record: {message}")]
    Malformed { message: String },
}

impl CatalogError {
    /// Create a not-found error for the given composite key.
    pub fn not_found(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        CatalogError::NotFound {
            pk: pk.into(),
            sk: sk.into(),
        }
    }

    /// Create a store error.
    pub fn store(message: impl Into<String>) -> Self {
        CatalogError::Store {
            message: message.into(),
            source: None,
        }
    }

    /// Create a store error with source.
    pub fn store_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CatalogError::Store {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a malformed record error.
    pub fn malformed(message: impl Into<String>) -> Self {
        CatalogError::Malformed {
            message: message.into(),
        }
    }

    /// Whether this error is the absence of an expected record, as opposed
    /// to a store failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogError::NotFound { .. } => "NOT_FOUND",
            CatalogError::Store { .. } => "STORE_ERROR",
            CatalogError::Malformed { .. } => "MALFORMED_RECORD",
        }
    }
}

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let err = CatalogError::not_found("Company#a", "#Profile#b");
        assert!(err.is_not_found());
        assert_eq!(err.error_code(), "NOT_FOUND");

        assert!(!CatalogError::store("boom").is_not_found());
    }

    #[test]
    fn test_display_includes_key() {
        let err = CatalogError::not_found("CLOUD#AWS123", "#PROFILE#AWS123");
        let text = err.to_string();
        assert!(text.contains("CLOUD#AWS123"));
        assert!(text.contains("#PROFILE#AWS123"));
    }
}
