//! Connector error types
//!
//! Error definitions with transient/permanent classification. All variants
//! are scoped to a single account's reconciliation; callers decide whether
//! to abort the run or continue with the next account.

use thiserror::Error;

/// Error that can occur while resolving credentials for or enumerating a
/// remote account.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Role assumption was rejected (bad trust policy, revoked role,
    /// access denied).
    #[error("credential denied: {message}")]
    CredentialDenied {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A request was malformed before it left the caller.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// The remote identity API failed, including authorization and
    /// validation errors surfaced by the provider.
    #[error("remote API error: {message}")]
    RemoteApi {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The provider throttled the request.
    #[error("throttled by provider: {message}")]
    Throttled { message: String },
}

impl ConnectorError {
    /// Check if this error is transient and could succeed on a later run.
    ///
    /// No retry happens within a run either way; classification feeds the
    /// structured log entry for the failed account.
    pub fn is_transient(&self) -> bool {
        matches!(self, ConnectorError::Throttled { .. })
    }

    /// Check if this error is permanent and needs operator intervention.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConnectorError::CredentialDenied { .. } => "CREDENTIAL_DENIED",
            ConnectorError::InvalidParameter { .. } => "INVALID_PARAMETER",
            ConnectorError::RemoteApi { .. } => "REMOTE_API_ERROR",
            ConnectorError::Throttled { .. } => "THROTTLED",
        }
    }

    // Convenience constructors

    /// Create a credential denied error.
    pub fn credential_denied(message: impl Into<String>) -> Self {
        ConnectorError::CredentialDenied {
            message: message.into(),
            source: None,
        }
    }

    /// Create a credential denied error with source.
    pub fn credential_denied_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::CredentialDenied {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        ConnectorError::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create a remote API error.
    pub fn remote_api(message: impl Into<String>) -> Self {
        ConnectorError::RemoteApi {
            message: message.into(),
            source: None,
        }
    }

    /// Create a remote API error with source.
    pub fn remote_api_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::RemoteApi {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a throttled error.
    pub fn throttled(message: impl Into<String>) -> Self {
        ConnectorError::Throttled {
            message: message.into(),
        }
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;
