//! Reconciliation error types.
//!
//! Every variant is scoped to one account except [`ReconcileError::Scan`],
//! which means the batch could not even enumerate the registered accounts.

use thiserror::Error;

use cairn_catalog::CatalogError;
use cairn_connector::error::ConnectorError;
use cairn_connector::ids::{AccountNumber, CloudAccountId};

/// Errors that can occur during reconciliation.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Role assumption for the account was rejected.
    #[error("credential resolution failed for account {account_id}: {source}")]
    Credential {
        account_id: CloudAccountId,
        #[source]
        source: ConnectorError,
    },

    /// The stored key pair for the account is absent from the catalog.
    #[error("no stored credential for account number {account_number}: {source}")]
    CredentialNotFound {
        account_number: AccountNumber,
        #[source]
        source: CatalogError,
    },

    /// Enumerating the remote account's principals failed.
    #[error("remote enumeration failed for account {account_id}: {source}")]
    Remote {
        account_id: CloudAccountId,
        #[source]
        source: ConnectorError,
    },

    /// Reading or writing the catalog failed mid-reconciliation.
    #[error("catalog access failed for account {account_id}: {source}")]
    Store {
        account_id: CloudAccountId,
        #[source]
        source: CatalogError,
    },

    /// The account profile scan itself failed; nothing was reconciled.
    #[error("account profile scan failed: {0}")]
    Scan(#[source] CatalogError),
}

impl ReconcileError {
    /// Get an error code for the per-account failure log entry.
    pub fn error_code(&self) -> &'static str {
        match self {
            ReconcileError::Credential { .. } => "CREDENTIAL_ERROR",
            ReconcileError::CredentialNotFound { .. } => "CREDENTIAL_NOT_FOUND",
            ReconcileError::Remote { .. } => "REMOTE_API_ERROR",
            ReconcileError::Store { .. } => "STORE_ERROR",
            ReconcileError::Scan { .. } => "SCAN_ERROR",
        }
    }

    /// Whether this error aborted a single account rather than the batch.
    pub fn is_account_scoped(&self) -> bool {
        !matches!(self, ReconcileError::Scan { .. })
    }
}

/// Result type for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;
