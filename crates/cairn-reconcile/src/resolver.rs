//! Per-account credential resolution.
//!
//! Two mutually exclusive strategies, selected by which fields the account
//! profile carries: assume the profile's cross-account role, or look up the
//! stored long-lived key pair for the profile's account number. A fresh
//! resolve happens per account per run; nothing is cached.

use std::sync::Arc;

use tracing::debug;

use cairn_catalog::{AccountProfile, CatalogStore};
use cairn_connector::credential::Credential;
use cairn_connector::traits::IdentityProvider;

use crate::error::{ReconcileError, ReconcileResult};

/// Fixed session name used for every cross-account role assumption.
pub const ROLE_SESSION_NAME: &str = "cairn-cross-account";

/// Resolves a usable credential for one account profile.
pub struct CredentialResolver {
    provider: Arc<dyn IdentityProvider>,
    catalog: Arc<dyn CatalogStore>,
}

impl CredentialResolver {
    /// Create a resolver over the injected provider and catalog.
    pub fn new(provider: Arc<dyn IdentityProvider>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self { provider, catalog }
    }

    /// Resolve a credential for the account the profile describes.
    ///
    /// The credential is scoped to this account for the duration of one
    /// reconciliation run and is dropped when the run ends.
    pub async fn resolve(&self, profile: &AccountProfile) -> ReconcileResult<Credential> {
        if profile.uses_role_assumption() {
            let role_arn = profile.role_arn.as_deref().unwrap_or_default();
            debug!(
                company_id = %profile.company_id,
                account_id = %profile.account_id,
                role_arn,
                "resolving credential via role assumption"
            );
            self.provider
                .assume_role(role_arn, ROLE_SESSION_NAME)
                .await
                .map_err(|source| ReconcileError::Credential {
                    account_id: profile.account_id.clone(),
                    source,
                })
        } else {
            debug!(
                company_id = %profile.company_id,
                account_id = %profile.account_id,
                account_number = %profile.account_number,
                "resolving credential from stored key pair"
            );
            self.catalog
                .get_credential(&profile.account_number)
                .await
                .map_err(|source| ReconcileError::CredentialNotFound {
                    account_number: profile.account_number.clone(),
                    source,
                })
        }
    }
}
