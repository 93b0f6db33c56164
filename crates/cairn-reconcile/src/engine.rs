//! Reconciliation engine orchestrator.
//!
//! One reconciliation per account: resolve credential, enumerate remote
//! principals, create catalog records for the untracked ones. The batch
//! entry point drives this over every registered account profile.

use std::sync::Arc;

use tracing::{debug, info, warn};

use cairn_catalog::{AccountProfile, CatalogStore, ProfileScan};
use cairn_connector::traits::IdentityProvider;

use crate::error::{ReconcileError, ReconcileResult};
use crate::report::{AccountReport, BatchSummary, PrincipalOutcome};
use crate::resolver::CredentialResolver;

/// Reconciles remote account principals against the catalog.
pub struct ReconciliationEngine {
    provider: Arc<dyn IdentityProvider>,
    catalog: Arc<dyn CatalogStore>,
    resolver: CredentialResolver,
}

impl ReconciliationEngine {
    /// Create an engine over the injected provider and catalog.
    pub fn new(provider: Arc<dyn IdentityProvider>, catalog: Arc<dyn CatalogStore>) -> Self {
        Self {
            resolver: CredentialResolver::new(Arc::clone(&provider), Arc::clone(&catalog)),
            provider,
            catalog,
        }
    }

    /// Reconcile one account.
    ///
    /// Steps are strictly sequential: credential resolution, then remote
    /// enumeration, then one find-then-create pair per principal in
    /// enumeration order. Any failure aborts this account only; the
    /// returned report lists every processed principal name regardless of
    /// whether it was created or already tracked.
    pub async fn reconcile(&self, profile: &AccountProfile) -> ReconcileResult<AccountReport> {
        let credential = self.resolver.resolve(profile).await?;

        let names = self
            .provider
            .list_principals(&credential)
            .await
            .map_err(|source| ReconcileError::Remote {
                account_id: profile.account_id.clone(),
                source,
            })?;

        info!(
            company_id = %profile.company_id,
            account_id = %profile.account_id,
            principals = names.len(),
            "enumerated remote principals"
        );

        let mut report =
            AccountReport::new(profile.company_id.clone(), profile.account_id.clone());

        for name in names {
            let existing = self
                .catalog
                .find_principal(&profile.company_id, &profile.account_id, &name)
                .await
                .map_err(|source| ReconcileError::Store {
                    account_id: profile.account_id.clone(),
                    source,
                })?;

            match existing {
                Some(record) => {
                    debug!(
                        company_id = %profile.company_id,
                        account_id = %profile.account_id,
                        name,
                        user_id = %record.user_id,
                        "principal already tracked"
                    );
                    report.record(name, PrincipalOutcome::AlreadyTracked);
                }
                None => {
                    let record = self
                        .catalog
                        .create_principal(&profile.company_id, &profile.account_id, &name)
                        .await
                        .map_err(|source| ReconcileError::Store {
                            account_id: profile.account_id.clone(),
                            source,
                        })?;
                    info!(
                        company_id = %profile.company_id,
                        account_id = %profile.account_id,
                        name,
                        user_id = %record.user_id,
                        "created catalog record for discovered principal"
                    );
                    report.record(name, PrincipalOutcome::Created);
                }
            }
        }

        Ok(report)
    }

    /// Reconcile every registered account, page by page.
    ///
    /// Account-scoped failures are reduced to a log entry naming the
    /// offending profile and the batch continues; only a failure of the
    /// profile scan itself aborts the run.
    pub async fn run_batch(&self) -> ReconcileResult<BatchSummary> {
        let mut summary = BatchSummary::start();
        let mut scan = ProfileScan::new(self.catalog.as_ref());

        while let Some(profiles) = scan.next_page().await.map_err(ReconcileError::Scan)? {
            for profile in profiles {
                match self.reconcile(&profile).await {
                    Ok(report) => summary.absorb(&report),
                    Err(error) => {
                        warn!(
                            company_id = %profile.company_id,
                            account_id = %profile.account_id,
                            account_number = %profile.account_number,
                            error_code = error.error_code(),
                            error = %error,
                            "account reconciliation failed; continuing with next account"
                        );
                        summary.record_failure();
                    }
                }
            }
        }

        summary.finish();
        info!(
            accounts = summary.accounts_total(),
            succeeded = summary.accounts_succeeded,
            failed = summary.accounts_failed,
            created = summary.principals_created,
            "batch reconciliation complete"
        );

        Ok(summary)
    }
}
