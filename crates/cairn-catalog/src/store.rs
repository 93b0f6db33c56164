//! The catalog store contract and the profile scan iterator.

use async_trait::async_trait;

use cairn_connector::credential::Credential;
use cairn_connector::ids::{AccountNumber, CloudAccountId, CompanyId};

use crate::error::CatalogResult;
use crate::records::{AccountProfile, CloudUserRecord};

/// Opaque continuation position within a profile scan.
///
/// Carries the composite key of the last item a page returned; providers
/// resume strictly after it. Positions are only meaningful for the scan
/// that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPosition {
    pub pk: String,
    pub sk: String,
}

/// One page of an account profile scan.
#[derive(Debug, Clone)]
pub struct ProfilePage {
    pub profiles: Vec<AccountProfile>,
    /// Continuation position; `None` means the scan is exhausted.
    pub next: Option<ScanPosition>,
}

/// Typed access to the multi-tenant keyed store.
///
/// The four operations the reconciliation core uses. Implementations are
/// safe for concurrent readers and writers, but `create_principal` has no
/// existence precondition: at-most-one record per (company, account, name)
/// is enforced by the caller's prior `find_principal` check, and two
/// concurrent runs over the same account can still race a duplicate in.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch one page of registered account profiles across all tenants.
    async fn scan_account_profiles_page(
        &self,
        start: Option<ScanPosition>,
    ) -> CatalogResult<ProfilePage>;

    /// Point lookup of the stored long-lived key pair for an account.
    ///
    /// Fails with [`CatalogError::NotFound`](crate::CatalogError::NotFound)
    /// if no such record exists.
    async fn get_credential(&self, account_number: &AccountNumber) -> CatalogResult<Credential>;

    /// Find the tracked record for a principal name under (company,
    /// account). Absence is `Ok(None)`, not an error.
    async fn find_principal(
        &self,
        company: &CompanyId,
        account: &CloudAccountId,
        name: &str,
    ) -> CatalogResult<Option<CloudUserRecord>>;

    /// Create the tracked record for a newly discovered principal,
    /// generating its record id. Writes unconditionally; returns the
    /// written record.
    async fn create_principal(
        &self,
        company: &CompanyId,
        account: &CloudAccountId,
        name: &str,
    ) -> CatalogResult<CloudUserRecord>;
}

/// Lazy page-by-page iteration over all registered account profiles.
///
/// Hides continuation handling behind a `next_page` call. Each `ProfileScan`
/// is restartable per call site (construct a new one to rescan); a scan in
/// progress is not resumable elsewhere.
pub struct ProfileScan<'a> {
    store: &'a dyn CatalogStore,
    position: Option<ScanPosition>,
    exhausted: bool,
}

impl<'a> ProfileScan<'a> {
    /// Start a new scan from the beginning of the table.
    pub fn new(store: &'a dyn CatalogStore) -> Self {
        Self {
            store,
            position: None,
            exhausted: false,
        }
    }

    /// Fetch the next page of profiles, or `None` when the scan is done.
    ///
    /// A page may be empty while the scan still has further pages; callers
    /// should keep polling until `None`.
    pub async fn next_page(&mut self) -> CatalogResult<Option<Vec<AccountProfile>>> {
        if self.exhausted {
            return Ok(None);
        }

        let page = self
            .store
            .scan_account_profiles_page(self.position.take())
            .await?;

        match page.next {
            Some(next) => self.position = Some(next),
            None => self.exhausted = true,
        }

        Ok(Some(page.profiles))
    }
}
