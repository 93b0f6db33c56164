//! Reconciliation engine tests against the in-memory catalog and a
//! scripted identity provider.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cairn_catalog::{AccountProfile, CatalogStore, MemoryCatalog};
use cairn_connector::async_trait;
use cairn_connector::credential::Credential;
use cairn_connector::error::{ConnectorError, ConnectorResult};
use cairn_connector::ids::{AccountNumber, CloudAccountId, CompanyId};
use cairn_connector::traits::{IdentityProvider, PrincipalPage};
use cairn_reconcile::ReconciliationEngine;

/// Identity provider backed by scripted data.
///
/// Role assumption hands out a credential whose access key id selects the
/// pages served to the enumerator, so each test account gets its own
/// principal set.
#[derive(Default)]
struct ScriptedProvider {
    /// access key id -> principal name pages
    pages: HashMap<String, Vec<Vec<String>>>,
    /// role arn -> access key id handed out on assumption
    roles: HashMap<String, String>,
    deny_roles: HashSet<String>,
    assume_calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self::default()
    }

    fn with_account(mut self, role_arn: &str, access_key: &str, pages: &[&[&str]]) -> Self {
        self.roles
            .insert(role_arn.to_string(), access_key.to_string());
        self.with_stored_account(access_key, pages)
    }

    /// Register pages for a credential that is never handed out by
    /// assumption (stored-key accounts).
    fn with_stored_account(mut self, access_key: &str, pages: &[&[&str]]) -> Self {
        self.pages.insert(
            access_key.to_string(),
            pages
                .iter()
                .map(|page| page.iter().map(|n| (*n).to_string()).collect())
                .collect(),
        );
        self
    }

    fn with_denied_role(mut self, role_arn: &str) -> Self {
        self.deny_roles.insert(role_arn.to_string());
        self
    }
}

#[async_trait]
impl IdentityProvider for ScriptedProvider {
    async fn assume_role(
        &self,
        role_arn: &str,
        _session_name: &str,
    ) -> ConnectorResult<Credential> {
        self.assume_calls.fetch_add(1, Ordering::SeqCst);
        if self.deny_roles.contains(role_arn) {
            return Err(ConnectorError::credential_denied("trust policy rejected"));
        }
        let access_key = self
            .roles
            .get(role_arn)
            .ok_or_else(|| ConnectorError::credential_denied("unknown role"))?;
        Ok(Credential::short_lived(access_key, "secret", "token"))
    }

    async fn list_principals_page(
        &self,
        credential: &Credential,
        marker: Option<&str>,
    ) -> ConnectorResult<PrincipalPage> {
        let pages = self
            .pages
            .get(credential.access_key_id())
            .ok_or_else(|| ConnectorError::remote_api("not authorized for this account"))?;

        let index = marker.map_or(Ok(0), str::parse::<usize>).map_err(|_| {
            ConnectorError::invalid_parameter("bad continuation marker")
        })?;
        let names = pages
            .get(index)
            .cloned()
            .ok_or_else(|| ConnectorError::remote_api("page out of range"))?;

        let mut page = PrincipalPage::new(names);
        if index + 1 < pages.len() {
            page = page.with_marker((index + 1).to_string());
        }
        Ok(page)
    }
}

fn role_profile(company: &str, account: &str, number: &str, role_arn: &str) -> AccountProfile {
    AccountProfile {
        company_id: CompanyId::new(company),
        account_id: CloudAccountId::new(account),
        account_number: AccountNumber::new(number),
        role_arn: Some(role_arn.to_string()),
    }
}

fn stored_key_profile(company: &str, account: &str, number: &str) -> AccountProfile {
    AccountProfile {
        company_id: CompanyId::new(company),
        account_id: CloudAccountId::new(account),
        account_number: AccountNumber::new(number),
        role_arn: None,
    }
}

fn engine_over(
    provider: ScriptedProvider,
    catalog: Arc<MemoryCatalog>,
) -> (ReconciliationEngine, Arc<MemoryCatalog>) {
    let provider: Arc<dyn IdentityProvider> = Arc::new(provider);
    let store: Arc<dyn CatalogStore> = catalog.clone();
    (ReconciliationEngine::new(provider, store), catalog)
}

const ROLE_A: &str = "arn:aws:iam::111111111111:role/census";

#[tokio::test]
async fn reconcile_creates_only_untracked_principals() {
    // Account A has alice, bob, carol remote; alice is already tracked.
    let provider =
        ScriptedProvider::new().with_account(ROLE_A, "AKIA-A", &[&["alice", "bob", "carol"]]);
    let catalog = Arc::new(MemoryCatalog::new());
    let company = CompanyId::new("acme");
    let account = CloudAccountId::new("acct-1");

    let existing = catalog
        .create_principal(&company, &account, "alice")
        .await
        .unwrap();

    let (engine, catalog) = engine_over(provider, catalog);
    let profile = role_profile("acme", "acct-1", "111111111111", ROLE_A);
    let report = engine.reconcile(&profile).await.unwrap();

    assert_eq!(report.processed, vec!["alice", "bob", "carol"]);
    assert_eq!(report.created, 2);
    assert_eq!(report.skipped, 1);

    // alice's original record id is unchanged.
    let alice = catalog
        .find_principal(&company, &account, "alice")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(alice.user_id, existing.user_id);

    assert_eq!(catalog.principal_records(&company, &account).await.len(), 3);
}

#[tokio::test]
async fn reconcile_is_idempotent_when_remote_set_is_unchanged() {
    let provider =
        ScriptedProvider::new().with_account(ROLE_A, "AKIA-A", &[&["alice", "bob"]]);
    let catalog = Arc::new(MemoryCatalog::new());
    let (engine, catalog) = engine_over(provider, catalog);
    let profile = role_profile("acme", "acct-1", "111111111111", ROLE_A);

    let first = engine.reconcile(&profile).await.unwrap();
    assert_eq!(first.created, 2);

    let second = engine.reconcile(&profile).await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(second.processed, first.processed);

    let records = catalog
        .principal_records(&CompanyId::new("acme"), &CloudAccountId::new("acct-1"))
        .await;
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn reconcile_tracks_every_enumerated_principal() {
    let names: Vec<String> = (0..7).map(|i| format!("user-{i}")).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let provider = ScriptedProvider::new().with_account(ROLE_A, "AKIA-A", &[&name_refs]);
    let catalog = Arc::new(MemoryCatalog::new());
    let (engine, catalog) = engine_over(provider, catalog);

    let profile = role_profile("acme", "acct-1", "111111111111", ROLE_A);
    engine.reconcile(&profile).await.unwrap();

    for name in &names {
        let found = catalog
            .find_principal(&profile.company_id, &profile.account_id, name)
            .await
            .unwrap();
        assert!(found.is_some(), "expected {name} to be tracked");
    }
}

#[tokio::test]
async fn enumeration_spans_pages_without_duplicates_or_omissions() {
    let provider = ScriptedProvider::new().with_account(
        ROLE_A,
        "AKIA-A",
        &[&["alice", "bob"], &["carol"], &["dave", "erin"]],
    );
    let catalog = Arc::new(MemoryCatalog::new());
    let (engine, _catalog) = engine_over(provider, catalog);

    let profile = role_profile("acme", "acct-1", "111111111111", ROLE_A);
    let report = engine.reconcile(&profile).await.unwrap();

    assert_eq!(report.processed, vec!["alice", "bob", "carol", "dave", "erin"]);
    assert_eq!(report.created, 5);
}

#[tokio::test]
async fn stored_key_strategy_skips_role_assumption() {
    let provider = ScriptedProvider::new().with_stored_account("AKIA-STORED", &[&["alice"]]);
    let catalog = Arc::new(MemoryCatalog::new());
    let number = AccountNumber::new("222222222222");
    catalog
        .insert_stored_credential(&number, "AKIA-STORED", "stored-secret")
        .await;

    let provider = Arc::new(provider);
    let calls = Arc::clone(&provider);
    let store: Arc<dyn CatalogStore> = catalog.clone();
    let engine = ReconciliationEngine::new(provider, store);

    let profile = stored_key_profile("acme", "acct-2", "222222222222");
    let report = engine.reconcile(&profile).await.unwrap();

    assert_eq!(report.processed, vec!["alice"]);
    assert_eq!(calls.assume_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_stored_credential_aborts_the_account() {
    let provider = ScriptedProvider::new();
    let catalog = Arc::new(MemoryCatalog::new());
    let (engine, _catalog) = engine_over(provider, catalog);

    let profile = stored_key_profile("acme", "acct-3", "333333333333");
    let err = engine.reconcile(&profile).await.unwrap_err();
    assert_eq!(err.error_code(), "CREDENTIAL_NOT_FOUND");
    assert!(err.is_account_scoped());
}

#[tokio::test]
async fn batch_isolates_failing_accounts() {
    const ROLE_BAD: &str = "arn:aws:iam::444444444444:role/census";
    let provider = ScriptedProvider::new()
        .with_account(ROLE_A, "AKIA-A", &[&["alice", "bob"]])
        .with_denied_role(ROLE_BAD);

    let catalog = Arc::new(MemoryCatalog::new());
    catalog
        .insert_profile(&role_profile("acme", "acct-bad", "444444444444", ROLE_BAD))
        .await;
    catalog
        .insert_profile(&role_profile("acme", "acct-good", "111111111111", ROLE_A))
        .await;

    let (engine, catalog) = engine_over(provider, catalog);
    let summary = engine.run_batch().await.unwrap();

    assert_eq!(summary.accounts_total(), 2);
    assert_eq!(summary.accounts_failed, 1);
    assert_eq!(summary.accounts_succeeded, 1);
    assert_eq!(summary.principals_created, 2);

    // The healthy account's records were still created.
    let records = catalog
        .principal_records(&CompanyId::new("acme"), &CloudAccountId::new("acct-good"))
        .await;
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn batch_drives_every_scan_page() {
    let mut provider = ScriptedProvider::new();
    let catalog = Arc::new(MemoryCatalog::new().with_page_size(2));
    for i in 0..5 {
        let role = format!("arn:aws:iam::{i:012}:role/census");
        let key = format!("AKIA-{i}");
        provider = provider.with_account(&role, &key, &[&["admin"]]);
        catalog
            .insert_profile(&role_profile("acme", &format!("acct-{i}"), &format!("{i:012}"), &role))
            .await;
    }

    let (engine, _catalog) = engine_over(provider, catalog);
    let summary = engine.run_batch().await.unwrap();

    assert_eq!(summary.accounts_succeeded, 5);
    assert_eq!(summary.principals_created, 5);
}

#[tokio::test]
async fn identically_named_principals_stay_tenant_scoped() {
    const ROLE_B: &str = "arn:aws:iam::555555555555:role/census";
    let provider = ScriptedProvider::new()
        .with_account(ROLE_A, "AKIA-A", &[&["admin"]])
        .with_account(ROLE_B, "AKIA-B", &[&["admin"]]);

    let catalog = Arc::new(MemoryCatalog::new());
    let (engine, catalog) = engine_over(provider, catalog);

    engine
        .reconcile(&role_profile("acme", "acct-1", "111111111111", ROLE_A))
        .await
        .unwrap();
    engine
        .reconcile(&role_profile("globex", "acct-1", "555555555555", ROLE_B))
        .await
        .unwrap();

    let acme = catalog
        .principal_records(&CompanyId::new("acme"), &CloudAccountId::new("acct-1"))
        .await;
    let globex = catalog
        .principal_records(&CompanyId::new("globex"), &CloudAccountId::new("acct-1"))
        .await;

    assert_eq!(acme.len(), 1);
    assert_eq!(globex.len(), 1);
    assert_ne!(acme[0].user_id, globex[0].user_id);
    assert_eq!(acme[0].name, globex[0].name);
}
