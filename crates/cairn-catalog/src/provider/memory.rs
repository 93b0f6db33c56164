//! In-memory catalog provider.
//!
//! Keeps items in a BTreeMap under the same composite key layout as the
//! DynamoDB provider. Used by tests and local development; the scan page
//! size is configurable so pagination paths get exercised.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use cairn_connector::credential::Credential;
use cairn_connector::ids::{AccountNumber, CloudAccountId, CompanyId, UserRecordId};

use crate::error::{CatalogError, CatalogResult};
use crate::key;
use crate::records::{
    credential_fields, profile_fields, user_fields, AccountProfile, CloudUserRecord,
};
use crate::store::{CatalogStore, ProfilePage, ScanPosition};

type Item = HashMap<String, String>;
type CompositeKey = (String, String);

const DEFAULT_PAGE_SIZE: usize = 100;

/// Catalog store held in process memory.
#[derive(Debug)]
pub struct MemoryCatalog {
    items: RwLock<BTreeMap<CompositeKey, Item>>,
    page_size: usize,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCatalog {
    /// Create an empty in-memory catalog.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(BTreeMap::new()),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the scan/query page size (items per page).
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Seed an account profile record.
    pub async fn insert_profile(&self, profile: &AccountProfile) {
        let mut item = Item::new();
        item.insert(
            profile_fields::COMPANY_ID.to_string(),
            profile.company_id.to_string(),
        );
        item.insert(
            profile_fields::ACCOUNT_ID.to_string(),
            profile.account_id.to_string(),
        );
        item.insert(
            profile_fields::ACCOUNT_NUMBER.to_string(),
            profile.account_number.to_string(),
        );
        if let Some(arn) = &profile.role_arn {
            item.insert(profile_fields::IAM_ARN.to_string(), arn.clone());
        }

        self.items.write().await.insert(
            (
                key::company_pk(&profile.company_id),
                key::profile_sk(&profile.account_id),
            ),
            item,
        );
    }

    /// Seed a stored-credential record for an account number.
    pub async fn insert_stored_credential(
        &self,
        account_number: &AccountNumber,
        access_key_id: impl Into<String>,
        access_key_secret: impl Into<String>,
    ) {
        let mut item = Item::new();
        item.insert(
            credential_fields::ACCESS_KEY_ID.to_string(),
            access_key_id.into(),
        );
        item.insert(
            credential_fields::ACCESS_KEY_SECRET.to_string(),
            access_key_secret.into(),
        );

        self.items.write().await.insert(
            (
                key::credential_pk(account_number),
                key::credential_sk(account_number),
            ),
            item,
        );
    }

    /// All principal records under (company, account), in sort key order.
    ///
    /// Test helper; the reconciliation core never reads the catalog this
    /// way.
    pub async fn principal_records(
        &self,
        company: &CompanyId,
        account: &CloudAccountId,
    ) -> Vec<CloudUserRecord> {
        let pk = key::company_pk(company);
        let prefix = key::user_sk_prefix(account);

        self.items
            .read()
            .await
            .iter()
            .filter(|((item_pk, item_sk), _)| *item_pk == pk && item_sk.starts_with(&prefix))
            .filter_map(|((item_pk, _), item)| parse_user_item(item_pk, item).ok())
            .collect()
    }

    fn after_position<'a>(
        entries: impl Iterator<Item = (&'a CompositeKey, &'a Item)>,
        start: &Option<ScanPosition>,
    ) -> Vec<(CompositeKey, Item)> {
        entries
            .filter(|((pk, sk), _)| match start {
                Some(position) => (pk.as_str(), sk.as_str()) > (position.pk.as_str(), position.sk.as_str()),
                None => true,
            })
            .map(|(key, item)| (key.clone(), item.clone()))
            .collect()
    }
}

fn parse_user_item(pk: &str, item: &Item) -> CatalogResult<CloudUserRecord> {
    let field = |name: &str| {
        item.get(name)
            .cloned()
            .ok_or_else(|| CatalogError::malformed(format!("missing attribute '{name}'")))
    };
    let company = pk
        .strip_prefix(key::COMPANY_PK_PREFIX)
        .ok_or_else(|| CatalogError::malformed("principal record outside company partition"))?;

    Ok(CloudUserRecord {
        user_id: UserRecordId::parse(&field(user_fields::USER_ID)?)
            .map_err(|e| CatalogError::malformed(format!("bad user_id: {e}")))?,
        name: field(user_fields::NAME)?,
        company_id: CompanyId::new(company),
        account_id: CloudAccountId::new(field(user_fields::ACCOUNT_ID)?),
    })
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn scan_account_profiles_page(
        &self,
        start: Option<ScanPosition>,
    ) -> CatalogResult<ProfilePage> {
        let items = self.items.read().await;
        let matching = Self::after_position(
            items.iter().filter(|((pk, sk), _)| {
                pk.starts_with(key::COMPANY_PK_PREFIX) && sk.starts_with(key::PROFILE_SK_PREFIX)
            }),
            &start,
        );

        let page: Vec<_> = matching.iter().take(self.page_size).cloned().collect();
        let next = if matching.len() > page.len() {
            page.last().map(|((pk, sk), _)| ScanPosition {
                pk: pk.clone(),
                sk: sk.clone(),
            })
        } else {
            None
        };

        let profiles = page
            .iter()
            .map(|(_, item)| {
                let field = |name: &str| {
                    item.get(name).cloned().ok_or_else(|| {
                        CatalogError::malformed(format!("missing attribute '{name}'"))
                    })
                };
                Ok(AccountProfile {
                    company_id: CompanyId::new(field(profile_fields::COMPANY_ID)?),
                    account_id: CloudAccountId::new(field(profile_fields::ACCOUNT_ID)?),
                    account_number: AccountNumber::new(field(profile_fields::ACCOUNT_NUMBER)?),
                    role_arn: item.get(profile_fields::IAM_ARN).cloned(),
                })
            })
            .collect::<CatalogResult<Vec<_>>>()?;

        Ok(ProfilePage { profiles, next })
    }

    async fn get_credential(&self, account_number: &AccountNumber) -> CatalogResult<Credential> {
        let pk = key::credential_pk(account_number);
        let sk = key::credential_sk(account_number);

        let items = self.items.read().await;
        let item = items
            .get(&(pk.clone(), sk.clone()))
            .ok_or_else(|| CatalogError::not_found(&pk, &sk))?;

        let field = |name: &str| {
            item.get(name)
                .cloned()
                .ok_or_else(|| CatalogError::malformed(format!("missing attribute '{name}'")))
        };

        Ok(Credential::long_lived(
            field(credential_fields::ACCESS_KEY_ID)?,
            field(credential_fields::ACCESS_KEY_SECRET)?,
        ))
    }

    async fn find_principal(
        &self,
        company: &CompanyId,
        account: &CloudAccountId,
        name: &str,
    ) -> CatalogResult<Option<CloudUserRecord>> {
        let pk = key::company_pk(company);
        let prefix = key::user_sk_prefix(account);

        let items = self.items.read().await;
        for ((item_pk, item_sk), item) in items.iter() {
            if *item_pk == pk
                && item_sk.starts_with(&prefix)
                && item.get(user_fields::NAME).map(String::as_str) == Some(name)
            {
                return parse_user_item(item_pk, item).map(Some);
            }
        }
        Ok(None)
    }

    async fn create_principal(
        &self,
        company: &CompanyId,
        account: &CloudAccountId,
        name: &str,
    ) -> CatalogResult<CloudUserRecord> {
        let record = CloudUserRecord {
            user_id: UserRecordId::new(),
            name: name.to_string(),
            company_id: company.clone(),
            account_id: account.clone(),
        };

        let mut item = Item::new();
        item.insert(user_fields::NAME.to_string(), record.name.clone());
        item.insert(user_fields::USER_ID.to_string(), record.user_id.to_string());
        item.insert(user_fields::ACCOUNT_ID.to_string(), account.to_string());

        self.items.write().await.insert(
            (
                key::company_pk(company),
                key::user_sk(account, &record.user_id),
            ),
            item,
        );

        Ok(record)
    }
}
