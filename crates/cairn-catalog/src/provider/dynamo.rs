//! DynamoDB catalog provider.
//!
//! Single-table access using the official aws-sdk-dynamodb crate. The
//! client is constructed by the caller and injected, never created inside
//! nested calls.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use tracing::{debug, warn};

use cairn_connector::credential::Credential;
use cairn_connector::ids::{AccountNumber, CloudAccountId, CompanyId, UserRecordId};

use crate::error::{CatalogError, CatalogResult};
use crate::key;
use crate::records::{
    credential_fields, profile_fields, user_fields, AccountProfile, CloudUserRecord,
};
use crate::store::{CatalogStore, ProfilePage, ScanPosition};

type Item = HashMap<String, AttributeValue>;

/// Catalog store backed by a single DynamoDB table.
#[derive(Debug, Clone)]
pub struct DynamoCatalog {
    client: aws_sdk_dynamodb::Client,
    table: String,
}

impl DynamoCatalog {
    /// Create a new DynamoDB catalog over an injected client.
    pub fn new(client: aws_sdk_dynamodb::Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    /// The table this catalog reads and writes.
    pub fn table(&self) -> &str {
        &self.table
    }

    fn start_key(position: ScanPosition) -> Item {
        let mut item = Item::new();
        item.insert(key::ATTR_PK.to_string(), AttributeValue::S(position.pk));
        item.insert(key::ATTR_SK.to_string(), AttributeValue::S(position.sk));
        item
    }

    fn position_from(last: &Item) -> CatalogResult<ScanPosition> {
        Ok(ScanPosition {
            pk: item_str(last, key::ATTR_PK)?.to_string(),
            sk: item_str(last, key::ATTR_SK)?.to_string(),
        })
    }
}

/// Read a required string attribute off an item.
fn item_str<'a>(item: &'a Item, field: &str) -> CatalogResult<&'a str> {
    item.get(field)
        .and_then(|value| value.as_s().ok())
        .map(String::as_str)
        .ok_or_else(|| CatalogError::malformed(format!("missing string attribute '{field}'")))
}

/// Read an optional string attribute off an item.
fn item_str_opt<'a>(item: &'a Item, field: &str) -> Option<&'a str> {
    item.get(field)
        .and_then(|value| value.as_s().ok())
        .map(String::as_str)
}

fn parse_profile(item: &Item) -> CatalogResult<AccountProfile> {
    Ok(AccountProfile {
        company_id: CompanyId::new(item_str(item, profile_fields::COMPANY_ID)?),
        account_id: CloudAccountId::new(item_str(item, profile_fields::ACCOUNT_ID)?),
        account_number: AccountNumber::new(item_str(item, profile_fields::ACCOUNT_NUMBER)?),
        role_arn: item_str_opt(item, profile_fields::IAM_ARN).map(String::from),
    })
}

fn parse_user(item: &Item) -> CatalogResult<CloudUserRecord> {
    let user_id = UserRecordId::parse(item_str(item, user_fields::USER_ID)?)
        .map_err(|e| CatalogError::malformed(format!("bad user_id: {e}")))?;
    let company_id = item_str(item, key::ATTR_PK)?
        .strip_prefix(key::COMPANY_PK_PREFIX)
        .ok_or_else(|| CatalogError::malformed("principal record outside company partition"))?;

    Ok(CloudUserRecord {
        user_id,
        name: item_str(item, user_fields::NAME)?.to_string(),
        company_id: CompanyId::new(company_id),
        account_id: CloudAccountId::new(item_str(item, user_fields::ACCOUNT_ID)?),
    })
}

#[async_trait]
impl CatalogStore for DynamoCatalog {
    async fn scan_account_profiles_page(
        &self,
        start: Option<ScanPosition>,
    ) -> CatalogResult<ProfilePage> {
        let mut request = self
            .client
            .scan()
            .table_name(&self.table)
            .filter_expression("begins_with(PK, :pk_prefix) AND begins_with(SK, :sk_prefix)")
            .expression_attribute_values(
                ":pk_prefix",
                AttributeValue::S(key::COMPANY_PK_PREFIX.to_string()),
            )
            .expression_attribute_values(
                ":sk_prefix",
                AttributeValue::S(key::PROFILE_SK_PREFIX.to_string()),
            );

        if let Some(position) = start {
            request = request.set_exclusive_start_key(Some(Self::start_key(position)));
        }

        let output = request
            .send()
            .await
            .map_err(|e| CatalogError::store_with_source("profile scan failed", e))?;

        let mut profiles = Vec::new();
        for item in output.items() {
            match parse_profile(item) {
                Ok(profile) => profiles.push(profile),
                // A bad registration row must not poison the whole batch.
                Err(e) => warn!(error = %e, "skipping malformed account profile item"),
            }
        }

        let next = output
            .last_evaluated_key()
            .map(Self::position_from)
            .transpose()?;

        debug!(
            profiles = profiles.len(),
            has_more = next.is_some(),
            "scanned account profile page"
        );

        Ok(ProfilePage { profiles, next })
    }

    async fn get_credential(&self, account_number: &AccountNumber) -> CatalogResult<Credential> {
        let pk = key::credential_pk(account_number);
        let sk = key::credential_sk(account_number);

        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(key::ATTR_PK, AttributeValue::S(pk.clone()))
            .key(key::ATTR_SK, AttributeValue::S(sk.clone()))
            .send()
            .await
            .map_err(|e| CatalogError::store_with_source("credential lookup failed", e))?;

        let item = output.item().ok_or_else(|| CatalogError::not_found(&pk, &sk))?;

        Ok(Credential::long_lived(
            item_str(item, credential_fields::ACCESS_KEY_ID)?,
            item_str(item, credential_fields::ACCESS_KEY_SECRET)?,
        ))
    }

    async fn find_principal(
        &self,
        company: &CompanyId,
        account: &CloudAccountId,
        name: &str,
    ) -> CatalogResult<Option<CloudUserRecord>> {
        let pk = key::company_pk(company);
        let sk_prefix = key::user_sk_prefix(account);
        let mut start_key: Option<Item> = None;

        // Query the (company, account) prefix to exhaustion; the match is
        // linear on the name field.
        loop {
            let mut request = self
                .client
                .query()
                .table_name(&self.table)
                .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
                .expression_attribute_values(":pk", AttributeValue::S(pk.clone()))
                .expression_attribute_values(":sk_prefix", AttributeValue::S(sk_prefix.clone()));

            if let Some(key) = start_key.take() {
                request = request.set_exclusive_start_key(Some(key));
            }

            let output = request
                .send()
                .await
                .map_err(|e| CatalogError::store_with_source("principal query failed", e))?;

            for item in output.items() {
                if item_str_opt(item, user_fields::NAME) == Some(name) {
                    return parse_user(item).map(Some);
                }
            }

            match output.last_evaluated_key() {
                Some(last) => start_key = Some(last.clone()),
                None => return Ok(None),
            }
        }
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

        self.client
            .put_item()
            .table_name(&self.table)
            .item(
                key::ATTR_PK,
                AttributeValue::S(key::company_pk(company)),
            )
            .item(
                key::ATTR_SK,
                AttributeValue::S(key::user_sk(account, &record.user_id)),
            )
            .item(
                user_fields::NAME,
                AttributeValue::S(record.name.clone()),
            )
            .item(
                user_fields::USER_ID,
                AttributeValue::S(record.user_id.to_string()),
            )
            .item(
                user_fields::ACCOUNT_ID,
                AttributeValue::S(account.as_str().to_string()),
            )
            .send()
            .await
            .map_err(|e| CatalogError::store_with_source("principal write failed", e))?;

        Ok(record)
    }
}
