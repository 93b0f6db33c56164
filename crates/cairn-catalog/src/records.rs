//! Catalog record types.
//!
//! Tagged structs with explicit required fields, one per stored entity.
//! Field name constants match the persisted attribute names.

use serde::{Deserialize, Serialize};

use cairn_connector::ids::{AccountNumber, CloudAccountId, CompanyId, UserRecordId};

/// Attribute names of account profile records.
pub mod profile_fields {
    pub const IAM_ARN: &str = "iam_arn";
    pub const ACCOUNT_ID: &str = "account_id";
    pub const ACCOUNT_NUMBER: &str = "account_number";
    pub const COMPANY_ID: &str = "company_id";
}

/// Attribute names of stored-credential records.
pub mod credential_fields {
    pub const ACCESS_KEY_ID: &str = "AccessKeyId";
    pub const ACCESS_KEY_SECRET: &str = "AccessKeySecret";
}

/// Attribute names of principal records.
pub mod user_fields {
    pub const NAME: &str = "name";
    pub const USER_ID: &str = "user_id";
    pub const ACCOUNT_ID: &str = "account_id";
}

/// One remote account registered for reconciliation.
///
/// Written by the out-of-scope registration process; read-only here. A
/// populated `role_arn` selects the role-assumption credential strategy,
/// otherwise credentials are looked up from the stored key pair for
/// `account_number`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub company_id: CompanyId,
    pub account_id: CloudAccountId,
    pub account_number: AccountNumber,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
}

impl AccountProfile {
    /// Whether this profile resolves credentials by assuming a role.
    pub fn uses_role_assumption(&self) -> bool {
        self.role_arn.as_deref().is_some_and(|arn| !arn.is_empty())
    }
}

/// The tracked representation of a principal once discovered.
///
/// Created on first discovery, never mutated or deleted. Unique per
/// (company, account, name); `user_id` is a payload field, not a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudUserRecord {
    pub user_id: UserRecordId,
    pub name: String,
    pub company_id: CompanyId,
    pub account_id: CloudAccountId,
}
