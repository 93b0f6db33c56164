//! Composite key construction for the single-table layout.
//!
//! Every record type shares one table; partition and sort key prefixes keep
//! them apart. All tenant scoping flows through these builders, so the
//! (company, account) isolation invariant lives here and nowhere else.

use cairn_connector::ids::{AccountNumber, CloudAccountId, CompanyId, UserRecordId};

/// Partition key attribute name.
pub const ATTR_PK: &str = "PK";
/// Sort key attribute name.
pub const ATTR_SK: &str = "SK";

/// Partition key prefix shared by all company-scoped records.
pub const COMPANY_PK_PREFIX: &str = "Company#";
/// Sort key prefix of account profile records.
pub const PROFILE_SK_PREFIX: &str = "#AccountProfile#";
/// Cloud provider tag used in stored-credential keys.
const CLOUD_PROVIDER: &str = "AWS";

/// Partition key of all records owned by a company.
pub fn company_pk(company: &CompanyId) -> String {
    format!("{COMPANY_PK_PREFIX}{company}")
}

/// Sort key of an account profile record.
pub fn profile_sk(account: &CloudAccountId) -> String {
    format!("{PROFILE_SK_PREFIX}{account}")
}

/// Partition key of a stored-credential record.
pub fn credential_pk(account_number: &AccountNumber) -> String {
    format!("CLOUD#{CLOUD_PROVIDER}{account_number}")
}

/// Sort key of a stored-credential record.
pub fn credential_sk(account_number: &AccountNumber) -> String {
    format!("#PROFILE#{CLOUD_PROVIDER}{account_number}")
}

/// Sort key prefix of all principal records under one cloud account.
pub fn user_sk_prefix(account: &CloudAccountId) -> String {
    format!("#CloudAcct#{account}#CloudUser#")
}

/// Sort key of one principal record.
pub fn user_sk(account: &CloudAccountId, record_id: &UserRecordId) -> String {
    format!("{}{record_id}", user_sk_prefix(account))
}
