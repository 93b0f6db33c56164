//! Type-safe identifiers
//!
//! Newtype wrappers for the identifiers flowing through reconciliation.
//! Company and account identifiers are opaque strings assigned by the
//! registration process; record ids are generated UUIDs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a tenant ("company") owning one or more cloud accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(String);

impl CompanyId {
    /// Create a CompanyId from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CompanyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CompanyId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Internal identifier of a registered cloud account within a tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CloudAccountId(String);

impl CloudAccountId {
    /// Create a CloudAccountId from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CloudAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CloudAccountId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CloudAccountId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Provider-assigned account number (e.g. the 12-digit AWS account number).
///
/// Treated as an opaque string; no format validation is applied here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNumber(String);

impl AccountNumber {
    /// Create an AccountNumber from any string-like value.
    pub fn new(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Get the account number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AccountNumber {
    fn from(number: String) -> Self {
        Self(number)
    }
}

impl From<&str> for AccountNumber {
    fn from(number: &str) -> Self {
        Self(number.to_string())
    }
}

/// Unique identifier generated for a catalog principal record.
///
/// Random 128-bit, collision-free for practical purposes. Carried as a
/// payload field on the record; never used as a lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecordId(Uuid);

impl UserRecordId {
    /// Generate a new random UserRecordId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a UserRecordId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID value.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parse from a string representation.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for UserRecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserRecordId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for UserRecordId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<UserRecordId> for Uuid {
    fn from(id: UserRecordId) -> Self {
        id.0
    }
}
