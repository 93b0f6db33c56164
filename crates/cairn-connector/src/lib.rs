//! # Connector Framework
//!
//! Core abstractions for connecting cairn to cloud identity providers.
//!
//! This crate provides the foundation for enumerating the identity
//! principals (users) of a remote cloud account: type-safe identifiers,
//! the [`Credential`] value produced by credential resolution, and the
//! [`IdentityProvider`] trait that concrete providers (AWS, ...) implement.
//!
//! ## Design
//!
//! Credentials are explicit values threaded through calls, never shared
//! mutable client state: a resolver produces a [`Credential`], the
//! enumerator consumes it, and the value is dropped at the end of the run.
//! Pagination is hidden behind [`IdentityProvider::list_principals`], which
//! drives the per-page operation until the provider reports no continuation
//! marker.
//!
//! ## Crate Organization
//!
//! - [`ids`] - Type-safe identifiers (`CompanyId`, `CloudAccountId`, ...)
//! - [`credential`] - The resolved access credential value
//! - [`error`] - Error types with transient/permanent classification
//! - [`traits`] - The `IdentityProvider` capability trait

pub mod credential;
pub mod error;
pub mod ids;
pub mod traits;

/// Prelude module for convenient imports.
///
/// ```
/// use cairn_connector::prelude::*;
/// ```
pub mod prelude {
    pub use crate::credential::Credential;
    pub use crate::error::{ConnectorError, ConnectorResult};
    pub use crate::ids::{AccountNumber, CloudAccountId, CompanyId, UserRecordId};
    pub use crate::traits::{IdentityProvider, PrincipalPage};
}

// Re-export async_trait for provider implementors
pub use async_trait::async_trait;
