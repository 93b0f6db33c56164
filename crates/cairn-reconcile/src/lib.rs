//! Reconciliation engine for cairn.
//!
//! Orchestrates one reconciliation per registered account: resolve a
//! credential (role assumption or stored key pair), enumerate the remote
//! account's principals, and create catalog records for the ones not yet
//! tracked. The batch driver runs this over every registered account,
//! isolating failures so one bad profile never aborts the batch.
//!
//! The engine takes its collaborators — an
//! [`IdentityProvider`](cairn_connector::traits::IdentityProvider) and a
//! [`CatalogStore`](cairn_catalog::CatalogStore) — by injection; it
//! constructs nothing itself.

pub mod engine;
pub mod error;
pub mod report;
pub mod resolver;

pub use engine::ReconciliationEngine;
pub use error::{ReconcileError, ReconcileResult};
pub use report::{AccountReport, BatchSummary, PrincipalOutcome};
pub use resolver::{CredentialResolver, ROLE_SESSION_NAME};
