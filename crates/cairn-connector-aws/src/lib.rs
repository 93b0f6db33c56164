//! AWS identity provider for cairn.
//!
//! Implements the [`IdentityProvider`](cairn_connector::traits::IdentityProvider)
//! trait against AWS: cross-account credentials come from STS `AssumeRole`,
//! principal enumeration from IAM `ListUsers` with marker pagination.
//!
//! The provider holds a single STS client built from ambient AWS
//! configuration; per-account IAM clients are configured from the resolved
//! [`Credential`](cairn_connector::credential::Credential) and live only
//! for the run that resolved it.

mod iam;
mod provider;
mod sts;

pub use provider::AwsIdentityProvider;
