//! Identity provider traits
//!
//! The capability trait concrete cloud providers implement. Implementors
//! supply the two remote operations (role assumption and one page of
//! principal listing); the exhaust-all-pages enumeration is a provided
//! method so every provider paginates the same way.

use async_trait::async_trait;

use crate::credential::Credential;
use crate::error::ConnectorResult;

/// One page of a principal enumeration.
#[derive(Debug, Clone)]
pub struct PrincipalPage {
    /// Principal names in provider return order.
    pub names: Vec<String>,
    /// Continuation marker; `None` means this is the last page.
    pub next_marker: Option<String>,
}

impl PrincipalPage {
    /// Create a final page with no continuation.
    pub fn new(names: Vec<String>) -> Self {
        Self {
            names,
            next_marker: None,
        }
    }

    /// Set the continuation marker for this page.
    #[must_use]
    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.next_marker = Some(marker.into());
        self
    }
}

/// A cloud identity provider for one remote account type.
///
/// Constructed once per run and injected into the reconciliation engine;
/// holds no per-account state. The [`Credential`] is threaded explicitly
/// through every call.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Assume a cross-account role using the caller's ambient identity.
    ///
    /// Returns a short-lived credential scoped to the target account.
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> ConnectorResult<Credential>;

    /// List one page of principal names in the account the credential is
    /// scoped to. `marker` is the provider's continuation token from the
    /// previous page.
    async fn list_principals_page(
        &self,
        credential: &Credential,
        marker: Option<&str>,
    ) -> ConnectorResult<PrincipalPage>;

    /// List all principal names in the account, transparently following
    /// continuation markers until exhaustion.
    ///
    /// The result is fully materialized, finite, and preserves the
    /// provider's return order. Any page failure aborts the enumeration.
    async fn list_principals(&self, credential: &Credential) -> ConnectorResult<Vec<String>> {
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let page = self
                .list_principals_page(credential, marker.as_deref())
                .await?;
            names.extend(page.names);

            match page.next_marker {
                Some(next) => marker = Some(next),
                None => return Ok(names),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectorError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // Provider that serves a scripted sequence of pages.
    struct PagedProvider {
        pages: Vec<PrincipalPage>,
        calls: AtomicUsize,
    }

    impl PagedProvider {
        fn new(pages: Vec<PrincipalPage>) -> Self {
            Self {
                pages,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for PagedProvider {
        async fn assume_role(
            &self,
            _role_arn: &str,
            _session_name: &str,
        ) -> ConnectorResult<Credential> {
            Ok(Credential::short_lived("AKIA", "secret", "token"))
        }

        async fn list_principals_page(
            &self,
            _credential: &Credential,
            marker: Option<&str>,
        ) -> ConnectorResult<PrincipalPage> {
            let index = match marker {
                None => 0,
                Some(m) => m
                    .parse::<usize>()
                    .map_err(|_| ConnectorError::invalid_parameter("bad marker"))?,
            };
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .get(index)
                .cloned()
                .ok_or_else(|| ConnectorError::remote_api("page out of range"))
        }
    }

    fn page(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    #[tokio::test]
    async fn test_single_page_enumeration() {
        let provider = PagedProvider::new(vec![PrincipalPage::new(page(&["alice", "bob"]))]);
        let cred = Credential::long_lived("AKIA", "secret");
        let names = provider.list_principals(&cred).await.unwrap();
        assert_eq!(names, page(&["alice", "bob"]));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_multi_page_enumeration_concatenates_in_order() {
        let provider = PagedProvider::new(vec![
            PrincipalPage::new(page(&["alice", "bob"])).with_marker("1"),
            PrincipalPage::new(page(&["carol"])).with_marker("2"),
            PrincipalPage::new(page(&["dave"])),
        ]);
        let cred = Credential::long_lived("AKIA", "secret");
        let names = provider.list_principals(&cred).await.unwrap();
        assert_eq!(names, page(&["alice", "bob", "carol", "dave"]));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_page_failure_aborts_enumeration() {
        // Marker points past the scripted pages, so page 2 fails.
        let provider = PagedProvider::new(vec![
            PrincipalPage::new(page(&["alice"])).with_marker("5"),
        ]);
        let cred = Credential::long_lived("AKIA", "secret");
        let err = provider.list_principals(&cred).await.unwrap_err();
        assert_eq!(err.error_code(), "REMOTE_API_ERROR");
    }

    #[tokio::test]
    async fn test_empty_account() {
        let provider = PagedProvider::new(vec![PrincipalPage::new(Vec::new())]);
        let cred = Credential::long_lived("AKIA", "secret");
        let names = provider.list_principals(&cred).await.unwrap();
        assert!(names.is_empty());
    }
}
