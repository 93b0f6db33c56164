//! Resolved access credentials.
//!
//! A [`Credential`] is scoped to exactly one account for the duration of one
//! reconciliation run. It is produced by a resolver, consumed by the
//! enumerator, and dropped at the end of the run; it is never persisted.

use secrecy::{ExposeSecret, SecretString};

/// A resolved, usable access credential for one remote account.
///
/// Short-lived credentials (from role assumption) carry a session token;
/// long-lived stored key pairs do not.
#[derive(Clone)]
pub struct Credential {
    access_key_id: String,
    secret_access_key: SecretString,
    session_token: Option<SecretString>,
}

impl Credential {
    /// Create a short-lived credential from a role-assumption response.
    pub fn short_lived(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into().into(),
            session_token: Some(session_token.into().into()),
        }
    }

    /// Create a long-lived credential from a stored access key pair.
    pub fn long_lived(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into().into(),
            session_token: None,
        }
    }

    /// The access key id.
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The secret access key.
    pub fn secret_access_key(&self) -> &str {
        self.secret_access_key.expose_secret()
    }

    /// The session token, if this credential is session-scoped.
    pub fn session_token(&self) -> Option<&str> {
        self.session_token
            .as_ref()
            .map(|token| token.expose_secret().as_str())
    }

    /// Whether this credential came from role assumption.
    pub fn is_session_scoped(&self) -> bool {
        self.session_token.is_some()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[REDACTED]")
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_lived_carries_session_token() {
        let cred = Credential::short_lived("AKIA123", "secret", "token");
        assert_eq!(cred.access_key_id(), "AKIA123");
        assert_eq!(cred.secret_access_key(), "secret");
        assert_eq!(cred.session_token(), Some("token"));
        assert!(cred.is_session_scoped());
    }

    #[test]
    fn test_long_lived_has_no_session_token() {
        let cred = Credential::long_lived("AKIA456", "secret");
        assert_eq!(cred.session_token(), None);
        assert!(!cred.is_session_scoped());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let cred = Credential::short_lived("AKIA123", "super-secret", "session-secret");
        let debug = format!("{cred:?}");
        assert!(debug.contains("AKIA123"));
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("session-secret"));
    }
}
