//! Run reports and batch statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cairn_connector::ids::{CloudAccountId, CompanyId};

/// What happened to one enumerated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalOutcome {
    /// A catalog record was created on this run.
    Created,
    /// The principal was already tracked; no write happened.
    AlreadyTracked,
}

impl std::fmt::Display for PrincipalOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrincipalOutcome::Created => write!(f, "created"),
            PrincipalOutcome::AlreadyTracked => write!(f, "already_tracked"),
        }
    }
}

/// Result of reconciling one account.
///
/// `processed` holds every enumerated principal name in enumeration order,
/// created or not; it is the run's result for the account.
#[derive(Debug, Clone, Serialize)]
pub struct AccountReport {
    pub company_id: CompanyId,
    pub account_id: CloudAccountId,
    pub processed: Vec<String>,
    pub created: usize,
    pub skipped: usize,
}

impl AccountReport {
    /// Start an empty report for one account.
    pub fn new(company_id: CompanyId, account_id: CloudAccountId) -> Self {
        Self {
            company_id,
            account_id,
            processed: Vec::new(),
            created: 0,
            skipped: 0,
        }
    }

    /// Record the outcome for one processed principal name.
    pub fn record(&mut self, name: impl Into<String>, outcome: PrincipalOutcome) {
        self.processed.push(name.into());
        match outcome {
            PrincipalOutcome::Created => self.created += 1,
            PrincipalOutcome::AlreadyTracked => self.skipped += 1,
        }
    }

    /// The processed principal names, in enumeration order.
    pub fn principal_names(&self) -> &[String] {
        &self.processed
    }
}

/// Aggregate outcome of one batch run. Log-only; the batch caller gets no
/// structured failure signal beyond this summary's log entry.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub accounts_succeeded: usize,
    pub accounts_failed: usize,
    pub principals_seen: usize,
    pub principals_created: usize,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl BatchSummary {
    /// Start a summary stamped with the current time.
    pub fn start() -> Self {
        Self {
            accounts_succeeded: 0,
            accounts_failed: 0,
            principals_seen: 0,
            principals_created: 0,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Fold one successful account report into the summary.
    pub fn absorb(&mut self, report: &AccountReport) {
        self.accounts_succeeded += 1;
        self.principals_seen += report.processed.len();
        self.principals_created += report.created;
    }

    /// Record one failed account.
    pub fn record_failure(&mut self) {
        self.accounts_failed += 1;
    }

    /// Stamp the summary complete.
    pub fn finish(&mut self) {
        self.completed_at = Some(Utc::now());
    }

    /// Total accounts the batch attempted.
    pub fn accounts_total(&self) -> usize {
        self.accounts_succeeded + self.accounts_failed
    }
}
