//! cairn worker - reconciles cloud account principals into the catalog.
//!
//! Two invocation modes:
//! - `batch` reconciles every registered account profile; the outcome is
//!   logged only, with per-account failures isolated.
//! - `account` reconciles one account named by the request payload and
//!   prints a JSON response with the processed principal names; any error
//!   fails the whole invocation.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use cairn_catalog::{AccountProfile, CatalogStore, DynamoCatalog};
use cairn_connector::ids::{AccountNumber, CloudAccountId, CompanyId};
use cairn_connector::traits::IdentityProvider;
use cairn_connector_aws::AwsIdentityProvider;
use cairn_reconcile::ReconciliationEngine;

mod config;

use config::WorkerConfig;

/// cairn reconciliation worker
#[derive(Parser)]
#[command(name = "cairn-worker")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every registered account profile (default)
    Batch,
    /// Reconcile a single account
    Account {
        /// Tenant ("company") that owns the account
        #[arg(long)]
        company: String,
        /// Internal account id
        #[arg(long)]
        account: String,
        /// Provider-assigned account number
        #[arg(long)]
        account_number: String,
    },
}

/// Response envelope printed in single-account mode.
#[derive(Debug, Serialize)]
struct InvocationResponse {
    #[serde(rename = "statusCode")]
    status_code: u16,
    body: String,
}

#[tokio::main]
async fn main() {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cairn_reconcile=debug")),
        )
        .init();

    let cli = Cli::parse();

    let config = WorkerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(1);
    });

    // Load AWS configuration and construct the collaborators once; both are
    // injected into the engine rather than created inside it.
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = config.region.clone() {
        loader = loader.region(aws_config::Region::new(region));
    }
    let aws_config = loader.load().await;

    let provider: Arc<dyn IdentityProvider> = Arc::new(AwsIdentityProvider::new(&aws_config));
    let catalog: Arc<dyn CatalogStore> = Arc::new(DynamoCatalog::new(
        aws_sdk_dynamodb::Client::new(&aws_config),
        config.table.clone(),
    ));

    let engine = ReconciliationEngine::new(provider, catalog);

    tracing::info!(table = %config.table, "cairn worker starting");

    match cli.command.unwrap_or(Commands::Batch) {
        Commands::Batch => run_batch(&engine).await,
        Commands::Account {
            company,
            account,
            account_number,
        } => run_single(&engine, company, account, account_number).await,
    }
}

async fn run_batch(engine: &ReconciliationEngine) {
    // Batch mode returns nothing structured; operators read the logs.
    if let Err(e) = engine.run_batch().await {
        eprintln!("Batch reconciliation failed: {e}");
        std::process::exit(1);
    }
}

async fn run_single(
    engine: &ReconciliationEngine,
    company: String,
    account: String,
    account_number: String,
) {
    // The single-account payload carries no role identifier, so credential
    // resolution goes through the stored key pair for the account number.
    let profile = AccountProfile {
        company_id: CompanyId::new(company),
        account_id: CloudAccountId::new(account),
        account_number: AccountNumber::new(account_number),
        role_arn: None,
    };

    // Weaker isolation by design: any error fails the whole invocation.
    let report = engine.reconcile(&profile).await.unwrap_or_else(|e| {
        eprintln!("Reconciliation failed: {e}");
        std::process::exit(1);
    });

    let response = InvocationResponse {
        status_code: 200,
        body: serde_json::to_string(report.principal_names()).unwrap_or_else(|e| {
            eprintln!("Failed to encode response body: {e}");
            std::process::exit(1);
        }),
    };

    match serde_json::to_string(&response) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to encode response: {e}");
            std::process::exit(1);
        }
    }
}
