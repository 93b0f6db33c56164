//! The AWS identity provider.

use async_trait::async_trait;
use aws_config::SdkConfig;

use cairn_connector::credential::Credential;
use cairn_connector::error::ConnectorResult;
use cairn_connector::traits::{IdentityProvider, PrincipalPage};

use crate::{iam, sts};

/// Identity provider backed by AWS STS and IAM.
///
/// Constructed once per run from loaded AWS configuration and injected
/// into the reconciliation engine. The base configuration supplies region
/// and the caller's ambient identity for role assumption.
#[derive(Debug, Clone)]
pub struct AwsIdentityProvider {
    sts: aws_sdk_sts::Client,
    base_config: SdkConfig,
}

impl AwsIdentityProvider {
    /// Create a provider from loaded AWS configuration.
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            sts: aws_sdk_sts::Client::new(config),
            base_config: config.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for AwsIdentityProvider {
    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> ConnectorResult<Credential> {
        sts::assume_role(&self.sts, role_arn, session_name).await
    }

    async fn list_principals_page(
        &self,
        credential: &Credential,
        marker: Option<&str>,
    ) -> ConnectorResult<PrincipalPage> {
        let client = iam::client_for(&self.base_config, credential);
        iam::list_users_page(&client, marker).await
    }
}
