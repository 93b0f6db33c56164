//! STS role assumption.

use aws_sdk_sts::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_sts::operation::assume_role::AssumeRoleError;
use tracing::debug;

use cairn_connector::credential::Credential;
use cairn_connector::error::{ConnectorError, ConnectorResult};

/// Assume a cross-account role and map the returned credential triple.
pub(crate) async fn assume_role(
    client: &aws_sdk_sts::Client,
    role_arn: &str,
    session_name: &str,
) -> ConnectorResult<Credential> {
    if role_arn.is_empty() {
        return Err(ConnectorError::invalid_parameter("empty role arn"));
    }

    let output = client
        .assume_role()
        .role_arn(role_arn)
        .role_session_name(session_name)
        .send()
        .await
        .map_err(classify_assume_role_error)?;

    let credentials = output
        .credentials()
        .ok_or_else(|| ConnectorError::remote_api("AssumeRole response carried no credentials"))?;

    debug!(role_arn, session_name, "assumed cross-account role");

    Ok(Credential::short_lived(
        credentials.access_key_id(),
        credentials.secret_access_key(),
        credentials.session_token(),
    ))
}

fn classify_assume_role_error(err: SdkError<AssumeRoleError>) -> ConnectorError {
    if let SdkError::ServiceError(ref context) = err {
        let code = context.err().meta().code().unwrap_or("unknown").to_string();
        if code.contains("Throttl") {
            return ConnectorError::throttled(format!("AssumeRole throttled ({code})"));
        }
        let message = format!("AssumeRole rejected ({code})");
        return ConnectorError::credential_denied_with_source(message, err);
    }
    ConnectorError::credential_denied_with_source("AssumeRole call failed", err)
}
