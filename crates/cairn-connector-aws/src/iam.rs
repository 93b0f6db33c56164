//! IAM principal enumeration.

use aws_config::SdkConfig;
use aws_sdk_iam::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_iam::operation::list_users::ListUsersError;
use tracing::debug;

use cairn_connector::credential::Credential;
use cairn_connector::error::{ConnectorError, ConnectorResult};
use cairn_connector::traits::PrincipalPage;

/// Build an IAM client scoped to the resolved credential.
///
/// The credential is materialized only into this in-memory client; nothing
/// is written back anywhere.
pub(crate) fn client_for(base: &SdkConfig, credential: &Credential) -> aws_sdk_iam::Client {
    let credentials = aws_sdk_iam::config::Credentials::new(
        credential.access_key_id(),
        credential.secret_access_key(),
        credential.session_token().map(String::from),
        None,
        "cairn-resolved-credential",
    );

    let config = aws_sdk_iam::config::Builder::from(base)
        .credentials_provider(credentials)
        .build();

    aws_sdk_iam::Client::from_conf(config)
}

/// Fetch one page of IAM user names.
pub(crate) async fn list_users_page(
    client: &aws_sdk_iam::Client,
    marker: Option<&str>,
) -> ConnectorResult<PrincipalPage> {
    let mut request = client.list_users();
    if let Some(marker) = marker {
        request = request.marker(marker);
    }

    let output = request.send().await.map_err(classify_list_users_error)?;

    let names: Vec<String> = output
        .users()
        .iter()
        .map(|user| user.user_name().to_string())
        .collect();

    debug!(users = names.len(), truncated = output.is_truncated(), "listed IAM users page");

    let mut page = PrincipalPage::new(names);
    if output.is_truncated() {
        if let Some(next) = output.marker() {
            page = page.with_marker(next);
        }
    }
    Ok(page)
}

fn classify_list_users_error(err: SdkError<ListUsersError>) -> ConnectorError {
    if let SdkError::ServiceError(ref context) = err {
        let code = context.err().meta().code().unwrap_or("unknown").to_string();
        if code.contains("Throttl") {
            return ConnectorError::throttled(format!("ListUsers throttled ({code})"));
        }
        let message = format!("ListUsers failed ({code})");
        return ConnectorError::remote_api_with_source(message, err);
    }
    ConnectorError::remote_api_with_source("ListUsers call failed", err)
}
