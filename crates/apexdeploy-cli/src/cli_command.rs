use anyhow::Context;
use tracing::info;

use crate::modules::auth::exchange_client_credentials;
use crate::modules::config::RunConfig;
use crate::modules::deploy::handle_deploy_action;
use crate::modules::secret::resolve_credential;

/// Vault secret, then access token, then the deployment call.
pub(crate) async fn handle_command(config: RunConfig) -> anyhow::Result<()> {
    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .danger_accept_invalid_certs(config.allow_insecure)
        .build()
        .context("failed to build HTTP client")?;

    let credential = resolve_credential(&client, &config).await?;
    info!("vault secret retrieved");
    let token = exchange_client_credentials(&client, &config.base_url, &credential).await?;
    drop(credential);

    handle_deploy_action(&client, &config, &token).await
}
