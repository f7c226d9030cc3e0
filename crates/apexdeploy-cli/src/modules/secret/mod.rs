use anyhow::Context;
use apexdeploy_oci::{
    secrets_endpoint_for_region, ApiKeyProvider, InstancePrincipalProvider, KeyProvider,
    SecretsClient,
};
use tracing::info;

use crate::modules::auth::Credential;
use crate::modules::config::{Identity, RunConfig};

/// Reads the latest version of the deployment credential from OCI Vault.
pub(crate) async fn resolve_credential(
    client: &reqwest::Client,
    config: &RunConfig,
) -> anyhow::Result<Credential> {
    let (signer, region): (Box<dyn KeyProvider>, String) = match &config.identity {
        Identity::ApiKey(api_key) => {
            let provider =
                ApiKeyProvider::new(api_key).context("invalid local API key identity")?;
            let region = provider.region().to_string();
            (Box::new(provider), region)
        }
        Identity::InstancePrincipal(endpoints) => {
            let provider = InstancePrincipalProvider::fetch(client, endpoints)
                .await
                .context("failed to obtain the instance principal identity")?;
            let region = provider.region().to_string();
            (Box::new(provider), region)
        }
    };

    let endpoint = config
        .secrets_endpoint
        .clone()
        .unwrap_or_else(|| secrets_endpoint_for_region(&region));
    info!(region = %region, "connecting to OCI and reading the vault secret");
    let secrets = SecretsClient::new(client.clone(), endpoint, signer);
    let bundle = secrets
        .get_secret_bundle(&config.secret_ocid)
        .await
        .context("failed to read the vault secret")?;
    let value = bundle
        .decode_text()
        .context("vault secret is not a usable credential")?;
    Ok(Credential::new(value))
}
