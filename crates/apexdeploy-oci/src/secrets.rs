use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::error::{service_error, OciError};
use crate::signer::{sign_request, KeyProvider};

const SECRETS_API_VERSION: &str = "20190301";
const BASE64_CONTENT_TYPE: &str = "BASE64";
const LATEST_STAGE: &str = "LATEST";

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SecretBundle {
    pub secret_id: String,
    #[serde(default)]
    pub version_number: Option<i64>,
    #[serde(default)]
    pub stages: Vec<String>,
    pub secret_bundle_content: Option<SecretBundleContent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretBundleContent {
    pub content_type: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl std::fmt::Debug for SecretBundleContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretBundleContent")
            .field("content_type", &self.content_type)
            .field("content", &self.content.as_ref().map(|_| "REDACTED"))
            .finish()
    }
}

impl SecretBundle {
    /// Decodes the base64 bundle content into raw bytes.
    pub fn decode_content(&self) -> Result<Vec<u8>, OciError> {
        let content = self
            .secret_bundle_content
            .as_ref()
            .ok_or(OciError::MissingContent)?;
        if content.content_type != BASE64_CONTENT_TYPE {
            return Err(OciError::UnsupportedContent(content.content_type.clone()));
        }
        let encoded = content.content.as_deref().ok_or(OciError::MissingContent)?;
        Ok(STANDARD.decode(encoded.trim())?)
    }

    pub fn decode_text(&self) -> Result<String, OciError> {
        Ok(String::from_utf8(self.decode_content()?)?)
    }
}

pub fn secrets_endpoint_for_region(region: &str) -> String {
    format!("https://secrets.vaults.{region}.oci.oraclecloud.com")
}

/// Client for the OCI Vault secret retrieval API.
pub struct SecretsClient {
    http: reqwest::Client,
    endpoint: String,
    signer: Box<dyn KeyProvider>,
}

impl SecretsClient {
    pub fn new(http: reqwest::Client, endpoint: String, signer: Box<dyn KeyProvider>) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            signer,
        }
    }

    /// Fetches the bundle currently in the `LATEST` stage.
    pub async fn get_secret_bundle(&self, secret_id: &str) -> Result<SecretBundle, OciError> {
        let mut url = Url::parse(&self.endpoint)?;
        url.path_segments_mut()
            .map_err(|()| {
                OciError::Config(format!("invalid secrets endpoint: {}", self.endpoint))
            })?
            .pop_if_empty()
            .extend([SECRETS_API_VERSION, "secretbundles", secret_id]);
        url.query_pairs_mut().append_pair("stage", LATEST_STAGE);

        let headers = sign_request(self.signer.as_ref(), &Method::GET, &url, None)?;
        debug!(stage = LATEST_STAGE, "requesting secret bundle");
        let response = self.http.get(url).headers(headers).send().await?;
        if !response.status().is_success() {
            return Err(service_error("secrets", response).await);
        }
        let bundle: SecretBundle = response.json().await?;
        info!(
            version = ?bundle.version_number,
            stages = ?bundle.stages,
            "retrieved secret bundle"
        );
        Ok(bundle)
    }
}
