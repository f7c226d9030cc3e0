use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::X509;
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{service_error, OciError};
use crate::signer::{sign_request, KeyProvider};

pub const DEFAULT_METADATA_URL: &str = "http://169.254.169.254/opc/v2";
const METADATA_AUTHORIZATION: &str = "Bearer Oracle";
const SESSION_KEY_BITS: u32 = 2048;
const TENANT_PREFIX: &str = "opc-tenant:";
const IDENTITY_PREFIX: &str = "opc-identity:";

#[derive(Clone, Debug)]
pub struct InstancePrincipalEndpoints {
    /// Base of the instance metadata service, `/opc/v2` included.
    pub metadata_url: String,
    /// Federation endpoint; derived from the instance region when unset.
    pub auth_endpoint: Option<String>,
}

impl Default for InstancePrincipalEndpoints {
    fn default() -> Self {
        Self {
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            auth_endpoint: None,
        }
    }
}

/// Session identity obtained by federating the host's platform certificate.
pub struct InstancePrincipalProvider {
    region: String,
    token: String,
    session_key: PKey<Private>,
}

struct FederationSigner<'a> {
    key_id: String,
    key: &'a PKey<Private>,
}

impl KeyProvider for FederationSigner<'_> {
    fn key_id(&self) -> String {
        self.key_id.clone()
    }

    fn private_key(&self) -> &PKey<Private> {
        self.key
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct X509FederationRequest {
    certificate: String,
    public_key: String,
    intermediate_certificates: Vec<String>,
    purpose: &'static str,
    fingerprint_algorithm: &'static str,
}

#[derive(Deserialize)]
struct X509FederationResponse {
    token: String,
}

impl InstancePrincipalProvider {
    pub async fn fetch(
        client: &reqwest::Client,
        endpoints: &InstancePrincipalEndpoints,
    ) -> Result<Self, OciError> {
        let base = endpoints.metadata_url.trim_end_matches('/');
        let leaf_pem = fetch_metadata(client, &format!("{base}/identity/cert.pem")).await?;
        let leaf_key_pem = fetch_metadata(client, &format!("{base}/identity/key.pem")).await?;
        let intermediate_pem =
            fetch_metadata(client, &format!("{base}/identity/intermediate.pem")).await?;
        let region = fetch_metadata(client, &format!("{base}/instance/canonicalRegionName"))
            .await?
            .trim()
            .to_string();
        if region.is_empty() {
            return Err(OciError::Config(
                "instance metadata returned an empty region".to_string(),
            ));
        }

        let leaf = X509::from_pem(leaf_pem.as_bytes())
            .map_err(|err| OciError::Certificate(err.to_string()))?;
        let intermediate = X509::from_pem(intermediate_pem.as_bytes())
            .map_err(|err| OciError::Certificate(err.to_string()))?;
        let leaf_key = PKey::private_key_from_pem(leaf_key_pem.as_bytes())
            .map_err(|err| OciError::Key(err.to_string()))?;
        let tenancy = tenancy_from_cert(&leaf)?;
        debug!(region = %region, tenancy = %tenancy, "loaded instance identity");

        let session_key = PKey::from_rsa(Rsa::generate(SESSION_KEY_BITS)?)?;
        let payload = X509FederationRequest {
            certificate: STANDARD.encode(leaf.to_der()?),
            public_key: STANDARD.encode(session_key.public_key_to_der()?),
            intermediate_certificates: vec![STANDARD.encode(intermediate.to_der()?)],
            purpose: "DEFAULT",
            fingerprint_algorithm: "SHA256",
        };
        let body = serde_json::to_vec(&payload)?;

        let auth_base = endpoints
            .auth_endpoint
            .clone()
            .unwrap_or_else(|| format!("https://auth.{region}.oraclecloud.com"));
        let url = Url::parse(&format!("{}/v1/x509", auth_base.trim_end_matches('/')))?;
        let signer = FederationSigner {
            key_id: format!("{tenancy}/fed-x509-sha256/{}", cert_fingerprint(&leaf)?),
            key: &leaf_key,
        };
        let headers = sign_request(
            &signer,
            &Method::POST,
            &url,
            Some((body.as_slice(), "application/json")),
        )?;
        let response = client
            .post(url.clone())
            .headers(headers)
            .body(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(service_error("federation", response).await);
        }
        let federation: X509FederationResponse = response.json().await?;
        if federation.token.trim().is_empty() {
            return Err(OciError::Config(
                "federation returned an empty security token".to_string(),
            ));
        }
        info!(region = %region, "obtained instance principal session token");

        Ok(Self {
            region,
            token: federation.token,
            session_key,
        })
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }
}

impl KeyProvider for InstancePrincipalProvider {
    fn key_id(&self) -> String {
        format!("ST${}", self.token)
    }

    fn private_key(&self) -> &PKey<Private> {
        &self.session_key
    }
}

async fn fetch_metadata(client: &reqwest::Client, url: &str) -> Result<String, OciError> {
    let response = client
        .get(url)
        .header(AUTHORIZATION, METADATA_AUTHORIZATION)
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(service_error("instance metadata", response).await);
    }
    Ok(response.text().await?)
}

/// Reads the tenancy OCID from the certificate subject's OU entries.
pub fn tenancy_from_cert(cert: &X509) -> Result<String, OciError> {
    let mut identity = None;
    for entry in cert
        .subject_name()
        .entries_by_nid(Nid::ORGANIZATIONALUNITNAME)
    {
        let value = entry.data().as_utf8()?.to_string();
        if let Some(tenancy) = value.strip_prefix(TENANT_PREFIX) {
            return Ok(tenancy.to_string());
        }
        if let Some(tenancy) = value.strip_prefix(IDENTITY_PREFIX) {
            identity.get_or_insert_with(|| tenancy.to_string());
        }
    }
    identity.ok_or_else(|| {
        OciError::Certificate("certificate subject has no tenancy identifier".to_string())
    })
}

/// Uppercase, colon separated SHA-256 digest of the DER certificate.
pub fn cert_fingerprint(cert: &X509) -> Result<String, OciError> {
    let digest = cert.digest(MessageDigest::sha256())?;
    Ok(digest
        .iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<Vec<_>>()
        .join(":"))
}
