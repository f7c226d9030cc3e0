use std::path::Path;

use anyhow::Context;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use tracing::{debug, info};

use crate::modules::auth::{auth_headers, BearerToken};

pub(crate) const REGISTERED_APPS_PATH: &str = "deploy/registered_apps/";
pub(crate) const UPLOAD_PATH: &str = "deploy/app/0/";
pub(crate) const EXPORT_CONTENT_TYPE: &str = "application/sql";

pub(crate) struct UploadReport {
    pub status: StatusCode,
    pub body: String,
}

pub(crate) async fn list_registered_apps(
    client: &reqwest::Client,
    base_url: &str,
    token: &BearerToken,
) -> anyhow::Result<serde_json::Value> {
    let url = format!("{base_url}{REGISTERED_APPS_PATH}");
    debug!(url = %url, "listing registered apps");
    let response = client
        .get(&url)
        .headers(auth_headers(token)?)
        .send()
        .await
        .with_context(|| format!("request to {url} failed"))?;
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("Registered apps request failed: {status} {body}");
    }
    response
        .json::<serde_json::Value>()
        .await
        .context("registered apps response is not valid JSON")
}

/// Streams `file` as the body of `POST {base_url}deploy/app/0/`. The file is
/// opened before anything is sent; its handle lives in the request body.
pub(crate) async fn upload_export(
    client: &reqwest::Client,
    base_url: &str,
    token: &BearerToken,
    file: &Path,
) -> anyhow::Result<UploadReport> {
    let handle = tokio::fs::File::open(file)
        .await
        .with_context(|| format!("failed to open {}", file.display()))?;
    let length = handle
        .metadata()
        .await
        .with_context(|| format!("failed to read metadata of {}", file.display()))?
        .len();

    let url = format!("{base_url}{UPLOAD_PATH}");
    info!(url = %url, file = %file.display(), bytes = length, "uploading export");
    let response = client
        .post(&url)
        .headers(auth_headers(token)?)
        .header(CONTENT_TYPE, EXPORT_CONTENT_TYPE)
        .header(CONTENT_LENGTH, length)
        .body(reqwest::Body::from(handle))
        .send()
        .await
        .with_context(|| format!("upload to {url} failed"))?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        anyhow::bail!("Upload failed: {status} {body}");
    }
    Ok(UploadReport { status, body })
}
