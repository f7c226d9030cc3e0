use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use openssl::hash::MessageDigest;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Padding;
use openssl::sign::Signer;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, DATE, HOST,
};
use reqwest::Method;
use sha2::{Digest, Sha256};
use tracing::debug;
use url::Url;

use crate::error::OciError;

const SIGNATURE_VERSION: &str = "1";
const SIGNATURE_ALGORITHM: &str = "rsa-sha256";
const REQUEST_TARGET: &str = "(request-target)";
const X_CONTENT_SHA256: &str = "x-content-sha256";

/// An identity able to sign OCI API requests.
pub trait KeyProvider: Send + Sync {
    fn key_id(&self) -> String;
    fn private_key(&self) -> &PKey<Private>;
}

/// Headers covered by the signature for a given method. Methods carrying a
/// body also sign its length, type and digest.
pub fn signed_header_names(method: &Method) -> &'static [&'static str] {
    if *method == Method::POST || *method == Method::PUT || *method == Method::PATCH {
        &[
            "date",
            REQUEST_TARGET,
            "host",
            "content-length",
            "content-type",
            X_CONTENT_SHA256,
        ]
    } else {
        &["date", REQUEST_TARGET, "host"]
    }
}

pub fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub fn host_header(url: &Url) -> Result<String, OciError> {
    let host = url
        .host_str()
        .ok_or_else(|| OciError::Config(format!("url has no host: {url}")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

pub fn request_target(method: &Method, url: &Url) -> String {
    let mut target = format!("{} {}", method.as_str().to_lowercase(), url.path());
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    target
}

pub fn content_sha256(body: &[u8]) -> String {
    STANDARD.encode(Sha256::digest(body))
}

/// Builds the newline-joined `name: value` lines that get signed, in the order
/// of `names`. Every name must be present in `headers` or be the request
/// target pseudo-header.
pub fn signing_string(
    names: &[&str],
    target: &str,
    headers: &HeaderMap,
) -> Result<String, OciError> {
    let mut lines = Vec::with_capacity(names.len());
    for name in names {
        if *name == REQUEST_TARGET {
            lines.push(format!("{REQUEST_TARGET}: {target}"));
            continue;
        }
        let value = headers
            .get(*name)
            .ok_or_else(|| OciError::Config(format!("missing header to sign: {name}")))?
            .to_str()
            .map_err(|_| OciError::Config(format!("header {name} is not ascii")))?;
        lines.push(format!("{name}: {value}"));
    }
    Ok(lines.join("\n"))
}

pub fn sign_bytes(key: &PKey<Private>, data: &[u8]) -> Result<Vec<u8>, OciError> {
    let mut signer = Signer::new(MessageDigest::sha256(), key)?;
    signer.set_rsa_padding(Padding::PKCS1)?;
    signer.update(data)?;
    Ok(signer.sign_to_vec()?)
}

/// Produces the full set of headers (`date`, `host`, body headers and
/// `authorization`) for a signed OCI request.
pub fn sign_request(
    provider: &dyn KeyProvider,
    method: &Method,
    url: &Url,
    body: Option<(&[u8], &str)>,
) -> Result<HeaderMap, OciError> {
    sign_request_at(provider, method, url, body, Utc::now())
}

pub(crate) fn sign_request_at(
    provider: &dyn KeyProvider,
    method: &Method,
    url: &Url,
    body: Option<(&[u8], &str)>,
    now: DateTime<Utc>,
) -> Result<HeaderMap, OciError> {
    let mut headers = HeaderMap::new();
    headers.insert(DATE, HeaderValue::from_str(&http_date(now))?);
    headers.insert(HOST, HeaderValue::from_str(&host_header(url)?)?);

    let names = signed_header_names(method);
    if names.contains(&X_CONTENT_SHA256) {
        let empty: &[u8] = &[];
        let (bytes, content_type) = body.unwrap_or((empty, "application/json"));
        headers.insert(CONTENT_LENGTH, HeaderValue::from(bytes.len()));
        headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type)?);
        headers.insert(
            HeaderName::from_static(X_CONTENT_SHA256),
            HeaderValue::from_str(&content_sha256(bytes))?,
        );
    }

    let target = request_target(method, url);
    let plain = signing_string(names, &target, &headers)?;
    let signature = STANDARD.encode(sign_bytes(provider.private_key(), plain.as_bytes())?);
    let authorization = format!(
        "Signature version=\"{SIGNATURE_VERSION}\",keyId=\"{}\",algorithm=\"{SIGNATURE_ALGORITHM}\",headers=\"{}\",signature=\"{signature}\"",
        provider.key_id(),
        names.join(" "),
    );
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&authorization)?);
    debug!(method = %method, target = %target, "signed oci request");
    Ok(headers)
}
