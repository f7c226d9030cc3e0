#[derive(thiserror::Error, Debug)]
pub enum OciError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{service} returned {status}: {code} {message}")]
    Service {
        service: &'static str,
        status: u16,
        code: String,
        message: String,
    },
    #[error("crypto error: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),
    #[error("invalid private key: {0}")]
    Key(String),
    #[error("invalid certificate: {0}")]
    Certificate(String),
    #[error("unsupported secret bundle content type: {0} (expected BASE64)")]
    UnsupportedContent(String),
    #[error("secret bundle has no content")]
    MissingContent,
    #[error("invalid base64 secret content: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("secret content is not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("invalid header value: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[derive(serde::Deserialize, Default)]
struct ServiceErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Turns a non-success OCI response into [`OciError::Service`], keeping the
/// `code`/`message` pair OCI services return when the body has one.
pub(crate) async fn service_error(service: &'static str, response: reqwest::Response) -> OciError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<ServiceErrorBody>(&body).unwrap_or_default();
    let (code, message) = if parsed.code.is_empty() && parsed.message.is_empty() {
        ("Unknown".to_string(), body)
    } else {
        (parsed.code, parsed.message)
    };
    OciError::Service {
        service,
        status,
        code,
        message,
    }
}
