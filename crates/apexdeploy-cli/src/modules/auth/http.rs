use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use tracing::{debug, info};

use crate::modules::auth::{BearerToken, Credential, TokenErrorResponse, TokenResponse};

pub(crate) const TOKEN_PATH: &str = "oauth/token";
const CLIENT_CREDENTIALS: &str = "client_credentials";

pub(crate) fn auth_headers(token: &BearerToken) -> anyhow::Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

/// OAuth2 client-credentials exchange against `{base_url}oauth/token`.
pub(crate) async fn exchange_client_credentials(
    client: &reqwest::Client,
    base_url: &str,
    credential: &Credential,
) -> anyhow::Result<BearerToken> {
    let url = format!("{base_url}{TOKEN_PATH}");
    let mut authorization = HeaderValue::from_str(credential.authorization()?)
        .context("vault credential is not a valid header value")?;
    authorization.set_sensitive(true);

    debug!(url = %url, "requesting access token");
    let response = client
        .post(&url)
        .header(AUTHORIZATION, authorization)
        .form(&[("grant_type", CLIENT_CREDENTIALS)])
        .send()
        .await
        .with_context(|| format!("token request to {url} failed"))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if let Ok(error) = serde_json::from_str::<TokenErrorResponse>(&body) {
            match error.error_description {
                Some(description) => {
                    anyhow::bail!("Token request failed: {status} {}: {description}", error.error)
                }
                None => anyhow::bail!("Token request failed: {status} {}", error.error),
            }
        }
        anyhow::bail!("Token request failed: {status} {body}");
    }

    let body: TokenResponse = response
        .json()
        .await
        .context("token response is not valid JSON")?;
    let Some(access_token) = body.access_token else {
        anyhow::bail!("token response has no access_token");
    };
    let token = BearerToken::new(access_token)?;
    info!(
        token_type = body.token_type.as_deref().unwrap_or("bearer"),
        expires_in = ?body.expires_in,
        "obtained access token"
    );
    Ok(token)
}
