use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// `<client>:<secret>` pair read from the vault.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct Credential(String);

impl Credential {
    pub(crate) fn new(value: String) -> Self {
        Self(value)
    }

    /// Value sent as the token request's `Authorization` header: everything
    /// after the first `:`, minus a trailing line ending.
    pub(crate) fn authorization(&self) -> anyhow::Result<&str> {
        let Some((_, secret)) = self.0.split_once(':') else {
            anyhow::bail!("vault credential is not in <client>:<secret> form");
        };
        let secret = secret.trim_end_matches(['\r', '\n']);
        if secret.trim().is_empty() {
            anyhow::bail!("vault credential has an empty secret part");
        }
        Ok(secret)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(REDACTED)")
    }
}

#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct BearerToken(String);

impl BearerToken {
    pub(crate) fn new(value: String) -> anyhow::Result<Self> {
        if value.trim().is_empty() {
            anyhow::bail!("access token is empty");
        }
        Ok(Self(value))
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BearerToken(REDACTED)")
    }
}

#[derive(Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Deserialize)]
pub(crate) struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}
