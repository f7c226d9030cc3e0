use openssl::pkey::{PKey, Private};

use crate::error::OciError;
use crate::signer::KeyProvider;

/// Static API key identity, the same fields an OCI config file profile holds.
#[derive(Clone)]
pub struct ApiKeyConfig {
    pub tenancy: String,
    pub user: String,
    pub fingerprint: String,
    pub region: String,
    pub private_key_pem: String,
    pub passphrase: Option<String>,
}

impl std::fmt::Debug for ApiKeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyConfig")
            .field("tenancy", &self.tenancy)
            .field("user", &self.user)
            .field("fingerprint", &self.fingerprint)
            .field("region", &self.region)
            .field("private_key_pem", &"REDACTED")
            .finish()
    }
}

pub struct ApiKeyProvider {
    key_id: String,
    region: String,
    key: PKey<Private>,
}

impl ApiKeyProvider {
    pub fn new(config: &ApiKeyConfig) -> Result<Self, OciError> {
        for (name, value) in [
            ("tenancy", &config.tenancy),
            ("user", &config.user),
            ("fingerprint", &config.fingerprint),
            ("region", &config.region),
        ] {
            if value.trim().is_empty() {
                return Err(OciError::Config(format!("{name} is empty")));
            }
        }
        let key = load_private_key(&config.private_key_pem, config.passphrase.as_deref())?;
        Ok(Self {
            key_id: format!(
                "{}/{}/{}",
                config.tenancy.trim(),
                config.user.trim(),
                config.fingerprint.trim()
            ),
            region: config.region.trim().to_string(),
            key,
        })
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }
}

impl KeyProvider for ApiKeyProvider {
    fn key_id(&self) -> String {
        self.key_id.clone()
    }

    fn private_key(&self) -> &PKey<Private> {
        &self.key
    }
}

/// Parses a PKCS#1 or PKCS#8 RSA private key. Keys handed over through
/// environment variables often arrive with literal `\n` sequences instead of
/// line breaks, so those are expanded first.
pub fn load_private_key(pem: &str, passphrase: Option<&str>) -> Result<PKey<Private>, OciError> {
    let normalized = if pem.contains("\\n") {
        pem.replace("\\n", "\n")
    } else {
        pem.to_string()
    };
    let normalized = normalized.trim();
    if !normalized.starts_with("-----BEGIN") {
        return Err(OciError::Key("expected a PEM encoded key".to_string()));
    }
    let key = match passphrase {
        Some(passphrase) => {
            PKey::private_key_from_pem_passphrase(normalized.as_bytes(), passphrase.as_bytes())
        }
        None => PKey::private_key_from_pem(normalized.as_bytes()),
    }
    .map_err(|err| OciError::Key(err.to_string()))?;
    if key.rsa().is_err() {
        return Err(OciError::Key("only RSA keys are supported".to_string()));
    }
    Ok(key)
}
