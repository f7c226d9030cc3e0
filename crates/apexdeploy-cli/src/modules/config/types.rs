use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use apexdeploy_oci::{ApiKeyConfig, InstancePrincipalEndpoints, DEFAULT_METADATA_URL};
use tracing::warn;

use crate::cli_args::{AuthMode, Cli, Command, IdentityArgs};

pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub(crate) enum Identity {
    ApiKey(ApiKeyConfig),
    InstancePrincipal(InstancePrincipalEndpoints),
}

#[derive(Debug)]
pub(crate) enum DeployAction {
    ListApps,
    Upload { file: PathBuf },
}

/// Everything a run needs, resolved once from arguments and environment.
#[derive(Debug)]
pub(crate) struct RunConfig {
    pub base_url: String,
    pub secret_ocid: String,
    pub identity: Identity,
    pub action: DeployAction,
    pub secrets_endpoint: Option<String>,
    pub allow_insecure: bool,
    pub timeout: Duration,
}

impl RunConfig {
    pub(crate) fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let Cli {
            insecure,
            identity: identity_args,
            endpoints,
            command,
            ..
        } = cli;

        let (target, file) = match command {
            Command::Deploy(args) => (args.target, args.file),
            Command::Export(args) => (args.target, None),
        };
        let mode = target.auth.mode();

        let action = match file {
            Some(file) => {
                if !file.is_file() {
                    anyhow::bail!("upload file not found: {}", file.display());
                }
                DeployAction::Upload { file }
            }
            None => DeployAction::ListApps,
        };

        let mut secret_ocid = target.secret_ocid;
        let identity = match mode {
            AuthMode::Environment => {
                if let Some(env_ocid) = identity_args.env_secret_ocid.clone() {
                    if env_ocid != secret_ocid {
                        warn!("secret_ocid from the environment overrides the command line secret");
                    }
                    secret_ocid = env_ocid;
                }
                Identity::ApiKey(api_key_config(identity_args)?)
            }
            AuthMode::InstancePrincipal => Identity::InstancePrincipal(InstancePrincipalEndpoints {
                metadata_url: endpoints
                    .metadata_url
                    .unwrap_or_else(|| DEFAULT_METADATA_URL.to_string()),
                auth_endpoint: endpoints.auth_endpoint,
            }),
        };

        Ok(Self {
            base_url: normalize_base_url(&target.base_url),
            secret_ocid,
            identity,
            action,
            secrets_endpoint: endpoints.secrets_endpoint,
            allow_insecure: insecure,
            timeout: REQUEST_TIMEOUT,
        })
    }
}

pub(crate) fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn api_key_config(args: IdentityArgs) -> anyhow::Result<ApiKeyConfig> {
    fn present(value: Option<String>) -> Option<String> {
        value.filter(|value| !value.trim().is_empty())
    }

    let tenancy = present(args.tenancy);
    let user = present(args.user);
    let fingerprint = present(args.fingerprint);
    let region = present(args.region);
    let private_key_pem = match (present(args.private_key), args.private_key_file) {
        (Some(pem), _) => Some(pem),
        (None, Some(path)) => Some(
            std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read private key {}", path.display()))?,
        ),
        (None, None) => None,
    };

    let mut missing = Vec::new();
    if tenancy.is_none() {
        missing.push("tenancyOCID (--tenancy)");
    }
    if user.is_none() {
        missing.push("userOCID (--user)");
    }
    if fingerprint.is_none() {
        missing.push("fingerprint (--fingerprint)");
    }
    if region.is_none() {
        missing.push("region (--region)");
    }
    if private_key_pem.is_none() {
        missing.push("pem (--private-key) or OCI_PRIVATE_KEY_FILE");
    }
    match (tenancy, user, fingerprint, region, private_key_pem) {
        (Some(tenancy), Some(user), Some(fingerprint), Some(region), Some(private_key_pem)) => {
            Ok(ApiKeyConfig {
                tenancy,
                user,
                fingerprint,
                region,
                private_key_pem,
                passphrase: present(args.passphrase),
            })
        }
        _ => anyhow::bail!(
            "-e needs the local API key identity, missing: {}",
            missing.join(", ")
        ),
    }
}
