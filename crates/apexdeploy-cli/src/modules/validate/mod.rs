use crate::cli_args::{AuthMode, Cli};

pub(crate) const MIN_URL_LEN: usize = 12;
pub(crate) const MIN_OCID_LEN: usize = 75;
pub(crate) const SECRET_RESOURCE: &str = "secret";

pub(crate) fn validate_url(url: &str, allow_insecure: bool) -> anyhow::Result<()> {
    if url.len() < MIN_URL_LEN {
        anyhow::bail!("double check the URL, it is too short: {url}");
    }
    let rest = if let Some(rest) = url.strip_prefix("https://") {
        rest
    } else if let Some(rest) = url.strip_prefix("http://") {
        if !allow_insecure {
            anyhow::bail!("refusing to use http:// without --insecure: {url}");
        }
        rest
    } else {
        anyhow::bail!("double check the URL, it must start with https://: {url}");
    };
    if !rest.contains('.') {
        anyhow::bail!("double check the URL, it has no domain: {url}");
    }
    Ok(())
}

pub(crate) fn validate_ocid(ocid: &str, resource: &str) -> anyhow::Result<()> {
    if ocid.len() < MIN_OCID_LEN {
        anyhow::bail!(
            "double check the {resource} ocid, expected at least {MIN_OCID_LEN} characters, got {}",
            ocid.len()
        );
    }
    if !ocid.contains("ocid") || !ocid.contains('.') || !ocid.contains(resource) {
        anyhow::bail!("double check the {resource} ocid, it does not look like a {resource} ocid");
    }
    Ok(())
}

pub(crate) fn parse_secret_ocid(value: &str) -> anyhow::Result<String> {
    validate_ocid(value, SECRET_RESOURCE)?;
    Ok(value.to_string())
}

pub(crate) fn ensure_secure_endpoint(name: &str, url: &str, allow_insecure: bool) -> anyhow::Result<()> {
    if url.starts_with("http://") && !allow_insecure {
        anyhow::bail!("refusing to use http:// for {name} without --insecure");
    }
    Ok(())
}

/// Checks that need more than one argument at a time. Runs before any
/// network or file access.
pub(crate) fn validate_cli(cli: &Cli) -> anyhow::Result<()> {
    let target = cli.command.target();
    validate_url(&target.base_url, cli.insecure)?;
    if target.auth.mode() == AuthMode::Environment {
        if let Some(secret_ocid) = cli.identity.env_secret_ocid.as_deref() {
            validate_ocid(secret_ocid, SECRET_RESOURCE)?;
        }
    }
    for (name, value) in [
        ("the secrets endpoint", &cli.endpoints.secrets_endpoint),
        ("the metadata service", &cli.endpoints.metadata_url),
        ("the auth endpoint", &cli.endpoints.auth_endpoint),
    ] {
        if let Some(url) = value {
            ensure_secure_endpoint(name, url, cli.insecure)?;
        }
    }
    Ok(())
}
