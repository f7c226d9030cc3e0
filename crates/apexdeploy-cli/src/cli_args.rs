use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::modules::validate::parse_secret_ocid;

#[derive(Parser, Debug)]
#[command(name = "apexdeploy", version)]
#[command(about = "Deploy APEX applications using credentials held in OCI Vault")]
pub struct Cli {
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[arg(long, global = true, help = "Allow http:// and invalid TLS certificates")]
    pub insecure: bool,
    #[command(flatten)]
    pub identity: IdentityArgs,
    #[command(flatten)]
    pub endpoints: EndpointArgs,
    #[command(subcommand)]
    pub command: Command,
}

/// API key identity used with `-e`. Each value falls back to the
/// environment variable of the same purpose.
#[derive(Args, Debug, Default)]
pub struct IdentityArgs {
    #[arg(long, global = true, env = "tenancyOCID")]
    pub tenancy: Option<String>,
    #[arg(long, global = true, env = "userOCID")]
    pub user: Option<String>,
    #[arg(long, global = true, env = "fingerprint")]
    pub fingerprint: Option<String>,
    #[arg(long, global = true, env = "region")]
    pub region: Option<String>,
    #[arg(
        long,
        global = true,
        env = "pem",
        hide_env_values = true,
        allow_hyphen_values = true
    )]
    pub private_key: Option<String>,
    #[arg(long, global = true, env = "OCI_PRIVATE_KEY_FILE")]
    pub private_key_file: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "OCI_PRIVATE_KEY_PASSPHRASE",
        hide_env_values = true
    )]
    pub passphrase: Option<String>,
    #[arg(
        long = "secret-ocid",
        id = "env_secret_ocid",
        global = true,
        env = "secret_ocid"
    )]
    pub env_secret_ocid: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct EndpointArgs {
    #[arg(long, global = true, hide = true, env = "OCI_SECRETS_ENDPOINT")]
    pub secrets_endpoint: Option<String>,
    #[arg(long, global = true, hide = true, env = "OCI_METADATA_URL")]
    pub metadata_url: Option<String>,
    #[arg(long, global = true, hide = true, env = "OCI_AUTH_ENDPOINT")]
    pub auth_endpoint: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(about = "Upload an export file as an application (lists apps when no file is given)")]
    Deploy(DeployArgs),
    #[command(about = "List the registered applications")]
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub struct TargetArgs {
    #[arg(help = "Base URL of the ORDS module, e.g. https://host/ords/workspace/")]
    pub base_url: String,
    #[arg(value_parser = parse_secret_ocid, help = "OCID of the vault secret holding the client credential")]
    pub secret_ocid: String,
    #[command(flatten)]
    pub auth: AuthModeArgs,
}

#[derive(Args, Debug)]
pub struct DeployArgs {
    #[command(flatten)]
    pub target: TargetArgs,
    #[arg(help = "SQL export file to upload")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct AuthModeArgs {
    #[arg(short = 'e', long = "env", help = "Use the API key identity from environment variables")]
    pub env: bool,
    #[arg(
        short = 'i',
        long = "instance-principal",
        help = "Use the instance principal of this host"
    )]
    pub instance_principal: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    Environment,
    InstancePrincipal,
}

impl AuthModeArgs {
    pub fn mode(&self) -> AuthMode {
        if self.instance_principal {
            AuthMode::InstancePrincipal
        } else {
            AuthMode::Environment
        }
    }
}

impl Command {
    pub fn target(&self) -> &TargetArgs {
        match self {
            Self::Deploy(args) => &args.target,
            Self::Export(args) => &args.target,
        }
    }
}
