mod api_key;
mod instance_principal;

pub use api_key::{load_private_key, ApiKeyConfig, ApiKeyProvider};
pub use instance_principal::{
    cert_fingerprint, tenancy_from_cert, InstancePrincipalEndpoints, InstancePrincipalProvider,
    DEFAULT_METADATA_URL,
};
