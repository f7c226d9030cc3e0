#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]
#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

//! Minimal OCI client used by `apexdeploy`: HTTP request signing for API key
//! and instance principal identities, and the Vault secrets "get secret bundle"
//! call.

pub mod auth;
pub mod error;
pub mod secrets;
pub mod signer;

pub use crate::auth::*;
pub use crate::error::OciError;
pub use crate::secrets::*;
pub use crate::signer::KeyProvider;
