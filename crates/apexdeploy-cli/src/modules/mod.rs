pub(crate) mod auth;
pub(crate) mod config;
pub(crate) mod deploy;
pub(crate) mod secret;
pub(crate) mod validate;
