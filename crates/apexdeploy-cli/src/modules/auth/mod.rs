mod http;
pub(crate) mod types;

pub(crate) use http::{auth_headers, exchange_client_credentials};
#[cfg(test)]
pub(crate) use http::TOKEN_PATH;
pub(crate) use types::{BearerToken, Credential, TokenErrorResponse, TokenResponse};
