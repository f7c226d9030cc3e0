mod types;

pub(crate) use types::{DeployAction, Identity, RunConfig, REQUEST_TIMEOUT};
