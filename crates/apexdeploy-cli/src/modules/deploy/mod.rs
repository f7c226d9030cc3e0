mod actions;
mod http;

pub(crate) use actions::handle_deploy_action;
pub(crate) use http::{list_registered_apps, upload_export};
#[cfg(test)]
pub(crate) use http::{EXPORT_CONTENT_TYPE, REGISTERED_APPS_PATH, UPLOAD_PATH};
