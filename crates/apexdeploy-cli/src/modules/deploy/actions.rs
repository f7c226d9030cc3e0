use crate::modules::auth::BearerToken;
use crate::modules::config::{DeployAction, RunConfig};
use crate::modules::deploy::{list_registered_apps, upload_export};

pub(crate) async fn handle_deploy_action(
    client: &reqwest::Client,
    config: &RunConfig,
    token: &BearerToken,
) -> anyhow::Result<()> {
    match &config.action {
        DeployAction::ListApps => {
            let apps = list_registered_apps(client, &config.base_url, token).await?;
            println!("{}", serde_json::to_string_pretty(&apps)?);
        }
        DeployAction::Upload { file } => {
            let report = upload_export(client, &config.base_url, token, file).await?;
            println!("Deployed {}: {}", file.display(), report.status);
            print_body(&report.body)?;
        }
    }
    Ok(())
}

fn print_body(body: &str) -> anyhow::Result<()> {
    let body = body.trim();
    if body.is_empty() {
        return Ok(());
    }
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{body}"),
    }
    Ok(())
}
