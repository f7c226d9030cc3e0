use crate::modules::auth::{exchange_client_credentials, BearerToken, Credential, TOKEN_PATH};
use crate::modules::config::{DeployAction, Identity, RunConfig, REQUEST_TIMEOUT};
use crate::modules::deploy::{
    list_registered_apps, upload_export, EXPORT_CONTENT_TYPE, REGISTERED_APPS_PATH, UPLOAD_PATH,
};
use crate::modules::secret::resolve_credential;
use apexdeploy_oci::ApiKeyConfig;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mockito::{Matcher, Server};
use openssl::rsa::Rsa;
use serde_json::json;

fn base_url(server: &Server) -> String {
    format!("{}/ords/demo/", server.url())
}

fn token(value: &str) -> BearerToken {
    BearerToken::new(value.to_string()).expect("token")
}

fn secret_ocid() -> String {
    format!("ocid1.vaultsecret.oc1.phx.{}", "q".repeat(60))
}

fn api_key_config() -> ApiKeyConfig {
    let rsa = Rsa::generate(2048).expect("rsa");
    ApiKeyConfig {
        tenancy: "ocid1.tenancy.oc1..tenancy".to_string(),
        user: "ocid1.user.oc1..user".to_string(),
        fingerprint: "aa:bb:cc".to_string(),
        region: "us-phoenix-1".to_string(),
        private_key_pem: String::from_utf8(rsa.private_key_to_pem().expect("pem")).expect("utf8"),
        passphrase: None,
    }
}

fn run_config(server: &Server, action: DeployAction) -> RunConfig {
    RunConfig {
        base_url: base_url(server),
        secret_ocid: secret_ocid(),
        identity: Identity::ApiKey(api_key_config()),
        action,
        secrets_endpoint: Some(server.url()),
        allow_insecure: true,
        timeout: REQUEST_TIMEOUT,
    }
}

#[test]
fn credential_authorization_is_text_after_first_separator() {
    let credential = Credential::new("user:secretpart".to_string());
    assert_eq!(credential.authorization().expect("split"), "secretpart");

    let credential = Credential::new("client:Basic abc:def".to_string());
    assert_eq!(credential.authorization().expect("split"), "Basic abc:def");

    let credential = Credential::new("user: x ".to_string());
    assert_eq!(credential.authorization().expect("split"), " x ");

    let credential = Credential::new("user:secretpart\r\n".to_string());
    assert_eq!(credential.authorization().expect("split"), "secretpart");

    assert!(Credential::new("no-separator".to_string())
        .authorization()
        .is_err());
    assert!(Credential::new("user:".to_string()).authorization().is_err());
}

#[test]
fn secrets_are_redacted_in_debug_output() {
    let credential = Credential::new("user:secretpart".to_string());
    assert_eq!(format!("{credential:?}"), "Credential(REDACTED)");
    assert_eq!(format!("{:?}", token("tok123")), "BearerToken(REDACTED)");
}

#[test]
fn bearer_token_must_not_be_empty() {
    assert!(BearerToken::new(String::new()).is_err());
    assert!(BearerToken::new("  ".to_string()).is_err());
}

#[tokio::test]
async fn token_exchange_sends_client_credentials_grant() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", format!("/ords/demo/{TOKEN_PATH}").as_str())
        .match_header("authorization", "secretpart")
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body("grant_type=client_credentials")
        .with_status(200)
        .with_body(json!({"access_token": "tok123", "token_type": "bearer", "expires_in": 3600}).to_string())
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let credential = Credential::new("user:secretpart".to_string());
    let token = exchange_client_credentials(&client, &base_url(&server), &credential)
        .await
        .expect("token");
    mock.assert_async().await;
    assert_eq!(token.as_str(), "tok123");
}

#[tokio::test]
async fn token_exchange_without_separator_sends_nothing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let credential = Credential::new("no-separator".to_string());
    let result = exchange_client_credentials(&client, &base_url(&server), &credential).await;
    assert!(result.is_err());
    mock.assert_async().await;
}

#[tokio::test]
async fn token_exchange_surfaces_oauth_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", format!("/ords/demo/{TOKEN_PATH}").as_str())
        .with_status(401)
        .with_body(
            json!({"error": "invalid_client", "error_description": "bad client secret"})
                .to_string(),
        )
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let credential = Credential::new("user:wrong".to_string());
    let err = exchange_client_credentials(&client, &base_url(&server), &credential)
        .await
        .expect_err("should fail");
    let message = err.to_string();
    assert!(message.contains("401"));
    assert!(message.contains("invalid_client"));
    assert!(message.contains("bad client secret"));
}

#[tokio::test]
async fn token_exchange_requires_access_token() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", format!("/ords/demo/{TOKEN_PATH}").as_str())
        .with_status(200)
        .with_body(json!({"token_type": "bearer"}).to_string())
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let credential = Credential::new("user:secretpart".to_string());
    let err = exchange_client_credentials(&client, &base_url(&server), &credential)
        .await
        .expect_err("should fail");
    assert!(err.to_string().contains("access_token"));
}

#[tokio::test]
async fn list_registered_apps_uses_bearer_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("/ords/demo/{REGISTERED_APPS_PATH}").as_str())
        .match_header("authorization", "Bearer tok123")
        .with_status(200)
        .with_body(json!({"items": [{"application_id": 100, "name": "HR"}]}).to_string())
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let apps = list_registered_apps(&client, &base_url(&server), &token("tok123"))
        .await
        .expect("apps");
    mock.assert_async().await;
    assert_eq!(apps["items"][0]["name"], "HR");
}

#[tokio::test]
async fn upload_streams_file_contents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("myfile.sql");
    let contents = "prompt --application/set_environment\nbegin null; end;\n/\n";
    std::fs::write(&file, contents).expect("write");

    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", format!("/ords/demo/{UPLOAD_PATH}").as_str())
        .match_header("authorization", "Bearer tok123")
        .match_header("content-type", EXPORT_CONTENT_TYPE)
        .match_header("content-length", contents.len().to_string().as_str())
        .match_body(contents)
        .with_status(201)
        .with_body(json!({"status": "installed"}).to_string())
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let report = upload_export(&client, &base_url(&server), &token("tok123"), &file)
        .await
        .expect("upload");
    mock.assert_async().await;
    assert_eq!(report.status.as_u16(), 201);
    assert!(report.body.contains("installed"));
}

#[tokio::test]
async fn upload_missing_file_sends_nothing() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let missing = std::path::Path::new("/definitely/not/here.sql");
    let err = upload_export(&client, &base_url(&server), &token("tok123"), missing)
        .await
        .err()
        .expect("should fail");
    assert!(err.to_string().contains("failed to open"));
    mock.assert_async().await;
}

#[tokio::test]
async fn upload_rejection_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("broken.sql");
    std::fs::write(&file, "garbage").expect("write");

    let mut server = Server::new_async().await;
    server
        .mock("POST", format!("/ords/demo/{UPLOAD_PATH}").as_str())
        .with_status(400)
        .with_body("ORA-20987: invalid export file")
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let err = upload_export(&client, &base_url(&server), &token("tok123"), &file)
        .await
        .err()
        .expect("should fail");
    let message = err.to_string();
    assert!(message.contains("400"));
    assert!(message.contains("ORA-20987"));
}

#[tokio::test]
async fn resolve_credential_signs_with_api_key() {
    let mut server = Server::new_async().await;
    let config = run_config(&server, DeployAction::ListApps);
    let mock = server
        .mock(
            "GET",
            format!("/20190301/secretbundles/{}", config.secret_ocid).as_str(),
        )
        .match_query(Matcher::UrlEncoded("stage".into(), "LATEST".into()))
        .match_header(
            "authorization",
            Matcher::Regex(
                r#"keyId="ocid1\.tenancy\.oc1\.\.tenancy/ocid1\.user\.oc1\.\.user/aa:bb:cc""#
                    .to_string(),
            ),
        )
        .with_status(200)
        .with_body(
            json!({
                "secretId": config.secret_ocid,
                "secretBundleContent": {
                    "contentType": "BASE64",
                    "content": STANDARD.encode("apex_client:secretpart"),
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let credential = resolve_credential(&client, &config).await.expect("credential");
    mock.assert_async().await;
    assert_eq!(credential.authorization().expect("split"), "secretpart");
}

#[tokio::test]
async fn resolve_credential_rejects_plain_text_bundle() {
    let mut server = Server::new_async().await;
    let config = run_config(&server, DeployAction::ListApps);
    server
        .mock("GET", Matcher::Regex("^/20190301/secretbundles/".to_string()))
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({
                "secretId": config.secret_ocid,
                "secretBundleContent": {"contentType": "TEXT", "content": "apex:secret"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let err = resolve_credential(&client, &config)
        .await
        .expect_err("should fail");
    assert!(format!("{err:#}").contains("unsupported secret bundle content type: TEXT"));
}

#[tokio::test]
async fn full_run_uploads_with_vault_token() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("myfile.sql");
    std::fs::write(&file, "select 1 from dual;").expect("write");

    let mut server = Server::new_async().await;
    let config = run_config(&server, DeployAction::Upload { file: file.clone() });
    let secret = server
        .mock(
            "GET",
            format!("/20190301/secretbundles/{}", config.secret_ocid).as_str(),
        )
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({
                "secretId": config.secret_ocid,
                "secretBundleContent": {
                    "contentType": "BASE64",
                    "content": STANDARD.encode("apex_client:Basic c2VjcmV0"),
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let token_mock = server
        .mock("POST", format!("/ords/demo/{TOKEN_PATH}").as_str())
        .match_header("authorization", "Basic c2VjcmV0")
        .match_body("grant_type=client_credentials")
        .with_status(200)
        .with_body(json!({"access_token": "tok123"}).to_string())
        .create_async()
        .await;
    let upload = server
        .mock("POST", format!("/ords/demo/{UPLOAD_PATH}").as_str())
        .match_header("authorization", "Bearer tok123")
        .match_header("content-type", "application/sql")
        .match_body("select 1 from dual;")
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    crate::cli_command::handle_command(config)
        .await
        .expect("run");
    secret.assert_async().await;
    token_mock.assert_async().await;
    upload.assert_async().await;
}
