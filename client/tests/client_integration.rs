#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use client::EnvironmentClient;
use mockito::{self, Matcher};
use serde_json::json;
use shared_types::{Environment, Metadata};

#[tokio::test]
async fn test_health_check() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"status":"healthy"}"#)
        .create();

    let client = EnvironmentClient::new(server.url()).unwrap();
    assert!(client.health_check().await.unwrap());
}

#[tokio::test]
async fn test_list() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/environments")
        .with_status(200)
        .with_body(
            r#"[
                {"metadata": {"name": "python", "uid": "v2"}, "runContainerImageUrl": "py"},
                {"metadata": {"name": "go", "uid": "v1"}}
            ]"#,
        )
        .create();

    let client = EnvironmentClient::new(server.url()).unwrap();
    let envs = client.list().await.unwrap();

    assert_eq!(envs.len(), 2);
    assert_eq!(envs[0].metadata, Metadata::new("python", "v2"));
    assert_eq!(envs[0].spec["runContainerImageUrl"], "py");
    assert_eq!(envs[1].name(), "go");
}

#[tokio::test]
async fn test_create() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("POST", "/environments")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "metadata": {"name": "python"},
            "runContainerImageUrl": "fission/python-env"
        })))
        .with_status(201)
        .with_body(r#"{"name": "python", "uid": "v1"}"#)
        .create();

    let client = EnvironmentClient::new(server.url()).unwrap();
    let env = Environment::new("python")
        .with_field("runContainerImageUrl", json!("fission/python-env"));
    let meta = client.create(&env).await.unwrap();

    assert_eq!(meta, Metadata::new("python", "v1"));
}

#[tokio::test]
async fn test_create_conflict() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("POST", "/environments")
        .with_status(409)
        .with_body(
            r#"{"error": "Already Exists", "details": "Environment already exists: python"}"#,
        )
        .create();

    let client = EnvironmentClient::new(server.url()).unwrap();
    let err = client
        .create(&Environment::new("python"))
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("409"));
    assert!(message.contains("Already Exists"));
}

#[tokio::test]
async fn test_get_latest() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/environments/python")
        .match_query(Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"metadata": {"name": "python", "uid": "v3"}}"#)
        .create();

    let client = EnvironmentClient::new(server.url()).unwrap();
    let env = client.get("python", None).await.unwrap();
    assert_eq!(env.metadata.uid, "v3");

    // An empty uid is the same as none
    let env = client.get("python", Some("")).await.unwrap();
    assert_eq!(env.metadata.uid, "v3");
}

#[tokio::test]
async fn test_get_pinned_version() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/environments/python")
        .match_query(Matcher::UrlEncoded("uid".into(), "v1".into()))
        .with_status(200)
        .with_body(r#"{"metadata": {"name": "python", "uid": "v1"}}"#)
        .create();

    let client = EnvironmentClient::new(server.url()).unwrap();
    let env = client.get("python", Some("v1")).await.unwrap();
    assert_eq!(env.metadata, Metadata::new("python", "v1"));
}

#[tokio::test]
async fn test_get_not_found() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/environments/missing")
        .with_status(404)
        .with_body(r#"{"error": "Not Found", "details": "Environment not found: missing"}"#)
        .create();

    let client = EnvironmentClient::new(server.url()).unwrap();
    let err = client.get("missing", None).await.unwrap_err();
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_update() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("PUT", "/environments/python")
        .match_body(Matcher::Json(json!({"metadata": {"name": "python"}})))
        .with_status(200)
        .with_body(r#"{"name": "python", "uid": "v2"}"#)
        .create();

    let client = EnvironmentClient::new(server.url()).unwrap();
    let meta = client.update(&Environment::new("python")).await.unwrap();
    assert_eq!(meta.uid, "v2");
}

#[tokio::test]
async fn test_delete_all_versions() {
    let mut server = mockito::Server::new_async().await;

    let m = server
        .mock("DELETE", "/environments/python")
        .match_query(Matcher::Missing)
        .with_status(200)
        .create();

    let client = EnvironmentClient::new(server.url()).unwrap();
    client.delete("python", None).await.unwrap();
    m.assert();
}

#[tokio::test]
async fn test_delete_one_version() {
    let mut server = mockito::Server::new_async().await;

    let m = server
        .mock("DELETE", "/environments/python")
        .match_query(Matcher::UrlEncoded("uid".into(), "v2".into()))
        .with_status(200)
        .create();

    let client = EnvironmentClient::new(server.url()).unwrap();
    client.delete("python", Some("v2")).await.unwrap();
    m.assert();
}

#[tokio::test]
async fn test_delete_rejects_empty_uid() {
    let mut server = mockito::Server::new_async().await;

    let m = server.mock("DELETE", Matcher::Any).expect(0).create();

    let client = EnvironmentClient::new(server.url()).unwrap();
    let err = client.delete("python", Some("")).await.unwrap_err();
    assert!(err.to_string().contains("Empty uid"));
    m.assert();
}

#[tokio::test]
async fn test_server_error_without_json_body() {
    let mut server = mockito::Server::new_async().await;

    let _m = server
        .mock("GET", "/environments")
        .with_status(502)
        .with_body("bad gateway")
        .create();

    let client = EnvironmentClient::new(server.url()).unwrap();
    let err = client.list().await.unwrap_err();
    assert!(err.to_string().contains("bad gateway"));
}
