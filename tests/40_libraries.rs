mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn libraries_require_a_token() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/libraries")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn refresh_token_cannot_manage_libraries() -> Result<()> {
    let server = common::spawn_server().await?;
    let (_, refresh) = server.login().await?;

    let res = server
        .client
        .get(server.url("/libraries"))
        .bearer_auth(&refresh)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn library_lifecycle() -> Result<()> {
    let server = common::spawn_server().await?;
    let (access, _) = server.login().await?;

    // Create
    let res = server
        .client
        .post(server.url("/libraries"))
        .bearer_auth(&access)
        .json(&json!({ "name": "Music", "path": "/srv/music" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: Value = res.json().await?;
    let id = created["id"].as_str().context("missing id")?.to_string();
    assert_eq!(created["name"], "Music");
    assert_eq!(created["path"], "/srv/music");

    // Duplicate path
    let res = server
        .client
        .post(server.url("/libraries"))
        .bearer_auth(&access)
        .json(&json!({ "name": "Other", "path": "/srv/music" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Path `/srv/music` was not unique.");

    // List
    let res = server
        .client
        .get(server.url("/libraries"))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let list: Value = res.json().await?;
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    // Update
    let res = server
        .client
        .patch(server.url(&format!("/libraries/{}", id)))
        .bearer_auth(&access)
        .json(&json!({ "name": "Tunes" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;
    assert_eq!(updated["name"], "Tunes");
    assert_eq!(updated["path"], "/srv/music");

    // Show
    let res = server
        .client
        .get(server.url(&format!("/libraries/{}", id)))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Delete
    let res = server
        .client
        .delete(server.url(&format!("/libraries/{}", id)))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server
        .client
        .get(server.url(&format!("/libraries/{}", id)))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await?;
    assert_eq!(body["message"], format!("Library was not found by id `{}`", id));
    Ok(())
}

#[tokio::test]
async fn invalid_library_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let (access, _) = server.login().await?;

    let res = server
        .client
        .post(server.url("/libraries"))
        .bearer_auth(&access)
        .json(&json!({ "name": "x", "path": "/srv/music/song.mp3" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: Value = res.json().await?;
    let properties: Vec<&str> = body["validation_errors"]
        .as_array()
        .map(|a| a.iter().filter_map(|e| e["property"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(properties, vec!["name", "path"]);
    Ok(())
}

#[tokio::test]
async fn routes_are_served_under_global_prefix() -> Result<()> {
    let server = common::spawn_server_with(&[("HTTP_GLOBAL_PREFIX", "/api/")]).await?;
    assert!(server.base_url.ends_with("/api"));
    let (access, refresh) = server.login().await?;

    let res = server
        .client
        .get(server.url("/libraries"))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = server
        .client
        .get(server.url("/libraries"))
        .bearer_auth(&refresh)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Nothing is mounted outside the prefix
    let res = server
        .client
        .get(format!("http://127.0.0.1:{}/libraries", server.port))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
