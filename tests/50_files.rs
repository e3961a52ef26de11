mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn files_require_a_token() -> Result<()> {
    let server = common::spawn_server().await?;

    let res = server.client.get(server.url("/files")).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn refresh_token_cannot_read_files() -> Result<()> {
    let server = common::spawn_server().await?;
    let (_, refresh) = server.login().await?;

    let res = server
        .client
        .get(server.url("/files"))
        .bearer_auth(&refresh)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let body: Value = res.json().await?;
    assert_eq!(body["message"], "Forbidden resource");
    Ok(())
}

#[tokio::test]
async fn access_token_lists_and_shows_files() -> Result<()> {
    let server = common::spawn_server().await?;
    for (name, size) in [("intro.mp3", 300), ("outro.mp3", 100), ("cover.png", 200)] {
        server.state.files.register(name, size).await;
    }
    let (access, _) = server.login().await?;

    let res = server
        .client
        .get(server.url("/files?order=SIZE&direction=ASC&name=mp3"))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await?;
    let names: Vec<&str> = body["results"]
        .as_array()
        .map(|a| a.iter().filter_map(|f| f["name"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["outro.mp3", "intro.mp3"]);
    assert_eq!(body["page"]["total_elements"], 2);
    assert_eq!(body["page"]["total_pages"], 1);
    assert_eq!(body["page"]["size"], 10);

    let id = body["results"][0]["id"].as_str().unwrap_or_default().to_string();
    let res = server
        .client
        .get(server.url(&format!("/files/{}", id)))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let file: Value = res.json().await?;
    assert_eq!(file["name"], "outro.mp3");
    assert_eq!(file["size"], 100);
    Ok(())
}

#[tokio::test]
async fn unknown_file_is_not_found() -> Result<()> {
    let server = common::spawn_server().await?;
    let (access, _) = server.login().await?;

    let res = server
        .client
        .get(server.url("/files/missing"))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: Value = res.json().await?;
    assert_eq!(body["message"], "File was not found by id `missing`");
    Ok(())
}

#[tokio::test]
async fn bad_paging_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let (access, _) = server.login().await?;

    let res = server
        .client
        .get(server.url("/files?size=500"))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["validation_errors"][0]["property"], "size");
    assert_eq!(
        body["validation_errors"][0]["constraints"]["max"],
        "size must not be greater than 50"
    );

    let res = server
        .client
        .get(server.url("/files?order=COLOUR"))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}
