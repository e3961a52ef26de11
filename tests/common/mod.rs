#![allow(dead_code)]

use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use filebuddy::config::AppConfig;
use filebuddy::AppState;
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const USERNAME: &str = "testUser";
pub const PASSWORD: &str = "testPass1$";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    pub state: AppState,
}

impl TestServer {
    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Logs in with the configured admin credentials.
    pub async fn login(&self) -> Result<(String, String)> {
        let res = self
            .client
            .post(self.url("/auth/token"))
            .json(&json!({ "username": USERNAME, "password": PASSWORD }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body: Value = res.json().await?;
        let access = body["access_token"].as_str().context("missing access_token")?;
        let refresh = body["refresh_token"].as_str().context("missing refresh_token")?;
        Ok((access.to_string(), refresh.to_string()))
    }
}

fn test_env(overrides: &[(&str, &str)]) -> HashMap<String, String> {
    let mut env: HashMap<String, String> = [
        ("APP_ENV", "test"),
        ("SECURITY_ROOT_USERNAME", USERNAME),
        ("SECURITY_ROOT_PASSWORD", PASSWORD),
        ("SECURITY_JWT_ALGORITHM", "HS512"),
        ("SECURITY_JWT_SECRET", "integration-test-secret"),
        ("HTTP_GLOBAL_PREFIX", ""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (k, v) in overrides {
        env.insert(k.to_string(), v.to_string());
    }
    env
}

/// Starts the app in-process on a free port. `base_url` includes the global
/// prefix, so tests address routes by their unprefixed path.
pub async fn spawn_server_with(overrides: &[(&str, &str)]) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let env = test_env(overrides);

    let mut config = AppConfig::from_lookup(|key| env.get(key).cloned())?;
    config.http.port = port;
    let prefix = config.http.global_prefix.clone();

    let state = AppState::from_config(config)?;
    let app = filebuddy::app(state.clone());

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let server = TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}{}", port, prefix),
        client: reqwest::Client::new(),
        state,
    };
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

pub async fn spawn_server() -> Result<TestServer> {
    spawn_server_with(&[]).await
}
