#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{RequestBuilder, Response};
use serde_json::{json, Value};

use edu_erp_api::app::{app, AppState};
use edu_erp_api::config::TenantConfig;
use edu_erp_api::database::MemoryStore;

/// One server per test, each on its own in-memory store.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_tenant(TenantConfig::default()).await
    }

    pub async fn spawn_with_tenant(tenant: TenantConfig) -> Result<Self> {
        let state = AppState::new(Arc::new(MemoryStore::new()), &tenant);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind ephemeral port")?;
        let addr: SocketAddr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, app(state)).await.ok();
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.client.put(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Creates an active organization and returns its id.
    pub async fn create_org(&self, code: &str) -> Result<i64> {
        let res = self
            .post("/api/v1/organizations")
            .json(&json!({ "name": format!("{} Academy", code), "code": code }))
            .send()
            .await?;
        let body = expect_status(res, 201).await?;
        body["data"]["id"].as_i64().context("organization id missing")
    }

    /// Creates a user inside `org` and returns its id.
    pub async fn create_user(&self, org: i64, email: &str, role: &str) -> Result<i64> {
        let res = self
            .post("/api/v1/users")
            .header("X-Tenant-ID", org.to_string())
            .json(&json!({ "email": email, "full_name": "Test User", "role": role }))
            .send()
            .await?;
        let body = expect_status(res, 201).await?;
        body["data"]["id"].as_i64().context("user id missing")
    }
}

/// Asserts the status and returns the JSON body.
pub async fn expect_status(res: Response, status: u16) -> Result<Value> {
    let actual = res.status().as_u16();
    let body = res.json::<Value>().await.unwrap_or(Value::Null);
    anyhow::ensure!(actual == status, "expected HTTP {}, got {}: {}", status, actual, body);
    Ok(body)
}
