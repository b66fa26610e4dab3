//! HTTP transport seam for the EcoBazaar backend.
//!
//! [`HttpClient`] lets services swap the transport (auth wrappers, stubs
//! in tests) without touching request construction.

pub mod auth;

use anyhow::{Result, bail};
use async_trait::async_trait;
use reqwest::{Method, Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// Plain [`reqwest`] client with no request decoration.
pub struct BasicClient(reqwest::Client);

impl BasicClient {
    pub fn new() -> Self {
        Self(reqwest::Client::new())
    }

    /// Client with explicit request and connect timeouts, for backends
    /// that may hang.
    pub fn with_timeouts(timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;
        Ok(Self(client))
    }
}

#[async_trait]
impl HttpClient for BasicClient {
    async fn execute(&self, req: Request) -> reqwest::Result<Response> {
        self.0.execute(req).await
    }
}

/// Fetches `url` and deserializes the JSON response body.
///
/// Non-2xx statuses become errors carrying the response body.
pub async fn fetch_json<C: HttpClient, T: DeserializeOwned>(client: &C, url: &str) -> Result<T> {
    let req = Request::new(Method::GET, url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("GET {url} returned {status}: {body}");
    }

    Ok(resp.json::<T>().await?)
}

/// Sends an empty-bodied POST and returns the status with the raw body,
/// leaving status interpretation to the caller.
pub async fn post_for_status<C: HttpClient>(client: &C, url: &str) -> Result<(StatusCode, String)> {
    let req = Request::new(Method::POST, url.parse()?);

    let resp = client.execute(req).await?;
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();

    Ok((status, body))
}
