//! HTTP client for a running price grid server.

use anyhow::{anyhow, Context, Result};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use crate::engine::Grid;

#[derive(Debug, Clone)]
pub struct GridClient {
    base_url: String,
    http: reqwest::Client,
}

impl GridClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn fetch(&self) -> Result<Grid> {
        let res = self
            .http
            .get(self.url("/api/prices"))
            .send()
            .await
            .context("failed to reach price grid server")?;
        Self::decode(res).await
    }

    /// Edit one cell, then refetch so the caller sees the server's grid.
    pub async fn set_cell(&self, row: usize, col: usize, value: f64) -> Result<Grid> {
        debug!(row, col, value, "Sending cell update");
        let res = self
            .http
            .post(self.url("/api/prices"))
            .json(&json!({ "row": row, "col": col, "newValue": value }))
            .send()
            .await
            .context("failed to reach price grid server")?;
        Self::decode::<serde_json::Value>(res).await?;
        self.fetch().await
    }

    pub async fn add_column(&self, width: f64) -> Result<Grid> {
        let res = self
            .http
            .post(self.url("/api/add-column"))
            .json(&json!({ "newWidth": width }))
            .send()
            .await
            .context("failed to reach price grid server")?;
        Self::decode(res).await
    }

    pub async fn add_row(&self, height: f64, prices: &[f64]) -> Result<Grid> {
        let res = self
            .http
            .post(self.url("/api/add-row"))
            .json(&json!({ "newHeight": height, "prices": prices }))
            .send()
            .await
            .context("failed to reach price grid server")?;
        Self::decode(res).await
    }

    async fn decode<T: DeserializeOwned>(res: Response) -> Result<T> {
        let status = res.status();
        if status.is_success() {
            return res.json::<T>().await.context("unexpected response body");
        }
        Err(anyhow!("{}", Self::failure_message(status, res).await))
    }

    async fn failure_message(status: StatusCode, res: Response) -> String {
        let detail = res
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
        match detail {
            Some(msg) => format!("Error {}: {}", status.as_u16(), msg),
            None => format!("Error {}", status),
        }
    }
}
