//! Sync local history with a webtools server (`/api/history`).

use anyhow::{anyhow, Context};
use serde::Deserialize;
use webtools_common::{ApiResponse, HistoryItem, StorageKey, ToolHistory};

#[derive(Debug, Deserialize)]
struct HistoryPage {
    history: Vec<ToolHistory>,
}

#[derive(Debug, Deserialize)]
struct Saved {}

pub struct RemoteHistory {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteHistory {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Upload `items` oldest first so the server's ordering matches.
    /// Returns how many were stored.
    pub async fn push(&self, key: StorageKey, items: &[HistoryItem]) -> anyhow::Result<usize> {
        let url = format!("{}/api/history", self.base_url);
        let mut pushed = 0;
        for item in items.iter().rev() {
            let resp = self
                .client
                .post(&url)
                .json(&item.to_remote(key.tool_name()))
                .send()
                .await
                .with_context(|| format!("POST {url}"))?;
            let body: ApiResponse<Saved> = resp.json().await.context("decoding server response")?;
            body.into_result().map_err(|e| anyhow!("server rejected history item: {e}"))?;
            pushed += 1;
        }
        tracing::info!(tool = key.tool_name(), pushed, "Pushed history");
        Ok(pushed)
    }

    /// Fetch up to `limit` server items for `key`, newest first.
    pub async fn pull(&self, key: StorageKey, limit: usize) -> anyhow::Result<Vec<HistoryItem>> {
        let url = format!(
            "{}/api/history?tool_name={}&limit={}",
            self.base_url,
            key.tool_name(),
            limit
        );
        let resp = self.client.get(&url).send().await.with_context(|| format!("GET {url}"))?;
        let body: ApiResponse<HistoryPage> = resp.json().await.context("decoding server response")?;
        let page = body.into_result().map_err(|e| anyhow!("server error: {e}"))?;
        Ok(page.history.iter().map(HistoryItem::from_remote).collect())
    }
}
