//! HTTP access to the analytics backend.
//!
//! Bodies are decoded regardless of HTTP status, since the backend reports
//! failures through an `error` member rather than status codes.

use crate::config::ViewerConfig;
use crate::error::FetchError;
use crate::model::{QueryRequest, ResultList, SearchDefaults, SearchResponse, SnapshotResponse};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::future::Future;

pub const RESULTS_PATH: &str = "/api/v1/results";
pub const LAST_PATH: &str = "/api/v1/last";
pub const VACANCIES_PATH: &str = "/api/v1/vacancies";

/// The four read-only calls the viewer makes.
pub trait Backend: Send + Sync {
    fn list_results(&self) -> impl Future<Output = Result<ResultList, FetchError>> + Send;

    fn last_defaults(&self) -> impl Future<Output = Result<SearchDefaults, FetchError>> + Send;

    fn fetch_snapshot(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<SnapshotResponse, FetchError>> + Send;

    fn run_search(
        &self,
        query: &QueryRequest,
    ) -> impl Future<Output = Result<SearchResponse, FetchError>> + Send;
}

#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalyticsClient {
    pub fn new(cfg: &ViewerConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let mut req = self.http.get(self.url(path));
        if !query.is_empty() {
            req = req.query(query);
        }
        tracing::debug!(path, "GET");
        let resp = req.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        tracing::debug!(path, %status, len = bytes.len(), "response received");
        serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

/// Path of a stored snapshot. The identifier is sent back verbatim.
pub fn snapshot_path(id: &str) -> String {
    format!("{RESULTS_PATH}/{id}")
}

/// Query pairs for a search, in the order the page sends them.
pub fn search_query(query: &QueryRequest) -> [(&'static str, String); 3] {
    [
        ("text", query.search_text.clone()),
        ("tech", query.technology.clone()),
        ("count", query.count.to_string()),
    ]
}

impl Backend for AnalyticsClient {
    async fn list_results(&self) -> Result<ResultList, FetchError> {
        self.get_json(RESULTS_PATH, &[]).await
    }

    async fn last_defaults(&self) -> Result<SearchDefaults, FetchError> {
        self.get_json(LAST_PATH, &[]).await
    }

    async fn fetch_snapshot(&self, id: &str) -> Result<SnapshotResponse, FetchError> {
        self.get_json(&snapshot_path(id), &[]).await
    }

    async fn run_search(&self, query: &QueryRequest) -> Result<SearchResponse, FetchError> {
        self.get_json(VACANCIES_PATH, &search_query(query)).await
    }
}
