//! In-memory backend for orchestrator tests.

use crate::client::{snapshot_path, Backend, LAST_PATH, RESULTS_PATH, VACANCIES_PATH};
use crate::error::FetchError;
use crate::model::{QueryRequest, ResultList, SearchDefaults, SearchResponse, SnapshotResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned JSON bodies and records every requested path.
/// Anything not configured fails as a malformed response.
#[derive(Default)]
pub struct FakeBackend {
    results: Option<Value>,
    defaults: Option<Value>,
    snapshots: HashMap<String, Value>,
    search: Option<Value>,
    requested: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn with_results(mut self, ids: &[&str]) -> Self {
        self.results = Some(serde_json::json!({ "files": ids }));
        self
    }

    pub fn with_defaults(mut self, texts: &[&str], techs: &[&str]) -> Self {
        self.defaults = Some(serde_json::json!({ "vacancies": texts, "technologies": techs }));
        self
    }

    pub fn with_snapshot(mut self, id: &str, body: Value) -> Self {
        self.snapshots.insert(id.to_string(), body);
        self
    }

    pub fn with_search(mut self, body: Value) -> Self {
        self.search = Some(body);
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn record(&self, path: String) {
        if let Ok(mut r) = self.requested.lock() {
            r.push(path);
        }
    }

    fn decode<T: DeserializeOwned>(path: &str, body: Option<&Value>) -> Result<T, FetchError> {
        let decoded = match body {
            Some(v) => serde_json::from_value(v.clone()),
            None => serde_json::from_str("<html>502 Bad Gateway</html>"),
        };
        decoded.map_err(|source| FetchError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

impl Backend for FakeBackend {
    async fn list_results(&self) -> Result<ResultList, FetchError> {
        self.record(RESULTS_PATH.to_string());
        Self::decode(RESULTS_PATH, self.results.as_ref())
    }

    async fn last_defaults(&self) -> Result<SearchDefaults, FetchError> {
        self.record(LAST_PATH.to_string());
        Self::decode(LAST_PATH, self.defaults.as_ref())
    }

    async fn fetch_snapshot(&self, id: &str) -> Result<SnapshotResponse, FetchError> {
        let path = snapshot_path(id);
        self.record(path.clone());
        Self::decode(&path, self.snapshots.get(id))
    }

    async fn run_search(&self, query: &QueryRequest) -> Result<SearchResponse, FetchError> {
        self.record(format!(
            "{VACANCIES_PATH}?text={}&tech={}&count={}",
            query.search_text, query.technology, query.count
        ));
        Self::decode(VACANCIES_PATH, self.search.as_ref())
    }
}
