use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel value every selector starts with.
pub const NONE: &str = "none";

/// Body of `GET /api/v1/results`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultList {
    #[serde(default)]
    pub files: Vec<String>,
}

/// Body of `GET /api/v1/last`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchDefaults {
    #[serde(default)]
    pub vacancies: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

/// Parameters of one fresh search. Built per action and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub search_text: String,
    pub technology: String,
    pub count: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub technology: String,
    pub total_vacancies: u64,
    pub tech_vacancies: u64,
    pub tech_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Salary {
    #[serde(default)]
    pub from: Option<f64>,
    #[serde(default)]
    pub to: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vacancy {
    pub name: String,
    pub employer: NamedRef,
    pub area: NamedRef,
    #[serde(default)]
    pub salary: Option<Salary>,
    pub alternate_url: String,
}

impl Vacancy {
    /// Salary line as the page shows it; absent bounds print as `null`.
    pub fn salary_text(&self) -> String {
        match &self.salary {
            Some(s) => {
                let bound = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_else(|| "null".into());
                format!(
                    "{} - {} {}",
                    bound(s.from),
                    bound(s.to),
                    s.currency.as_deref().unwrap_or("null")
                )
            }
            None => "Not specified".to_string(),
        }
    }
}

/// `error` member of a failed response. The reference backend sends either
/// an object with a message or a bare string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorBody {
    Message { message: String },
    Text(String),
}

impl ErrorBody {
    pub fn into_message(self) -> String {
        match self {
            ErrorBody::Message { message } => message,
            ErrorBody::Text(text) => text,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotTime {
    pub raw: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoredResult {
    pub vacancy_title: String,
    pub stats: Stats,
    #[serde(default)]
    pub vacancies: Vec<Vacancy>,
}

/// Success body of `GET /api/v1/results/{id}`; everything is nested under `result`.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotEnvelope {
    pub time: SnapshotTime,
    pub result: StoredResult,
}

/// Success body of `GET /api/v1/vacancies`; fields live at the top level.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchEnvelope {
    #[serde(rename = "resultID")]
    pub result_id: Value,
    pub vacancy_title: String,
    pub stats: Stats,
    #[serde(default)]
    pub vacancies: Vec<Vacancy>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SnapshotResponse {
    Failed(ErrorEnvelope),
    Found(SnapshotEnvelope),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Failed(ErrorEnvelope),
    Found(SearchEnvelope),
}

/// Normalized result shared by replay and search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultView {
    pub result_id: String,
    pub title: String,
    pub stats: Stats,
    pub vacancies: Vec<Vacancy>,
}

impl From<SnapshotEnvelope> for ResultView {
    fn from(env: SnapshotEnvelope) -> Self {
        Self {
            result_id: display_scalar(&env.time.raw),
            title: env.result.vacancy_title,
            stats: env.result.stats,
            vacancies: env.result.vacancies,
        }
    }
}

impl From<SearchEnvelope> for ResultView {
    fn from(env: SearchEnvelope) -> Self {
        Self {
            result_id: display_scalar(&env.result_id),
            title: env.vacancy_title,
            stats: env.stats,
            vacancies: env.vacancies,
        }
    }
}

/// Render a JSON scalar the way a browser would interpolate it.
pub fn display_scalar(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                // f64 Display drops a zero fraction: 1700000000.0 -> "1700000000"
                n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
            }
        }
        other => other.to_string(),
    }
}
