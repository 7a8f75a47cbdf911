use serde::{Deserialize, Deserializer, Serialize};

use crate::build::{BuildResult, LastBuild};
use crate::config::parse_bool_token;
use crate::index::IndexStats;
use crate::search::QueryHit;

/// Query-string parameters for `GET /search`. `topk` is parsed leniently;
/// garbage falls back to the default of 20.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub topk: Option<String>,
}

impl SearchParams {
    pub fn top_k(&self) -> usize {
        self.topk
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(20)
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub ok: bool,
    pub q: String,
    pub terms: Vec<String>,
    pub t_ms: u64,
    pub results: Vec<QueryHit>,
}

/// Body for `POST /build`. `incremental` accepts a JSON bool or a lenient
/// string token; anything unrecognized keeps the default.
#[derive(Debug, Default, Deserialize)]
pub struct BuildRequest {
    #[serde(default)]
    pub dataset_path: Option<String>,
    #[serde(default)]
    pub threads: Option<i64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub incremental: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct BuildAccepted {
    pub ok: bool,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dataset_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threads: Option<usize>,
}

/// Body for `POST /scheduler`; omitted fields keep the current state.
#[derive(Debug, Default, Deserialize)]
pub struct SchedulerRequest {
    #[serde(default, deserialize_with = "lenient_bool")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub interval_s: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SchedulerResponse {
    pub ok: bool,
    pub enabled: bool,
    pub interval_s: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub ok: bool,
    pub building: bool,
    pub dataset_path: String,
    pub build_threads: usize,
    pub scheduler_enabled: bool,
    pub scheduler_interval_s: u64,
    pub index: IndexStats,
    pub last: LastBlock,
}

/// The `last` block of `/status`: all-null until a first build completes.
#[derive(Debug, Default, Serialize)]
pub struct LastBlock {
    pub mode: Option<&'static str>,
    pub dataset: Option<String>,
    pub threads: usize,
    pub result: Option<BuildResult>,
    pub error: Option<String>,
}

impl From<LastBuild> for LastBlock {
    fn from(last: LastBuild) -> Self {
        Self {
            mode: Some(last.mode.as_str()),
            dataset: Some(last.dataset),
            threads: last.threads,
            result: last.result,
            error: last.error,
        }
    }
}

/// Error envelope for 400 responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: &'static str) -> Self {
        Self {
            ok: false,
            error,
            details: None,
        }
    }

    pub fn with_details(error: &'static str, details: impl Into<String>) -> Self {
        Self {
            ok: false,
            error,
            details: Some(details.into()),
        }
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Bool(bool),
        Str(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Bool(b)) => Some(b),
        Some(Raw::Str(s)) => parse_bool_token(&s),
    })
}
