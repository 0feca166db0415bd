//! Executes built requests against the search backend.

use super::dsl::SearchRequest;
use crate::error::{Backend, EngineError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use url::Url;

/// Hits returned for one request of a batch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HitSet {
    #[serde(default, deserialize_with = "total_hits")]
    pub total: u64,
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

/// Older backends report a bare count, newer ones `{ "value": n, .. }`.
fn total_hits<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Total {
        Count(u64),
        Object { value: u64 },
    }

    Ok(match Total::deserialize(deserializer)? {
        Total::Count(n) | Total::Object { value: n } => n,
    })
}

/// One backend hit as returned on the wire.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_type", default)]
    pub kind: Option<String>,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub fields: HashMap<String, Vec<Value>>,
    #[serde(default)]
    pub highlight: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub inner_hits: HashMap<String, InnerHits>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InnerHits {
    pub hits: HitSet,
}

impl RawHit {
    /// First value of a projected field, if it is a string.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name)?.first()?.as_str()
    }

    /// First inner hit for a parent type.
    pub fn inner_hit(&self, parent_type: &str) -> Option<&Self> {
        self.inner_hits.get(parent_type)?.hits.hits.first()
    }
}

/// Batched execution of search requests.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Runs all requests in one round trip. Results are in request order.
    async fn msearch(&self, requests: &[SearchRequest]) -> Result<Vec<HitSet>>;
}

/// Runs a single request through [`SearchBackend::msearch`].
pub async fn search_one(backend: &dyn SearchBackend, request: SearchRequest) -> Result<HitSet> {
    backend
        .msearch(std::slice::from_ref(&request))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::backend(Backend::Search, "empty multi-search response"))
}

#[derive(Debug, Deserialize)]
struct MultiSearchResponse {
    responses: Vec<SubResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SubResponse {
    Failed { error: Value },
    Hits { hits: HitSet },
}

/// `_msearch` over HTTP with newline-delimited JSON bodies.
pub struct ElasticsearchBackend {
    client: reqwest::Client,
    endpoint: Url,
}

impl ElasticsearchBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(&format!("{}/", base_url.trim_end_matches('/')))
            .map_err(|e| EngineError::malformed(format!("search URL '{}': {}", base_url, e)))?;
        let endpoint = base
            .join("_msearch")
            .map_err(|e| EngineError::malformed(format!("search URL '{}': {}", base_url, e)))?;

        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }

    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Header line then body line per request, each terminated by a newline.
pub fn ndjson_body(requests: &[SearchRequest]) -> Result<String> {
    let mut body = String::new();
    for request in requests {
        for line in [
            serde_json::to_string(&request.header()),
            serde_json::to_string(request),
        ] {
            body.push_str(&line.map_err(|e| EngineError::backend(Backend::Search, e))?);
            body.push('\n');
        }
    }
    Ok(body)
}

#[async_trait]
impl SearchBackend for ElasticsearchBackend {
    async fn msearch(&self, requests: &[SearchRequest]) -> Result<Vec<HitSet>> {
        let body = ndjson_body(requests)?;
        tracing::debug!(requests = requests.len(), endpoint = %self.endpoint, "Sending multi-search");

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(body)
            .send()
            .await?
            .error_for_status()?
            .json::<MultiSearchResponse>()
            .await?;

        if response.responses.len() != requests.len() {
            return Err(EngineError::backend(
                Backend::Search,
                format!(
                    "expected {} responses, got {}",
                    requests.len(),
                    response.responses.len()
                ),
            ));
        }

        response
            .responses
            .into_iter()
            .map(|sub| match sub {
                SubResponse::Hits { hits } => Ok(hits),
                SubResponse::Failed { error } => {
                    Err(EngineError::backend(Backend::Search, error.to_string()))
                }
            })
            .collect()
    }
}
