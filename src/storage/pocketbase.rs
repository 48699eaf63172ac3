use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Errors talking to the document store
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("PocketBase request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("PocketBase request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// Parameters for a single `GET /collections/<name>/records` call
#[derive(Debug, Clone, Copy, Default)]
pub struct ListQuery<'a> {
    pub filter: Option<&'a str>,
    pub per_page: u32,
    pub expand: Option<&'a str>,
    pub sort: Option<&'a str>,
}

impl<'a> ListQuery<'a> {
    pub fn new(per_page: u32) -> Self {
        Self {
            per_page,
            ..Default::default()
        }
    }

    pub fn filter(mut self, filter: &'a str) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn expand(mut self, relation: &'a str) -> Self {
        self.expand = Some(relation);
        self
    }

    pub fn sort(mut self, field: &'a str) -> Self {
        self.sort = Some(field);
        self
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(4);
        if let Some(filter) = self.filter {
            params.push(("filter", filter.to_string()));
        }
        params.push(("perPage", self.per_page.to_string()));
        if let Some(expand) = self.expand {
            params.push(("expand", expand.to_string()));
        }
        if let Some(sort) = self.sort {
            params.push(("sort", sort.to_string()));
        }
        params
    }
}

/// Items stay raw so one undecodable record does not sink the page
#[derive(Debug, Deserialize)]
struct ListResponse {
    items: Option<Vec<Value>>,
}

/// Read-only client for the PocketBase REST API
#[derive(Debug, Clone)]
pub struct PocketBaseClient {
    http: Client,
    base_url: String,
}

impl PocketBaseClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn records_url(&self, collection: &str) -> String {
        format!("{}/collections/{}/records", self.base_url, collection)
    }

    /// Fetch one page of records, surfacing every failure
    pub async fn list<T>(
        &self,
        collection: &str,
        query: &ListQuery<'_>,
    ) -> Result<Vec<T>, CatalogError>
    where
        T: DeserializeOwned,
    {
        let url = self.records_url(collection);
        info!(collection, filter = query.filter.unwrap_or(""), "Querying PocketBase");

        let response = self.http.get(&url).query(&query.params()).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Status { status, body });
        }

        let page: ListResponse = response.json().await?;
        let items = decode_items(collection, page.items.unwrap_or_default());
        debug!(collection, count = items.len(), "PocketBase query complete");
        Ok(items)
    }

    /// Like [`list`](Self::list), but a failure is logged and yields no records
    pub async fn list_or_empty<T>(&self, collection: &str, query: &ListQuery<'_>) -> Vec<T>
    where
        T: DeserializeOwned,
    {
        match self.list(collection, query).await {
            Ok(items) => items,
            Err(e) => {
                error!(
                    collection,
                    error = %e,
                    "PocketBase query failed, continuing without results"
                );
                Vec::new()
            }
        }
    }

    /// Whether `GET /health` answers with a success status
    pub async fn is_healthy(&self) -> bool {
        let url = format!("{}/health", self.base_url);
        match self.http.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "PocketBase health check failed");
                false
            }
        }
    }
}

/// Decode each record on its own; undecodable ones are logged and dropped
fn decode_items<T>(collection: &str, raw: Vec<Value>) -> Vec<T>
where
    T: DeserializeOwned,
{
    raw.into_iter()
        .filter_map(|item| {
            let id = item["id"].as_str().unwrap_or("").to_string();
            match serde_json::from_value(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(collection, id = %id, error = %e, "Skipping undecodable record");
                    None
                }
            }
        })
        .collect()
}
