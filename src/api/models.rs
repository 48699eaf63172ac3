use crate::ai::{AiError, OpenAiClient};
use crate::config::AppConfig;
use crate::search::{SearchError, SearchService, SearchSettings, TermJoin};
use crate::storage::{Equivalence, PocketBaseClient};
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::error;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<SearchService>,
}

impl AppState {
    /// Build upstream clients from configuration. A missing AI key disables AI search only.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let catalog = Arc::new(PocketBaseClient::new(
            reqwest::Client::builder().build()?,
            config.pocketbase.base_url.clone(),
        ));

        let assistant = match config.openai.api_key.as_deref() {
            Some(key) => Some(Arc::new(OpenAiClient::new(
                reqwest::Client::builder().build()?,
                config.openai.base_url.clone(),
                key,
                config.openai.model.clone(),
            ))),
            None => None,
        };

        Ok(Self {
            search: Arc::new(SearchService::new(
                catalog,
                assistant,
                SearchSettings::from_config(config),
            )),
        })
    }
}

/// Query for `GET /api/perfumes`
#[derive(Debug, Deserialize)]
pub struct PerfumeSearchParams {
    #[serde(rename = "searchText")]
    pub search_text: Option<String>,

    #[serde(rename = "match", default)]
    pub join: TermJoin,
}

/// Query for `GET /api/equivalencias`
#[derive(Debug, Deserialize)]
pub struct EquivalenceParams {
    /// Comma-separated parent product ids
    #[serde(rename = "perfumeIds")]
    pub perfume_ids: Option<String>,

    /// Comma-separated terms matched against equivalence fields
    pub search: Option<String>,

    #[serde(rename = "match", default)]
    pub join: TermJoin,
}

/// Body for `POST /api/perfumes/ai-search`
#[derive(Debug, Deserialize)]
pub struct AiSearchRequest {
    #[serde(default)]
    pub description: Option<String>,
}

/// Response from the AI search endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSearchResponse {
    pub user_input: String,
    pub ai_analysis: Value,
    pub matched_equivalencias: Vec<Equivalence>,
    pub generated_filter: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub catalog: String,
    pub ai_enabled: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,

    #[serde(rename = "rawResponse", skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl AiSearchRequest {
    /// Validate the request, returning the trimmed description
    pub fn validate(&self) -> Result<&str, String> {
        match self.description.as_deref().map(str::trim) {
            Some(description) if !description.is_empty() => Ok(description),
            _ => Err("description field is required in the request body".to_string()),
        }
    }
}

impl PerfumeSearchParams {
    /// Validate the request, returning the raw search text
    pub fn validate(&self) -> Result<&str, String> {
        match self.search_text.as_deref() {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err("searchText query parameter is required".to_string()),
        }
    }
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("AI service is not configured.")]
    AiNotConfigured,
    #[error("Failed to get a valid response from AI.")]
    AiEmptyReply,
    #[error("Failed to parse AI response.")]
    AiUnparseable { raw: String },
    #[error("{message}")]
    Internal { message: String, details: String },
}

impl From<SearchError> for AppError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidInput(msg) => AppError::BadRequest(msg),
            SearchError::Ai(err) => err.into(),
        }
    }
}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::NotConfigured => AppError::AiNotConfigured,
            AiError::EmptyReply => AppError::AiEmptyReply,
            AiError::Unparseable { raw, .. } => AppError::AiUnparseable { raw },
            other => AppError::Internal {
                message: "Failed to process AI search request.".to_string(),
                details: other.to_string(),
            },
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, raw_response, details) = match self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, None, None),
            AppError::AiNotConfigured | AppError::AiEmptyReply => {
                error!("{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, None, None)
            }
            AppError::AiUnparseable { raw } => {
                error!(raw = %raw, "Failed to parse AI reply as JSON");
                (StatusCode::INTERNAL_SERVER_ERROR, Some(raw), None)
            }
            AppError::Internal { details, .. } => {
                error!(details = %details, "Internal error: {}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, None, Some(details))
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: status.to_string(),
                message,
                raw_response,
                details,
            }),
        )
            .into_response()
    }
}
