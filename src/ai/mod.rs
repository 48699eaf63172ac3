pub mod normalize;
pub mod openai;
pub mod prompt;

pub use normalize::{parse_analysis, search_terms};
pub use openai::OpenAiClient;
pub use prompt::build_prompt;

use reqwest::StatusCode;

/// Errors from the AI classification step
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("AI service is not configured")]
    NotConfigured,
    #[error("AI request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid authorization header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
    #[error("AI request failed with status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("AI reply was empty")]
    EmptyReply,
    #[error("AI reply is not valid JSON: {source}")]
    Unparseable {
        raw: String,
        #[source]
        source: serde_json::Error,
    },
}
