use thiserror::Error;

/// Unified failure type for every remote operation.
///
/// One result shape for reads and writes alike; callers decide whether a
/// failure degrades (empty listing) or aborts (failed submission).
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{resource_type}/{id} not found")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    #[error("{operation} rejected with status {status}: {diagnostics}")]
    Rejected {
        operation: &'static str,
        status: u16,
        diagnostics: String,
    },

    #[error("not a Questionnaire document: {0}")]
    InvalidDocument(String),

    #[error("malformed server response: {0}")]
    Malformed(#[from] anketo_core::AnketoError),

    #[error("invalid JSON in server response: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
