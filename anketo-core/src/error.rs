use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnketoError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("expected {expected} value, got {value:?}")]
    InvalidAnswer {
        expected: &'static str,
        value: String,
    },

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnketoError>;
