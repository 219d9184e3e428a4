use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignoffError {
    #[error("unknown report kind: {0}")]
    NotFound(String),

    #[error("query on {kind} failed: {message}")]
    QueryFailed { kind: String, message: String },

    #[error("report kind {kind} references missing column {column}")]
    Config { kind: String, column: String },
}

impl SignoffError {
    pub fn query(kind: &str, err: impl std::fmt::Display) -> Self {
        Self::QueryFailed {
            kind: kind.to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SignoffError>;
