use thiserror::Error;

/// Errors raised while reading authored quiz content.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("malformed question set: {0}")]
    QuestionSet(#[from] serde_json::Error),
}
