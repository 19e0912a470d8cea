use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to document store failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("document store returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("authentication with document store failed: {0}")]
    Auth(String),

    #[error("invalid service account credentials: {0}")]
    Credentials(String),

    #[error("malformed document payload: {0}")]
    Codec(String),
}
