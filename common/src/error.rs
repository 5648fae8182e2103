use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Unknown document: {0}")]
    UnknownDocument(String),
}

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
