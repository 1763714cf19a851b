use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Reasoning collaborator error: {0}")]
    Reasoning(String),

    #[error("{0} timed out after {1} ms")]
    Timeout(String, u64),

    #[error("Signal probe error: {0}")]
    Signal(String),

    #[error("Response parse error: {0}")]
    Parse(String),

    #[error("State not available: {0}")]
    Unavailable(String),

    #[error("Cache error: {0}")]
    Cache(#[from] synapse_cache::CacheError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
