use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Corrupt snapshot row: key={key}: {reason}")]
    CorruptRow { key: String, reason: String },

    #[error("Cache not available: {0}")]
    Unavailable(String),
}
