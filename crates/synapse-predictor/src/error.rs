use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("Engine error: {0}")]
    Engine(#[from] synapse_engine::EngineError),

    #[error("Cache error: {0}")]
    Cache(#[from] synapse_cache::CacheError),

    #[error("Configuration error: {0}")]
    Config(String),
}
