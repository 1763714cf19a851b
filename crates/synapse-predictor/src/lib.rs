pub mod daemon;
pub mod error;
pub mod patterns;

pub use daemon::{CycleReport, Predictor, PredictorStats};
pub use error::PredictorError;
