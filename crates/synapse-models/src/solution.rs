use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::candidate::{Action, Approach, RoiAnalysis};
use crate::scenario::ScenarioType;

/// A follow-up action offered alongside a solution's primary plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractiveOption {
    pub label: String,
    pub action_tag: String,
    pub description: String,
}

impl InteractiveOption {
    pub fn new(label: &str, action_tag: &str, description: &str) -> Self {
        Self {
            label: label.to_string(),
            action_tag: action_tag.to_string(),
            description: description.to_string(),
        }
    }
}

/// The externally visible result of resolving a scenario.
///
/// This is also the value stored in the result cache, so every field must
/// survive a JSON round-trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Solution {
    pub id: Uuid,
    pub scenario_id: String,
    pub scenario_type: ScenarioType,
    pub approach: Approach,
    pub actions: Vec<Action>,
    pub predicted_profit: Decimal,
    pub confidence: f64,
    pub roi: RoiAnalysis,
    pub reasoning_text: String,
    pub execution_time_seconds: f64,
    pub cache_hit: bool,
    /// Two or three entries.
    pub interactive_options: Vec<InteractiveOption>,
    /// How many candidates competed for this plan.
    pub candidates_evaluated: u32,
    pub created_at: DateTime<Utc>,
}
