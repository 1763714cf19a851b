use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::solution::Solution;

/// Problem families the background predictor watches for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
    TrafficJam,
    WeatherDisruption,
    DriverIssue,
    MerchantProblem,
    CustomerComplaint,
}

impl ProblemType {
    pub const ALL: [ProblemType; 5] = [
        ProblemType::TrafficJam,
        ProblemType::WeatherDisruption,
        ProblemType::DriverIssue,
        ProblemType::MerchantProblem,
        ProblemType::CustomerComplaint,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrafficJam => "traffic_jam",
            Self::WeatherDisruption => "weather_disruption",
            Self::DriverIssue => "driver_issue",
            Self::MerchantProblem => "merchant_problem",
            Self::CustomerComplaint => "customer_complaint",
        }
    }
}

/// A problem the predictor expects to happen, with its pre-computed plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictedProblem {
    pub id: Uuid,
    pub problem_type: ProblemType,
    pub probability: f64,
    pub horizon_minutes: u32,
    pub affected_area: String,
    pub affected_deliveries: u32,
    pub severity: f64,
    /// Synthetic description fed through the resolution pipeline.
    pub description: String,
    pub predicted_at: DateTime<Utc>,
    pub solution: Solution,
}
