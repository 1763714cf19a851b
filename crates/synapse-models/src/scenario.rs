use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of disruption categories a scenario can be classified into.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioType {
    TrafficDisruption,
    CustomerIssue,
    DriverWellbeing,
    Environmental,
    GeneralDisruption,
}

impl ScenarioType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrafficDisruption => "traffic_disruption",
            Self::CustomerIssue => "customer_issue",
            Self::DriverWellbeing => "driver_wellbeing",
            Self::Environmental => "environmental",
            Self::GeneralDisruption => "general_disruption",
        }
    }
}

impl std::fmt::Display for ScenarioType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified delivery disruption, built once per inbound request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    /// Stable fingerprint of `description`.
    pub id: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub scenario_type: ScenarioType,
    /// 0.0 to 1.0.
    pub severity: f64,
    /// Always at least 1.
    pub affected_units: u32,
}
