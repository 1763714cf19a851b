use serde::{Deserialize, Serialize};

use crate::scenario::ScenarioType;

/// The environment probes the pipeline can consult.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Traffic,
    Weather,
    Sentiment,
    DriverStress,
    Market,
}

impl SignalKind {
    pub const ALL: [SignalKind; 5] = [
        SignalKind::Traffic,
        SignalKind::Weather,
        SignalKind::Sentiment,
        SignalKind::DriverStress,
        SignalKind::Market,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Traffic => "traffic",
            Self::Weather => "weather",
            Self::Sentiment => "sentiment",
            Self::DriverStress => "driver_stress",
            Self::Market => "market",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    Clear,
    Cloudy,
    Rain,
    Storm,
    Windy,
}

impl WeatherCondition {
    pub fn is_severe(&self) -> bool {
        matches!(self, Self::Rain | Self::Storm)
    }
}

/// A single bounded reading returned by an environment probe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SignalReading {
    Traffic {
        /// 0.0 to 1.0.
        congestion_level: f64,
        incidents: u32,
        average_speed_kmh: f64,
    },
    Weather {
        condition: WeatherCondition,
        precipitation_probability: f64,
        wind_speed_kmh: f64,
    },
    Sentiment {
        /// 0.0 (hostile) to 1.0 (delighted).
        score: f64,
        label: String,
    },
    DriverStress {
        /// 0.0 to 1.0.
        stress_level: f64,
    },
    Market {
        demand_level: f64,
        competition_density: f64,
    },
}

impl SignalReading {
    pub fn kind(&self) -> SignalKind {
        match self {
            Self::Traffic { .. } => SignalKind::Traffic,
            Self::Weather { .. } => SignalKind::Weather,
            Self::Sentiment { .. } => SignalKind::Sentiment,
            Self::DriverStress { .. } => SignalKind::DriverStress,
            Self::Market { .. } => SignalKind::Market,
        }
    }
}

/// Readings gathered for one resolution. A missing reading means the probe
/// failed or timed out; every factor derived from it is then neutral (1.0).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SignalContext {
    pub readings: Vec<SignalReading>,
}

impl SignalContext {
    pub fn get(&self, kind: SignalKind) -> Option<&SignalReading> {
        self.readings.iter().find(|r| r.kind() == kind)
    }

    pub fn insert(&mut self, reading: SignalReading) {
        let kind = reading.kind();
        self.readings.retain(|r| r.kind() != kind);
        self.readings.push(reading);
    }

    /// Scales the customer-value baseline. Range [0.8, 1.2].
    pub fn customer_value_factor(&self) -> f64 {
        match self.get(SignalKind::Sentiment) {
            Some(SignalReading::Sentiment { score, .. }) => 0.8 + 0.4 * score.clamp(0.0, 1.0),
            _ => 1.0,
        }
    }

    /// Scales the brand baseline. Range [0.85, 1.15].
    pub fn brand_factor(&self) -> f64 {
        match self.get(SignalKind::Market) {
            Some(SignalReading::Market { demand_level, .. }) => {
                0.85 + 0.3 * demand_level.clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }

    /// Multiplier applied to a freshly classified severity. Range [0.85, 1.2].
    pub fn severity_factor(&self, scenario_type: ScenarioType) -> f64 {
        match scenario_type {
            ScenarioType::TrafficDisruption => match self.get(SignalKind::Traffic) {
                Some(SignalReading::Traffic {
                    congestion_level, ..
                }) => 0.85 + 0.3 * congestion_level.clamp(0.0, 1.0),
                _ => 1.0,
            },
            ScenarioType::Environmental => match self.get(SignalKind::Weather) {
                Some(SignalReading::Weather { condition, .. }) if condition.is_severe() => 1.2,
                Some(SignalReading::Weather {
                    condition: WeatherCondition::Clear,
                    ..
                }) => 0.9,
                _ => 1.0,
            },
            ScenarioType::DriverWellbeing => match self.get(SignalKind::DriverStress) {
                Some(SignalReading::DriverStress { stress_level }) => {
                    0.85 + 0.3 * stress_level.clamp(0.0, 1.0)
                }
                _ => 1.0,
            },
            ScenarioType::CustomerIssue => match self.get(SignalKind::Sentiment) {
                Some(SignalReading::Sentiment { score, .. }) => {
                    1.15 - 0.3 * score.clamp(0.0, 1.0)
                }
                _ => 1.0,
            },
            ScenarioType::GeneralDisruption => 1.0,
        }
    }
}
