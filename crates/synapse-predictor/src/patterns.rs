use synapse_models::{ProblemType, WeatherCondition};

/// Base rates and draw ranges for one problem family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProblemPattern {
    pub problem_type: ProblemType,
    pub base_probability: f64,
    pub affected_deliveries: (u32, u32),
    pub severity: (f64, f64),
    pub horizon_minutes: (u32, u32),
}

pub const PATTERNS: [ProblemPattern; 5] = [
    ProblemPattern {
        problem_type: ProblemType::TrafficJam,
        base_probability: 0.3,
        affected_deliveries: (2, 8),
        severity: (0.4, 0.9),
        horizon_minutes: (15, 45),
    },
    ProblemPattern {
        problem_type: ProblemType::WeatherDisruption,
        base_probability: 0.2,
        affected_deliveries: (1, 5),
        severity: (0.3, 0.8),
        horizon_minutes: (30, 120),
    },
    ProblemPattern {
        problem_type: ProblemType::DriverIssue,
        base_probability: 0.15,
        affected_deliveries: (1, 3),
        severity: (0.5, 0.9),
        horizon_minutes: (5, 30),
    },
    ProblemPattern {
        problem_type: ProblemType::MerchantProblem,
        base_probability: 0.25,
        affected_deliveries: (1, 6),
        severity: (0.3, 0.7),
        horizon_minutes: (10, 60),
    },
    ProblemPattern {
        problem_type: ProblemType::CustomerComplaint,
        base_probability: 0.1,
        affected_deliveries: (1, 2),
        severity: (0.6, 1.0),
        horizon_minutes: (0, 15),
    },
];

/// Active deliveries simulated per cycle.
pub const ACTIVE_DELIVERIES: (u32, u32) = (15, 35);

/// Half-width of the uniform noise added to every probability.
pub const PROBABILITY_NOISE: f64 = 0.1;

/// City centre the simulated deliveries are scattered around.
pub const CENTRE: (f64, f64) = (1.3521, 103.8198);
pub const LOCATION_SPREAD: f64 = 0.01;

pub fn weather_factor(condition: WeatherCondition) -> f64 {
    match condition {
        WeatherCondition::Rain | WeatherCondition::Storm => 1.5,
        WeatherCondition::Clear => 0.8,
        WeatherCondition::Cloudy | WeatherCondition::Windy => 1.0,
    }
}

/// Rush hours are 7-9 and 17-19 inclusive, lunch is 11-14 inclusive.
pub fn time_factor(hour: u32) -> f64 {
    match hour {
        7..=9 | 17..=19 => 1.4,
        11..=14 => 1.2,
        _ => 1.0,
    }
}

pub fn probability(base: f64, weather: f64, time: f64, noise: f64) -> f64 {
    (base * weather * time + noise).clamp(0.0, 1.0)
}

/// Where a predicted problem is expected, phrased per family.
pub fn affected_area(problem_type: ProblemType, delivery: usize, location: (f64, f64)) -> String {
    let (lat, lng) = location;
    match problem_type {
        ProblemType::TrafficJam => format!("Area around {lat:.4}, {lng:.4}"),
        ProblemType::WeatherDisruption => format!("Weather zone covering {lat:.4}, {lng:.4}"),
        _ => format!("Local area near delivery del_{delivery}"),
    }
}

/// Disruption text fed through the resolution pipeline for a prediction.
pub fn describe(problem_type: ProblemType, area: &str, affected_deliveries: u32) -> String {
    let what = match problem_type {
        ProblemType::TrafficJam => "traffic jam building",
        ProblemType::WeatherDisruption => "storm weather moving in",
        ProblemType::DriverIssue => "driver stress rising",
        ProblemType::MerchantProblem => "merchant kitchen running behind",
        ProblemType::CustomerComplaint => "customer complaint likely",
    };
    format!("Predicted {what} at {area}, affecting {affected_deliveries} deliveries")
}
