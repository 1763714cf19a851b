use std::sync::{Arc, LazyLock};

use chrono::Utc;
use regex::Regex;
use sha2::{Digest, Sha256};
use synapse_models::{Scenario, ScenarioType, SignalContext};

use crate::estimator::Estimator;

/// Keyword sets checked in this order; the first category with a match wins.
const TYPE_KEYWORDS: [(ScenarioType, &[&str]); 4] = [
    (
        ScenarioType::TrafficDisruption,
        &["traffic", "accident", "jam", "road"],
    ),
    (
        ScenarioType::CustomerIssue,
        &["complaint", "angry", "cold", "food"],
    ),
    (ScenarioType::DriverWellbeing, &["driver", "voice", "stress"]),
    (ScenarioType::Environmental, &["weather", "rain", "storm"]),
];

const HIGH_SEVERITY: &[&str] = &["major", "critical", "emergency", "accident", "angry"];
const MEDIUM_SEVERITY: &[&str] = &["delay", "problem", "issue", "cold", "traffic"];
const LOW_SEVERITY: &[&str] = &["minor", "slight", "small"];

const MULTI_UNIT: &[&str] = &["major", "highway", "multiple"];
const SINGLE_UNIT: &[&str] = &["single", "one", "individual"];

/// Output of [`ScenarioClassifier::classify`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub scenario_type: ScenarioType,
    pub severity: f64,
    pub affected_units: u32,
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text.contains(kw))
}

/// Stable scenario id: the first 16 hex characters of SHA-256 over the raw text.
pub fn fingerprint(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

/// Keyword-driven type selection. Case-insensitive.
pub fn scenario_type_of(text: &str) -> ScenarioType {
    let lower = text.to_lowercase();
    TYPE_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(scenario_type, _)| *scenario_type)
        .unwrap_or(ScenarioType::GeneralDisruption)
}

/// Severity range for the first band whose keywords appear in `lower`.
fn severity_band(lower: &str) -> (f64, f64) {
    if contains_any(lower, HIGH_SEVERITY) {
        (0.7, 1.0)
    } else if contains_any(lower, MEDIUM_SEVERITY) {
        (0.4, 0.7)
    } else if contains_any(lower, LOW_SEVERITY) {
        (0.1, 0.4)
    } else {
        (0.3, 0.6)
    }
}

/// A number followed within two words by a unit noun ("5 active deliveries").
static COUNTED_UNITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"([0-9]+)\W+(?:\w+\W+)?(?:deliver|order|package|parcel|stop|customer|driver|vehicle|rider|unit)",
    )
    .expect("counted-units pattern is valid")
});

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("number pattern is valid"));

/// Affected-unit count stated in the text.
///
/// A counted number is preferred; otherwise the first run of digits is used.
/// The result is raised to at least 1 and saturates at `u32::MAX`.
pub fn explicit_units(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    let digits = COUNTED_UNITS
        .captures(&lower)
        .and_then(|caps| caps.get(1))
        .or_else(|| FIRST_NUMBER.find(&lower))?
        .as_str();
    // only overflow can fail on an ASCII digit run
    Some(digits.parse::<u32>().unwrap_or(u32::MAX).max(1))
}

/// Turns raw disruption text into a [`Scenario`].
pub struct ScenarioClassifier {
    estimator: Arc<dyn Estimator>,
}

impl ScenarioClassifier {
    pub fn new(estimator: Arc<dyn Estimator>) -> Self {
        Self { estimator }
    }

    pub fn classify(&self, text: &str) -> Classification {
        let lower = text.to_lowercase();

        let (lo, hi) = severity_band(&lower);
        let severity = self.estimator.uniform(lo, hi);

        let affected_units = match explicit_units(text) {
            Some(units) => units,
            None if contains_any(&lower, MULTI_UNIT) => self.estimator.range_inclusive(3, 7),
            None if contains_any(&lower, SINGLE_UNIT) => 1,
            None => self.estimator.range_inclusive(1, 3),
        };

        Classification {
            scenario_type: scenario_type_of(text),
            severity,
            affected_units,
        }
    }

    pub fn scenario(&self, text: &str) -> Scenario {
        let classification = self.classify(text);
        Scenario {
            id: fingerprint(text),
            description: text.to_string(),
            created_at: Utc::now(),
            scenario_type: classification.scenario_type,
            severity: classification.severity,
            affected_units: classification.affected_units,
        }
    }

    /// A copy of `scenario` with its severity scaled by the signal factor for
    /// its type, clamped to `[0, 1]`.
    pub fn refine(&self, scenario: &Scenario, signals: &SignalContext) -> Scenario {
        let factor = signals.severity_factor(scenario.scenario_type);
        Scenario {
            severity: (scenario.severity * factor).clamp(0.0, 1.0),
            ..scenario.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MidpointEstimator;
    use synapse_models::SignalReading;

    fn classifier() -> ScenarioClassifier {
        ScenarioClassifier::new(Arc::new(MidpointEstimator))
    }

    #[test]
    fn traffic_checked_before_customer() {
        assert_eq!(
            scenario_type_of("Accident near the restaurant, customer is angry"),
            ScenarioType::TrafficDisruption
        );
    }

    #[test]
    fn type_keywords_are_case_insensitive() {
        assert_eq!(scenario_type_of("STORM warning"), ScenarioType::Environmental);
        assert_eq!(
            scenario_type_of("Customer COMPLAINT"),
            ScenarioType::CustomerIssue
        );
        assert_eq!(
            scenario_type_of("Driver sounds stressed"),
            ScenarioType::DriverWellbeing
        );
    }

    #[test]
    fn unmatched_text_is_general() {
        assert_eq!(
            scenario_type_of("Merchant ran out of napkins"),
            ScenarioType::GeneralDisruption
        );
    }

    #[test]
    fn severity_bands() {
        let c = classifier();
        let close = |text: &str, expected: f64| {
            let severity = c.classify(text).severity;
            assert!((severity - expected).abs() < 1e-9, "{text}: {severity}");
        };
        close("Major pileup", 0.85);
        close("Slight delay", 0.55);
        close("A small hiccup", 0.25);
        close("Something odd", 0.45);
    }

    #[test]
    fn counted_literal_wins() {
        let c = classifier();
        let classification = c.classify("Major accident on Highway 1 affects 5 active deliveries");
        assert_eq!(classification.scenario_type, ScenarioType::TrafficDisruption);
        assert_eq!(classification.affected_units, 5);
        assert_eq!(c.classify("Road closure hits 12 orders").affected_units, 12);
        assert_eq!(explicit_units("Highway 9 closed, 8 parcels held"), Some(8));
        assert_eq!(explicit_units("Route 3: 14 idle riders"), Some(14));
    }

    #[test]
    fn first_literal_without_unit_noun() {
        assert_eq!(explicit_units("Route 66 closed near exit 12"), Some(66));
        assert_eq!(explicit_units("Gate B7 blocked"), Some(7));
    }

    #[test]
    fn zero_and_huge_literals_are_bounded() {
        assert_eq!(explicit_units("0 orders"), Some(1));
        assert_eq!(explicit_units("99999999999 orders"), Some(u32::MAX));
        assert_eq!(explicit_units("no digits"), None);
    }

    #[test]
    fn unit_heuristics_without_literal() {
        let c = classifier();
        assert_eq!(c.classify("Multiple orders stuck").affected_units, 5);
        assert_eq!(c.classify("A single order is late").affected_units, 1);
        assert_eq!(c.classify("Orders are late").affected_units, 2);
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = fingerprint("Customer angry about cold food delivery");
        let b = fingerprint("Customer angry about cold food delivery");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, fingerprint("Customer angry about cold food delivery!"));
    }

    #[test]
    fn refine_scales_and_clamps_severity() {
        let c = classifier();
        let scenario = c.scenario("Heavy storm over downtown");
        assert_eq!(scenario.scenario_type, ScenarioType::Environmental);

        let mut signals = SignalContext::default();
        signals.insert(SignalReading::Weather {
            condition: synapse_models::WeatherCondition::Storm,
            precipitation_probability: 0.9,
            wind_speed_kmh: 22.0,
        });
        let refined = c.refine(&scenario, &signals);
        assert!((refined.severity - scenario.severity * 1.2).abs() < 1e-9);
        assert_eq!(refined.id, scenario.id);

        let saturated = Scenario {
            severity: 0.95,
            ..scenario
        };
        assert_eq!(c.refine(&saturated, &signals).severity, 1.0);
    }
}
