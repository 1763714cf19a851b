use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The strategy a candidate plan follows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Approach {
    Standard,
    PremiumCustomer,
    RetentionFocused,
    ProactiveRerouting,
    FleetOptimization,
    DriverSupport,
    TeamCollaboration,
    InnovationFocused,
}

impl Approach {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::PremiumCustomer => "premium_customer",
            Self::RetentionFocused => "retention_focused",
            Self::ProactiveRerouting => "proactive_rerouting",
            Self::FleetOptimization => "fleet_optimization",
            Self::DriverSupport => "driver_support",
            Self::TeamCollaboration => "team_collaboration",
            Self::InnovationFocused => "innovation_focused",
        }
    }
}

impl std::fmt::Display for Approach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a single step in an action plan.
///
/// Kinds produced elsewhere (for example by an external planner) that this
/// build does not know deserialize as `Unknown`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Investigate,
    Notify,
    Monitor,
    Compensation,
    PriorityStatus,
    PersonalApology,
    FutureDiscount,
    ModestCompensation,
    LoyaltyPoints,
    QualityAssurance,
    PredictTraffic,
    OptimizeRoutes,
    NotifyDrivers,
    AdjustEtas,
    RepositionFleet,
    BatchDeliveries,
    DynamicPricing,
    EmotionalSupport,
    TechnicalAssistance,
    IncentiveBonus,
    TrainingOpportunity,
    PeerSupport,
    SharedResponsibility,
    Recognition,
    CreativeSolution,
    Partnership,
    TechnologyUpgrade,
    ProcessImprovement,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Action {
    pub kind: ActionKind,
    pub description: String,
}

impl Action {
    pub fn new(kind: ActionKind, description: &str) -> Self {
        Self {
            kind,
            description: description.to_string(),
        }
    }
}

/// A proposed action plan for a scenario, prior to selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub approach: Approach,
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Immediate profit estimate. May be negative.
    pub base_profit: Decimal,
    /// 0.0 to 1.0.
    pub confidence: f64,
}

/// Profit/cost breakdown attached to a candidate by the evaluator.
///
/// `roi_percentage` is `(total_profit - total_cost) / max(total_cost, 1) * 100`
/// when `total_cost > 0`, otherwise `total_profit * 100`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoiAnalysis {
    pub immediate_profit: Decimal,
    pub long_term_profit: Decimal,
    pub operational_cost: Decimal,
    pub brand_impact: Decimal,
    pub customer_value_impact: Decimal,
    pub total_profit: Decimal,
    pub total_cost: Decimal,
    pub roi_percentage: Decimal,
    /// `None` when the plan never pays back (non-positive long-term profit).
    /// Otherwise capped at 365.
    pub payback_days: Option<Decimal>,
}

/// A candidate together with its ROI analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluatedCandidate {
    pub candidate: Candidate,
    pub roi: RoiAnalysis,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn approach_serialization() {
        assert_eq!(
            serde_json::to_string(&Approach::ProactiveRerouting).unwrap(),
            "\"proactive_rerouting\""
        );
        assert_eq!(Approach::PremiumCustomer.to_string(), "premium_customer");
    }

    #[test]
    fn unknown_action_kind_deserializes() {
        let action: Action =
            serde_json::from_str(r#"{"kind": "launch_drone", "description": "Air drop"}"#)
                .unwrap();
        assert_eq!(action.kind, ActionKind::Unknown);

        // kinds no generator variant produces are not part of the closed set
        let kind: ActionKind = serde_json::from_str(r#""notify_stakeholders""#).unwrap();
        assert_eq!(kind, ActionKind::Unknown);
    }

    #[test]
    fn candidate_without_actions_deserializes_empty() {
        let candidate: Candidate = serde_json::from_str(
            r#"{"approach": "standard", "base_profit": "0", "confidence": 0.7}"#,
        )
        .unwrap();
        assert!(candidate.actions.is_empty());
        assert_eq!(candidate.base_profit, dec!(0));
    }

    #[test]
    fn money_serializes_as_string() {
        let candidate = Candidate {
            approach: Approach::FleetOptimization,
            actions: vec![Action::new(ActionKind::BatchDeliveries, "Batch nearby deliveries")],
            base_profit: dec!(42.50),
            confidence: 0.8,
        };
        let value = serde_json::to_value(&candidate).unwrap();
        assert_eq!(value["base_profit"], "42.50");
        assert_eq!(value["actions"][0]["kind"], "batch_deliveries");
    }
}
