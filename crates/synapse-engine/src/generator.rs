use std::sync::Arc;

use synapse_models::{Action, ActionKind, Approach, Candidate, Scenario, ScenarioType};

use crate::estimator::Estimator;
use crate::evaluator::to_money;

/// Fixed parameters of one candidate variant.
#[derive(Debug, Clone, Copy)]
pub struct VariantProfile {
    /// Bounds of the immediate profit draw.
    pub profit: (f64, f64),
    pub confidence: f64,
    pub actions: &'static [(ActionKind, &'static str)],
}

pub fn profile(approach: Approach) -> VariantProfile {
    use ActionKind::*;

    match approach {
        Approach::Standard => VariantProfile {
            profit: (0.0, 0.0),
            confidence: 0.7,
            actions: &[
                (Investigate, "Investigate the issue"),
                (Notify, "Notify relevant parties"),
                (Monitor, "Monitor the situation"),
            ],
        },
        Approach::PremiumCustomer => VariantProfile {
            profit: (60.0, 120.0),
            confidence: 0.9,
            actions: &[
                (Compensation, "Offer generous compensation"),
                (PriorityStatus, "Grant priority delivery status"),
                (PersonalApology, "Personal apology call"),
                (FutureDiscount, "20% off next 3 orders"),
            ],
        },
        Approach::RetentionFocused => VariantProfile {
            profit: (40.0, 80.0),
            confidence: 0.85,
            actions: &[
                (ModestCompensation, "Offer fair compensation"),
                (LoyaltyPoints, "Bonus loyalty points"),
                (QualityAssurance, "Quality guarantee for next order"),
            ],
        },
        Approach::ProactiveRerouting => VariantProfile {
            profit: (50.0, 100.0),
            confidence: 0.9,
            actions: &[
                (PredictTraffic, "Predict traffic patterns"),
                (OptimizeRoutes, "Optimize all affected routes"),
                (NotifyDrivers, "Alert drivers proactively"),
                (AdjustEtas, "Update customer ETAs"),
            ],
        },
        Approach::FleetOptimization => VariantProfile {
            profit: (30.0, 70.0),
            confidence: 0.8,
            actions: &[
                (RepositionFleet, "Reposition available drivers"),
                (BatchDeliveries, "Batch nearby deliveries"),
                (DynamicPricing, "Adjust pricing for delays"),
            ],
        },
        Approach::DriverSupport => VariantProfile {
            profit: (45.0, 85.0),
            confidence: 0.85,
            actions: &[
                (EmotionalSupport, "Provide emotional support"),
                (TechnicalAssistance, "Offer technical help"),
                (IncentiveBonus, "Performance bonus for handling"),
                (TrainingOpportunity, "Additional training access"),
            ],
        },
        Approach::TeamCollaboration => VariantProfile {
            profit: (35.0, 65.0),
            confidence: 0.8,
            actions: &[
                (PeerSupport, "Connect with experienced drivers"),
                (SharedResponsibility, "Share delivery load"),
                (Recognition, "Recognize good performance"),
            ],
        },
        Approach::InnovationFocused => VariantProfile {
            profit: (40.0, 90.0),
            confidence: 0.75,
            actions: &[
                (CreativeSolution, "Develop innovative approach"),
                (Partnership, "Partner with local services"),
                (TechnologyUpgrade, "Deploy new technology"),
                (ProcessImprovement, "Improve operational processes"),
            ],
        },
    }
}

/// Variants competing with the standard baseline for each scenario type.
pub fn variants_for(scenario_type: ScenarioType) -> &'static [Approach] {
    match scenario_type {
        ScenarioType::CustomerIssue => &[Approach::PremiumCustomer, Approach::RetentionFocused],
        ScenarioType::TrafficDisruption => {
            &[Approach::ProactiveRerouting, Approach::FleetOptimization]
        }
        ScenarioType::DriverWellbeing => &[Approach::DriverSupport, Approach::TeamCollaboration],
        ScenarioType::Environmental | ScenarioType::GeneralDisruption => {
            &[Approach::InnovationFocused]
        }
    }
}

/// Produces the competing plans for a classified scenario.
pub struct CandidateGenerator {
    estimator: Arc<dyn Estimator>,
}

impl CandidateGenerator {
    pub fn new(estimator: Arc<dyn Estimator>) -> Self {
        Self { estimator }
    }

    /// The standard baseline followed by the type's variants, in that order.
    pub fn generate(&self, scenario: &Scenario) -> Vec<Candidate> {
        let candidates: Vec<Candidate> = std::iter::once(Approach::Standard)
            .chain(variants_for(scenario.scenario_type).iter().copied())
            .map(|approach| self.build(approach))
            .collect();

        assert!(
            candidates.len() >= 2,
            "candidate generation produced {} plans for {}",
            candidates.len(),
            scenario.scenario_type
        );
        candidates
    }

    fn build(&self, approach: Approach) -> Candidate {
        let profile = profile(approach);
        let (lo, hi) = profile.profit;
        Candidate {
            approach,
            actions: profile
                .actions
                .iter()
                .map(|(kind, description)| Action::new(*kind, description))
                .collect(),
            base_profit: to_money(self.estimator.uniform(lo, hi)),
            confidence: profile.confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::RandomEstimator;
    use crate::test_support::{scenario_of, MidpointEstimator};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const ALL_TYPES: [ScenarioType; 5] = [
        ScenarioType::TrafficDisruption,
        ScenarioType::CustomerIssue,
        ScenarioType::DriverWellbeing,
        ScenarioType::Environmental,
        ScenarioType::GeneralDisruption,
    ];

    #[test]
    fn every_type_gets_baseline_plus_variants() {
        let generator = CandidateGenerator::new(Arc::new(MidpointEstimator));
        for scenario_type in ALL_TYPES {
            let candidates = generator.generate(&scenario_of(scenario_type, 2));
            assert!(candidates.len() >= 2, "{scenario_type}");
            assert_eq!(candidates[0].approach, Approach::Standard);
            assert_eq!(candidates[0].base_profit, Decimal::ZERO);
            assert_eq!(candidates[0].confidence, 0.7);
        }
    }

    #[test]
    fn traffic_yields_three_candidates_in_dispatch_order() {
        let generator = CandidateGenerator::new(Arc::new(MidpointEstimator));
        let candidates = generator.generate(&scenario_of(ScenarioType::TrafficDisruption, 5));
        let approaches: Vec<Approach> = candidates.iter().map(|c| c.approach).collect();
        assert_eq!(
            approaches,
            vec![
                Approach::Standard,
                Approach::ProactiveRerouting,
                Approach::FleetOptimization
            ]
        );
        assert_eq!(candidates[1].base_profit, dec!(75));
        assert_eq!(candidates[1].actions.len(), 4);
    }

    #[test]
    fn general_and_environmental_get_innovation() {
        for scenario_type in [ScenarioType::Environmental, ScenarioType::GeneralDisruption] {
            assert_eq!(variants_for(scenario_type), &[Approach::InnovationFocused]);
        }
    }

    #[test]
    fn profits_stay_within_variant_ranges() {
        let generator = CandidateGenerator::new(Arc::new(RandomEstimator::seeded(11)));
        for _ in 0..50 {
            for scenario_type in ALL_TYPES {
                for candidate in generator.generate(&scenario_of(scenario_type, 3)) {
                    let (lo, hi) = profile(candidate.approach).profit;
                    let profit = to_money(lo)..=to_money(hi);
                    assert!(profit.contains(&candidate.base_profit));
                    assert!((0.0..=1.0).contains(&candidate.confidence));
                }
            }
        }
    }
}
