use std::sync::Arc;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use synapse_models::{
    ActionKind, Approach, Candidate, EvaluatedCandidate, RoiAnalysis, Scenario, SignalContext,
};

use crate::estimator::Estimator;

/// Flat cost every plan pays once, regardless of affected units.
pub const BASE_OPERATIONAL_COST: Decimal = Decimal::TEN;

const PROJECTION_DAYS: i64 = 30;
const PAYBACK_CAP_DAYS: i64 = 365;

/// Round an estimate to cents.
pub(crate) fn to_money(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(2)
}

/// Per-unit fee of one action. Kinds without a fee cost nothing.
pub fn action_cost(kind: ActionKind) -> Decimal {
    let fee = match kind {
        ActionKind::Compensation => 15,
        ActionKind::PriorityStatus => 5,
        ActionKind::PersonalApology => 8,
        ActionKind::FutureDiscount => 20,
        ActionKind::LoyaltyPoints => 12,
        ActionKind::QualityAssurance => 6,
        ActionKind::IncentiveBonus => 25,
        ActionKind::TrainingOpportunity => 15,
        ActionKind::TechnologyUpgrade => 30,
        ActionKind::ProcessImprovement => 18,
        _ => 0,
    };
    Decimal::from(fee)
}

/// `BASE_OPERATIONAL_COST + sum(action fees) * max(1, affected_units)`.
pub fn operational_cost(candidate: &Candidate, affected_units: u32) -> Decimal {
    let action_total: Decimal = candidate
        .actions
        .iter()
        .map(|action| action_cost(action.kind))
        .sum();
    BASE_OPERATIONAL_COST + action_total * Decimal::from(affected_units.max(1))
}

/// ROI as a percentage.
///
/// Divides by `max(total_cost, 1)` when there is any cost, so costs below 1
/// are treated as 1. A cost-free plan reports its profit times 100.
pub fn roi_percentage(total_profit: Decimal, total_cost: Decimal) -> Decimal {
    let ratio = if total_cost > Decimal::ZERO {
        (total_profit - total_cost) / total_cost.max(Decimal::ONE)
    } else {
        total_profit
    };
    (ratio * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Days until `total_cost` is recovered from the 30-day long-term profit.
/// `None` when the plan never pays back; otherwise at most 365.
pub fn payback_days(total_cost: Decimal, long_term_profit: Decimal) -> Option<Decimal> {
    if long_term_profit <= Decimal::ZERO {
        return None;
    }
    let daily = long_term_profit / Decimal::from(PROJECTION_DAYS);
    let days = total_cost.checked_div(daily)?;
    Some(days.min(Decimal::from(PAYBACK_CAP_DAYS)).round_dp(2))
}

fn customer_value_multiplier(approach: Approach) -> (f64, f64) {
    match approach {
        Approach::PremiumCustomer => (1.3, 1.8),
        Approach::RetentionFocused => (1.2, 1.5),
        Approach::DriverSupport => (1.1, 1.4),
        _ => (1.0, 1.3),
    }
}

fn brand_multiplier(approach: Approach) -> (f64, f64) {
    match approach {
        Approach::PremiumCustomer | Approach::DriverSupport => (1.4, 1.9),
        Approach::RetentionFocused | Approach::ProactiveRerouting => (1.2, 1.6),
        _ => (1.0, 1.3),
    }
}

/// Uplift of `baseline * multiplier` over a year, projected onto 30 days.
fn projection(baseline: f64, multiplier: f64) -> f64 {
    (baseline * multiplier - baseline) / 365.0 * PROJECTION_DAYS as f64
}

/// Computes the profit/cost breakdown of candidate plans.
pub struct RoiEvaluator {
    estimator: Arc<dyn Estimator>,
}

impl RoiEvaluator {
    pub fn new(estimator: Arc<dyn Estimator>) -> Self {
        Self { estimator }
    }

    pub fn evaluate(
        &self,
        candidate: &Candidate,
        scenario: &Scenario,
        signals: &SignalContext,
    ) -> RoiAnalysis {
        let immediate_profit = candidate.base_profit;

        let customer_baseline =
            self.estimator.uniform(200.0, 800.0) * signals.customer_value_factor();
        let (lo, hi) = customer_value_multiplier(candidate.approach);
        let customer_value_impact =
            to_money(projection(customer_baseline, self.estimator.uniform(lo, hi)));

        let brand_baseline = self.estimator.uniform(50.0, 150.0) * signals.brand_factor();
        let (lo, hi) = brand_multiplier(candidate.approach);
        let brand_impact = to_money(projection(brand_baseline, self.estimator.uniform(lo, hi)));

        let long_term_profit = customer_value_impact + brand_impact;
        let operational_cost = operational_cost(candidate, scenario.affected_units);
        let total_profit = immediate_profit + long_term_profit;
        let total_cost = operational_cost;

        RoiAnalysis {
            immediate_profit,
            long_term_profit,
            operational_cost,
            brand_impact,
            customer_value_impact,
            total_profit,
            total_cost,
            roi_percentage: roi_percentage(total_profit, total_cost),
            payback_days: payback_days(total_cost, long_term_profit),
        }
    }

    /// Evaluate every candidate, keeping generation order.
    pub fn evaluate_all(
        &self,
        candidates: Vec<Candidate>,
        scenario: &Scenario,
        signals: &SignalContext,
    ) -> Vec<EvaluatedCandidate> {
        candidates
            .into_iter()
            .map(|candidate| {
                let roi = self.evaluate(&candidate, scenario, signals);
                EvaluatedCandidate { candidate, roi }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile;
    use crate::test_support::{scenario_of, MidpointEstimator};
    use rust_decimal_macros::dec;
    use synapse_models::{Action, ScenarioType, SignalReading};

    fn candidate(approach: Approach) -> Candidate {
        Candidate {
            approach,
            actions: profile(approach)
                .actions
                .iter()
                .map(|(kind, description)| Action::new(*kind, description))
                .collect(),
            base_profit: dec!(90),
            confidence: 0.9,
        }
    }

    #[test]
    fn cost_scales_with_units_but_not_base() {
        let premium = candidate(Approach::PremiumCustomer);
        // compensation 15 + priority 5 + apology 8 + discount 20
        assert_eq!(operational_cost(&premium, 1), dec!(58));
        assert_eq!(operational_cost(&premium, 5), dec!(250));
        assert_eq!(operational_cost(&premium, 0), dec!(58));
    }

    #[test]
    fn cost_is_monotone_in_units() {
        for approach in [
            Approach::Standard,
            Approach::PremiumCustomer,
            Approach::DriverSupport,
            Approach::InnovationFocused,
        ] {
            let c = candidate(approach);
            assert!(operational_cost(&c, 1) <= operational_cost(&c, 5));
        }
    }

    #[test]
    fn unknown_and_missing_actions_cost_nothing() {
        let mut bare = candidate(Approach::Standard);
        bare.actions.clear();
        assert_eq!(operational_cost(&bare, 4), BASE_OPERATIONAL_COST);

        bare.actions
            .push(Action::new(ActionKind::Unknown, "Something new"));
        assert_eq!(operational_cost(&bare, 4), BASE_OPERATIONAL_COST);
    }

    #[test]
    fn roi_with_cost() {
        assert_eq!(roi_percentage(dec!(150), dec!(50)), dec!(200));
        assert_eq!(roi_percentage(dec!(10), dec!(40)), dec!(-75));
    }

    #[test]
    fn roi_without_cost_is_profit_times_hundred() {
        // Known quirk: a cost-free plan reports total_profit * 100.
        assert_eq!(roi_percentage(dec!(12.5), Decimal::ZERO), dec!(1250));
    }

    #[test]
    fn roi_with_fractional_cost_divides_by_one() {
        // Known quirk: max(total_cost, 1) treats costs below 1 as 1.
        assert_eq!(roi_percentage(dec!(10.5), dec!(0.5)), dec!(1000));
    }

    #[test]
    fn payback_never_when_long_term_non_positive() {
        assert_eq!(payback_days(dec!(50), Decimal::ZERO), None);
        assert_eq!(payback_days(dec!(50), dec!(-3)), None);
    }

    #[test]
    fn payback_is_capped() {
        assert_eq!(payback_days(dec!(30), dec!(30)), Some(dec!(30)));
        assert_eq!(payback_days(dec!(10000), dec!(1)), Some(dec!(365)));
    }

    #[test]
    fn evaluate_with_midpoint_draws() {
        let evaluator = RoiEvaluator::new(Arc::new(MidpointEstimator));
        let scenario = scenario_of(ScenarioType::TrafficDisruption, 1);
        let c = candidate(Approach::ProactiveRerouting);
        let roi = evaluator.evaluate(&c, &scenario, &SignalContext::default());

        // customer: 500 * 1.15 uplift -> 75/365*30; brand: 100 * 1.4 -> 40/365*30
        assert_eq!(roi.customer_value_impact, dec!(6.16));
        assert_eq!(roi.brand_impact, dec!(3.29));
        assert_eq!(roi.long_term_profit, dec!(9.45));
        assert_eq!(roi.operational_cost, BASE_OPERATIONAL_COST);
        assert_eq!(roi.total_profit, dec!(99.45));
        assert_eq!(roi.total_cost, dec!(10));
        assert_eq!(roi.roi_percentage, dec!(894.50));
        assert!(roi.payback_days.is_some());
        assert!(roi.payback_days.unwrap() <= dec!(365));
    }

    #[test]
    fn signals_scale_baselines() {
        let evaluator = RoiEvaluator::new(Arc::new(MidpointEstimator));
        let scenario = scenario_of(ScenarioType::CustomerIssue, 1);
        let c = candidate(Approach::RetentionFocused);

        let neutral = evaluator.evaluate(&c, &scenario, &SignalContext::default());

        let mut hostile = SignalContext::default();
        hostile.insert(SignalReading::Sentiment {
            score: 0.0,
            label: "negative".to_string(),
        });
        let scaled = evaluator.evaluate(&c, &scenario, &hostile);

        assert!(scaled.customer_value_impact < neutral.customer_value_impact);
        assert_eq!(scaled.brand_impact, neutral.brand_impact);
    }
}
