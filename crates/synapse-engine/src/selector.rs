use synapse_models::EvaluatedCandidate;

/// Pick the candidate with the highest ROI percentage. Ties go to the
/// earliest candidate in generation order.
///
/// # Panics
///
/// Panics if `candidates` is empty. The generator never produces an empty set,
/// so an empty input is a caller bug.
pub fn select(mut candidates: Vec<EvaluatedCandidate>) -> EvaluatedCandidate {
    assert!(
        !candidates.is_empty(),
        "select called with no evaluated candidates"
    );
    // sort_by is stable, so equal ROIs keep their generation order.
    candidates.sort_by(|a, b| b.roi.roi_percentage.cmp(&a.roi.roi_percentage));
    candidates.swap_remove(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use synapse_models::{Approach, Candidate, RoiAnalysis};

    fn evaluated(approach: Approach, roi_percentage: Decimal) -> EvaluatedCandidate {
        EvaluatedCandidate {
            candidate: Candidate {
                approach,
                actions: vec![],
                base_profit: Decimal::ZERO,
                confidence: 0.8,
            },
            roi: RoiAnalysis {
                immediate_profit: Decimal::ZERO,
                long_term_profit: Decimal::ZERO,
                operational_cost: Decimal::TEN,
                brand_impact: Decimal::ZERO,
                customer_value_impact: Decimal::ZERO,
                total_profit: Decimal::ZERO,
                total_cost: Decimal::TEN,
                roi_percentage,
                payback_days: None,
            },
        }
    }

    #[test]
    fn picks_highest_roi() {
        let winner = select(vec![
            evaluated(Approach::Standard, dec!(-100)),
            evaluated(Approach::PremiumCustomer, dec!(310.5)),
            evaluated(Approach::RetentionFocused, dec!(120)),
        ]);
        assert_eq!(winner.candidate.approach, Approach::PremiumCustomer);
    }

    #[test]
    fn ties_keep_generation_order() {
        let winner = select(vec![
            evaluated(Approach::Standard, dec!(12.0)),
            evaluated(Approach::ProactiveRerouting, dec!(45.5)),
            evaluated(Approach::FleetOptimization, dec!(45.5)),
        ]);
        assert_eq!(winner.candidate.approach, Approach::ProactiveRerouting);
    }

    #[test]
    fn single_candidate_is_returned() {
        let winner = select(vec![evaluated(Approach::Standard, dec!(-100))]);
        assert_eq!(winner.candidate.approach, Approach::Standard);
    }

    #[test]
    #[should_panic(expected = "no evaluated candidates")]
    fn empty_input_is_a_bug() {
        select(Vec::new());
    }
}
