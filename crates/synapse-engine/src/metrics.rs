use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use rust_decimal::Decimal;
use synapse_models::{
    Approach, ApproachStats, OptimizationRecord, OptimizationStats, PerformanceMetrics, Solution,
};

use crate::error::EngineError;

const BASE_ACCURACY: f64 = 0.85;
const MAX_ACCURACY_IMPROVEMENT: f64 = 0.15;
const ACCURACY_STEP: f64 = 0.001;

/// Records kept by the optimization ledger.
pub const LEDGER_CAPACITY: usize = 1000;

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, EngineError> {
    mutex
        .lock()
        .map_err(|e| EngineError::Unavailable(format!("{what} mutex poisoned: {e}")))
}

/// Synthetic accuracy after `total` resolutions: bounded and non-decreasing.
pub fn accuracy_after(total: u64) -> f64 {
    BASE_ACCURACY + MAX_ACCURACY_IMPROVEMENT.min(total as f64 * ACCURACY_STEP)
}

/// Running aggregates over every resolution, hits included.
#[derive(Default)]
pub struct MetricsAggregator {
    state: Mutex<PerformanceMetrics>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, solution: &Solution) -> Result<(), EngineError> {
        let mut metrics = lock(&self.state, "metrics")?;
        metrics.total_scenarios += 1;
        if solution.cache_hit {
            metrics.cache_hits += 1;
        }
        let n = metrics.total_scenarios as f64;
        metrics.average_response_time =
            (metrics.average_response_time * (n - 1.0) + solution.execution_time_seconds) / n;
        metrics.total_profit_generated += solution.predicted_profit;
        metrics.accuracy_rate = accuracy_after(metrics.total_scenarios);
        Ok(())
    }

    pub fn snapshot(&self) -> Result<PerformanceMetrics, EngineError> {
        Ok(lock(&self.state, "metrics")?.clone())
    }

    /// Operator reset. Nothing in the pipeline calls this.
    pub fn reset(&self) -> Result<(), EngineError> {
        *lock(&self.state, "metrics")? = PerformanceMetrics::default();
        Ok(())
    }
}

#[derive(Default)]
struct LedgerState {
    records: VecDeque<OptimizationRecord>,
    stats: OptimizationStats,
}

/// History of computed (cache-miss) resolutions and their ROI.
#[derive(Default)]
pub struct OptimizationLedger {
    state: Mutex<LedgerState>,
}

impl OptimizationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, record: OptimizationRecord) -> Result<(), EngineError> {
        let mut state = lock(&self.state, "ledger")?;
        let stats = &mut state.stats;
        stats.total_optimizations += 1;
        if record.roi_percentage > Decimal::ZERO {
            stats.successful_optimizations += 1;
        }
        stats.total_profit_generated += record.total_profit;
        let n = Decimal::from(stats.total_optimizations);
        stats.average_roi =
            ((stats.average_roi * (n - Decimal::ONE) + record.roi_percentage) / n).round_dp(2);

        if state.records.len() == LEDGER_CAPACITY {
            state.records.pop_front();
        }
        state.records.push_back(record);
        Ok(())
    }

    pub fn stats(&self) -> Result<OptimizationStats, EngineError> {
        Ok(lock(&self.state, "ledger")?.stats.clone())
    }

    /// The last `limit` records, oldest first.
    pub fn history(&self, limit: usize) -> Result<Vec<OptimizationRecord>, EngineError> {
        let state = lock(&self.state, "ledger")?;
        let skip = state.records.len().saturating_sub(limit);
        Ok(state.records.iter().skip(skip).cloned().collect())
    }

    /// Approaches ranked by average ROI over the retained records.
    pub fn top_approaches(&self, limit: usize) -> Result<Vec<ApproachStats>, EngineError> {
        let state = lock(&self.state, "ledger")?;

        let mut groups: Vec<(Approach, Decimal, u64)> = Vec::new();
        for record in &state.records {
            match groups.iter_mut().find(|(a, _, _)| *a == record.approach) {
                Some((_, sum, count)) => {
                    *sum += record.roi_percentage;
                    *count += 1;
                }
                None => groups.push((record.approach, record.roi_percentage, 1)),
            }
        }

        let mut ranked: Vec<ApproachStats> = groups
            .into_iter()
            .map(|(approach, sum, count)| ApproachStats {
                approach,
                average_roi: (sum / Decimal::from(count)).round_dp(2),
                usage_count: count,
            })
            .collect();
        ranked.sort_by(|a, b| b.average_roi.cmp(&a.average_roi));
        ranked.truncate(limit);
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use synapse_models::ScenarioType;

    fn record(approach: Approach, roi: Decimal, profit: Decimal) -> OptimizationRecord {
        OptimizationRecord {
            timestamp: Utc::now(),
            scenario_id: "abc".to_string(),
            scenario_type: ScenarioType::TrafficDisruption,
            approach,
            roi_percentage: roi,
            total_profit: profit,
            execution_time_seconds: 0.01,
            affected_units: 2,
        }
    }

    #[test]
    fn accuracy_is_bounded_and_monotone() {
        let mut previous = accuracy_after(0);
        assert_eq!(previous, 0.85);
        for n in 1..500 {
            let current = accuracy_after(n);
            assert!(current >= previous);
            assert!(current <= 1.0);
            previous = current;
        }
        assert!((accuracy_after(10_000) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn ledger_stats_and_history() {
        let ledger = OptimizationLedger::new();
        ledger
            .record(record(Approach::PremiumCustomer, dec!(300), dec!(120)))
            .unwrap();
        ledger
            .record(record(Approach::Standard, dec!(-50), dec!(5)))
            .unwrap();

        let stats = ledger.stats().unwrap();
        assert_eq!(stats.total_optimizations, 2);
        assert_eq!(stats.successful_optimizations, 1);
        assert_eq!(stats.total_profit_generated, dec!(125));
        assert_eq!(stats.average_roi, dec!(125));

        let history = ledger.history(1).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].approach, Approach::Standard);
    }

    #[test]
    fn ledger_keeps_last_thousand() {
        let ledger = OptimizationLedger::new();
        for i in 0..(LEDGER_CAPACITY + 5) {
            ledger
                .record(record(Approach::Standard, Decimal::from(i), dec!(1)))
                .unwrap();
        }
        let history = ledger.history(usize::MAX).unwrap();
        assert_eq!(history.len(), LEDGER_CAPACITY);
        assert_eq!(history[0].roi_percentage, dec!(5));
        assert_eq!(
            ledger.stats().unwrap().total_optimizations,
            (LEDGER_CAPACITY + 5) as u64
        );
    }

    #[test]
    fn top_approaches_ranked_by_average_roi() {
        let ledger = OptimizationLedger::new();
        ledger
            .record(record(Approach::FleetOptimization, dec!(100), dec!(1)))
            .unwrap();
        ledger
            .record(record(Approach::ProactiveRerouting, dec!(400), dec!(1)))
            .unwrap();
        ledger
            .record(record(Approach::FleetOptimization, dec!(300), dec!(1)))
            .unwrap();

        let top = ledger.top_approaches(5).unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].approach, Approach::ProactiveRerouting);
        assert_eq!(top[1].approach, Approach::FleetOptimization);
        assert_eq!(top[1].average_roi, dec!(200));
        assert_eq!(top[1].usage_count, 2);

        assert_eq!(ledger.top_approaches(1).unwrap().len(), 1);
    }
}
