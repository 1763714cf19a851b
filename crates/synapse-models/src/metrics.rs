use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::candidate::Approach;
use crate::scenario::ScenarioType;

/// Process-wide resolution aggregates.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerformanceMetrics {
    pub total_scenarios: u64,
    pub cache_hits: u64,
    /// Incremental mean of `execution_time_seconds`.
    pub average_response_time: f64,
    pub total_profit_generated: Decimal,
    pub accuracy_rate: f64,
}

impl PerformanceMetrics {
    pub fn cache_hit_rate(&self) -> f64 {
        self.cache_hits as f64 / self.total_scenarios.max(1) as f64
    }
}

/// One computed (cache-miss) resolution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizationRecord {
    pub timestamp: DateTime<Utc>,
    pub scenario_id: String,
    pub scenario_type: ScenarioType,
    pub approach: Approach,
    pub roi_percentage: Decimal,
    pub total_profit: Decimal,
    pub execution_time_seconds: f64,
    pub affected_units: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OptimizationStats {
    pub total_optimizations: u64,
    /// Optimizations whose winner had a positive ROI.
    pub successful_optimizations: u64,
    pub total_profit_generated: Decimal,
    pub average_roi: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApproachStats {
    pub approach: Approach,
    pub average_roi: Decimal,
    pub usage_count: u64,
}

/// Dashboard view over the result cache and metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheStatus {
    pub total_cached_solutions: usize,
    pub cache_hit_rate: f64,
    pub average_response_time: f64,
    pub prediction_accuracy: f64,
}
