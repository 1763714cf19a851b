use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use synapse_cache::HotCache;
use synapse_models::cache_schema::key_patterns;
use synapse_models::{SignalContext, SignalKind, SignalReading, WeatherCondition};
use tracing::{debug, error, warn};

use crate::error::EngineError;
use crate::estimator::Estimator;

/// An environment probe. Mockable for testing.
#[async_trait]
pub trait SignalSource: Send + Sync {
    fn kind(&self) -> SignalKind;

    /// Read the current signal for `subject` (a scenario id or location).
    async fn probe(&self, subject: &str) -> Result<SignalReading, EngineError>;
}

const WEATHER_CONDITIONS: [WeatherCondition; 5] = [
    WeatherCondition::Clear,
    WeatherCondition::Cloudy,
    WeatherCondition::Rain,
    WeatherCondition::Storm,
    WeatherCondition::Windy,
];

fn sentiment_label(score: f64) -> &'static str {
    if score >= 0.6 {
        "positive"
    } else if score <= 0.4 {
        "negative"
    } else {
        "neutral"
    }
}

/// Draw a bounded reading of `kind` from `estimator`.
pub fn simulate_reading(kind: SignalKind, estimator: &dyn Estimator) -> SignalReading {
    match kind {
        SignalKind::Traffic => SignalReading::Traffic {
            congestion_level: estimator.uniform(0.1, 0.9),
            incidents: estimator.range_inclusive(0, 5),
            average_speed_kmh: estimator.uniform(10.0, 40.0),
        },
        SignalKind::Weather => {
            let last = WEATHER_CONDITIONS.len() as u32 - 1;
            let index = estimator.range_inclusive(0, last).min(last) as usize;
            SignalReading::Weather {
                condition: WEATHER_CONDITIONS[index],
                precipitation_probability: estimator.uniform(0.0, 1.0),
                wind_speed_kmh: estimator.uniform(0.0, 25.0),
            }
        }
        SignalKind::Sentiment => {
            let score = estimator.uniform(0.0, 1.0);
            SignalReading::Sentiment {
                score,
                label: sentiment_label(score).to_string(),
            }
        }
        SignalKind::DriverStress => SignalReading::DriverStress {
            stress_level: estimator.uniform(0.0, 1.0),
        },
        SignalKind::Market => SignalReading::Market {
            demand_level: estimator.uniform(0.3, 1.0),
            competition_density: estimator.uniform(0.2, 0.9),
        },
    }
}

/// Stand-in probe that draws readings from the estimator.
pub struct SimulatedSignalSource {
    kind: SignalKind,
    estimator: Arc<dyn Estimator>,
    latency: Duration,
}

impl SimulatedSignalSource {
    pub fn new(kind: SignalKind, estimator: Arc<dyn Estimator>, latency: Duration) -> Self {
        Self {
            kind,
            estimator,
            latency,
        }
    }

    /// One simulated source per signal kind.
    pub fn all(estimator: Arc<dyn Estimator>, latency: Duration) -> Vec<Arc<dyn SignalSource>> {
        SignalKind::ALL
            .iter()
            .map(|kind| {
                Arc::new(Self::new(*kind, Arc::clone(&estimator), latency))
                    as Arc<dyn SignalSource>
            })
            .collect()
    }
}

#[async_trait]
impl SignalSource for SimulatedSignalSource {
    fn kind(&self) -> SignalKind {
        self.kind
    }

    async fn probe(&self, _subject: &str) -> Result<SignalReading, EngineError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(simulate_reading(self.kind, self.estimator.as_ref()))
    }
}

/// Fans out to every signal source and memoizes readings per subject.
pub struct SignalHub {
    sources: Vec<Arc<dyn SignalSource>>,
    hot: HotCache<SignalReading>,
    probe_timeout: Duration,
}

impl SignalHub {
    pub fn new(
        sources: Vec<Arc<dyn SignalSource>>,
        hot: HotCache<SignalReading>,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            sources,
            hot,
            probe_timeout,
        }
    }

    /// A hub with no sources. Every gathered context is empty (all factors neutral).
    pub fn disabled() -> Self {
        Self::new(
            Vec::new(),
            HotCache::new(1, Duration::from_secs(1)),
            Duration::from_millis(1),
        )
    }

    /// Drop every memoized reading so the next gather probes again.
    pub fn invalidate(&self) {
        self.hot.invalidate_all();
    }

    /// Probe every source concurrently, each under the probe timeout.
    /// Failed or timed-out probes are logged and left out of the context.
    pub async fn gather(&self, subject: &str) -> SignalContext {
        let mut context = SignalContext::default();
        let mut handles = Vec::new();

        for source in &self.sources {
            let key = key_patterns::signal(source.kind().as_str(), subject);
            if let Some(reading) = self.hot.get(&key).await {
                debug!(key = %key, "Signal served from hot cache");
                context.insert(reading);
                continue;
            }

            let source = Arc::clone(source);
            let subject = subject.to_string();
            let timeout = self.probe_timeout;
            handles.push(tokio::spawn(async move {
                let start = Instant::now();
                let kind = source.kind();
                let result = match tokio::time::timeout(timeout, source.probe(&subject)).await {
                    Ok(result) => result,
                    Err(_) => Err(EngineError::Timeout(
                        format!("{} probe", kind.as_str()),
                        timeout.as_millis() as u64,
                    )),
                };
                (key, kind, result, start.elapsed())
            }));
        }

        for handle in handles {
            match handle.await {
                Ok((key, kind, Ok(reading), elapsed)) => {
                    debug!(signal = kind.as_str(), elapsed_ms = elapsed.as_millis(), "Probe succeeded");
                    self.hot.insert(key, reading.clone()).await;
                    context.insert(reading);
                }
                Ok((_, kind, Err(e), elapsed)) => {
                    warn!(signal = kind.as_str(), error = %e, elapsed_ms = elapsed.as_millis(), "Probe failed");
                }
                Err(e) => {
                    error!(error = %e, "Probe task panicked");
                }
            }
        }

        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::RandomEstimator;
    use crate::test_support::{FailingSignalSource, MidpointEstimator, StaticSignalSource};

    fn hot() -> HotCache<SignalReading> {
        HotCache::new(100, Duration::from_secs(60))
    }

    #[test]
    fn simulated_readings_are_bounded() {
        let estimator = RandomEstimator::seeded(3);
        for _ in 0..200 {
            for kind in SignalKind::ALL {
                let reading = simulate_reading(kind, &estimator);
                assert_eq!(reading.kind(), kind);
                match reading {
                    SignalReading::Traffic {
                        congestion_level,
                        incidents,
                        average_speed_kmh,
                    } => {
                        assert!((0.1..=0.9).contains(&congestion_level));
                        assert!(incidents <= 5);
                        assert!((10.0..=40.0).contains(&average_speed_kmh));
                    }
                    SignalReading::Market {
                        demand_level,
                        competition_density,
                    } => {
                        assert!((0.3..=1.0).contains(&demand_level));
                        assert!((0.2..=0.9).contains(&competition_density));
                    }
                    SignalReading::Sentiment { score, label } => {
                        assert!((0.0..=1.0).contains(&score));
                        assert_eq!(label, sentiment_label(score));
                    }
                    _ => {}
                }
            }
        }
    }

    #[tokio::test]
    async fn gather_collects_every_source() {
        let estimator: Arc<dyn Estimator> = Arc::new(MidpointEstimator);
        let hub = SignalHub::new(
            SimulatedSignalSource::all(estimator, Duration::ZERO),
            hot(),
            Duration::from_millis(500),
        );
        let context = hub.gather("abc").await;
        assert_eq!(context.readings.len(), SignalKind::ALL.len());
    }

    #[tokio::test]
    async fn failed_probe_is_left_out() {
        let hub = SignalHub::new(
            vec![
                Arc::new(StaticSignalSource::new(SignalReading::DriverStress {
                    stress_level: 0.5,
                })),
                Arc::new(FailingSignalSource::new(SignalKind::Weather)),
            ],
            hot(),
            Duration::from_millis(500),
        );
        let context = hub.gather("abc").await;
        assert_eq!(context.readings.len(), 1);
        assert!(context.get(SignalKind::Weather).is_none());
    }

    #[tokio::test]
    async fn slow_probe_times_out() {
        let estimator: Arc<dyn Estimator> = Arc::new(MidpointEstimator);
        let slow: Arc<dyn SignalSource> = Arc::new(SimulatedSignalSource::new(
            SignalKind::Traffic,
            estimator,
            Duration::from_millis(200),
        ));
        let hub = SignalHub::new(vec![slow], hot(), Duration::from_millis(20));
        let context = hub.gather("abc").await;
        assert!(context.readings.is_empty());
    }

    #[tokio::test]
    async fn readings_are_memoized_per_subject() {
        let source = Arc::new(StaticSignalSource::new(SignalReading::DriverStress {
            stress_level: 0.5,
        }));
        let hub = SignalHub::new(
            vec![source.clone() as Arc<dyn SignalSource>],
            hot(),
            Duration::from_millis(500),
        );

        hub.gather("abc").await;
        hub.gather("abc").await;
        assert_eq!(source.probe_count(), 1);

        hub.gather("other").await;
        assert_eq!(source.probe_count(), 2);
    }

    #[tokio::test]
    async fn disabled_hub_is_neutral() {
        let context = SignalHub::disabled().gather("abc").await;
        assert!(context.readings.is_empty());
        assert_eq!(context.brand_factor(), 1.0);
    }
}
