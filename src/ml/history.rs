use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::SimulationConfig;
use crate::errors::AnalyticsResult;
use crate::models::prediction::DataPoint;
use crate::models::stock::{Stock, StockStatus};

/// Source of historical quantity samples for a stock, oldest first.
///
/// The production deployment has no consumption-event stream yet, so the
/// default implementation simulates one; a real telemetry-backed source
/// can be swapped in without touching the regression or prediction logic.
pub trait HistoryProvider {
    fn history(&self, stock: &Stock, days: u32) -> AnalyticsResult<Vec<DataPoint>>;
}

/// Synthesizes a plausible depletion series ending at the stock's actual
/// current quantity. The walk starts `days` ago above the current level
/// and steps down by a status-dependent rate with uniform noise.
pub struct SimulatedHistoryProvider {
    config: SimulationConfig,
    seed: Option<u64>,
}

impl SimulatedHistoryProvider {
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        Self { config, seed: None }
    }

    /// Fixes the random seed so repeated calls produce identical series.
    /// Unseeded providers draw from entropy.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn estimated_days_to_deplete(&self, status: StockStatus) -> f64 {
        match status {
            StockStatus::Critical => self.config.depletion_days_critical,
            StockStatus::Low => self.config.depletion_days_low,
            StockStatus::Overstocked => self.config.depletion_days_overstocked,
            _ => self.config.depletion_days_default,
        }
    }
}

impl Default for SimulatedHistoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryProvider for SimulatedHistoryProvider {
    fn history(&self, stock: &Stock, days: u32) -> AnalyticsResult<Vec<DataPoint>> {
        // Fresh RNG per call: batch predictions stay reproducible under a
        // fixed seed and share no state across threads.
        let mut rng: StdRng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let min = stock.min_threshold_or_default();
        let max = stock.max_threshold_or_default();

        let estimate = self.estimated_days_to_deplete(stock.status);
        let rate = (max - min) / estimate;
        // abs keeps the sample range valid even for inverted thresholds
        let noise = (rate * self.config.noise_ratio).abs();

        let start_quantity =
            (stock.quantity + rate * days as f64).min(max * self.config.start_headroom_ratio);
        let floor = min * self.config.floor_ratio;
        let ceiling = (max * self.config.ceiling_ratio).max(floor);

        let now = Utc::now();
        let mut points = Vec::with_capacity(days as usize + 1);
        let mut level = start_quantity;

        for i in 0..days {
            points.push(DataPoint {
                timestamp: now - Duration::days((days - i) as i64),
                quantity: level,
            });
            let jitter = rng.gen_range(-noise / 2.0..=noise / 2.0);
            level = (level - (rate + jitter)).clamp(floor, ceiling);
        }

        // The series always ends on the observed quantity.
        points.push(DataPoint {
            timestamp: now,
            quantity: stock.quantity,
        });

        debug!(
            stock = %stock.id,
            days,
            rate,
            start_quantity,
            "simulated consumption history"
        );
        Ok(points)
    }
}
