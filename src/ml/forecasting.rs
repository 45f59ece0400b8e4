use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, instrument, warn};

use crate::config::{ForecastConfig, SimulationConfig};
use crate::errors::AnalyticsResult;
use crate::ml::history::{HistoryProvider, SimulatedHistoryProvider};
use crate::ml::regression::fit_linear_regression;
use crate::models::prediction::{RiskLevel, StockPrediction};
use crate::models::stock::Stock;

/// Regression-based rupture forecaster. Generic over the history source so
/// tests and future telemetry backends can supply exact series.
pub struct RuptureForecaster<P: HistoryProvider = SimulatedHistoryProvider> {
    config: ForecastConfig,
    history: P,
}

impl RuptureForecaster<SimulatedHistoryProvider> {
    pub fn new() -> Self {
        Self::with_config(ForecastConfig::default(), SimulationConfig::default())
    }

    pub fn with_config(config: ForecastConfig, simulation: SimulationConfig) -> Self {
        Self {
            config,
            history: SimulatedHistoryProvider::with_config(simulation),
        }
    }
}

impl Default for RuptureForecaster<SimulatedHistoryProvider> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: HistoryProvider> RuptureForecaster<P> {
    pub fn with_provider(config: ForecastConfig, history: P) -> Self {
        Self { config, history }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Days until the fitted line crosses zero. Flat or replenishing
    /// slopes, and predictions outside the forecast horizon, yield `None`.
    pub fn rupture_time(&self, quantity: f64, slope: f64) -> Option<i64> {
        if slope >= -self.config.flat_slope_epsilon {
            return None;
        }
        let days = -quantity / slope;
        if days < 0.0 || days > self.config.max_horizon_days {
            return None;
        }
        Some(days.floor() as i64)
    }

    /// 95% interval around a rupture prediction, in days. The pessimistic
    /// bound never goes negative.
    pub fn confidence_interval(&self, prediction: i64, variance: f64, slope: f64) -> (i64, i64) {
        let std_dev = variance.sqrt();
        let error_margin_days = self.config.confidence_z * std_dev / slope.abs();

        let pessimistic = (prediction as f64 - error_margin_days).floor().max(0.0) as i64;
        let optimistic = (prediction as f64 + error_margin_days).ceil() as i64;
        (pessimistic, optimistic)
    }

    /// Reorder date leaving lead time plus a safety margin before the
    /// predicted rupture; dates already behind us collapse to `now`.
    pub fn reorder_date(
        &self,
        rupture_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let rupture = rupture_date?;
        let advance = Duration::days(self.config.lead_time_days + self.config.safety_margin_days);
        let date = rupture - advance;
        Some(if date < now { now } else { date })
    }

    /// Runs the full pipeline for one stock: history, regression, rupture
    /// estimate, interval, risk level, and reorder recommendation.
    pub fn predict(&self, stock: &Stock) -> AnalyticsResult<StockPrediction> {
        let points = self.history.history(stock, self.config.history_days)?;
        let fit = fit_linear_regression(&points)?;

        let now = Utc::now();
        let days_until_rupture = self.rupture_time(stock.quantity, fit.slope);

        let (pessimistic, optimistic) = match days_until_rupture {
            Some(prediction) => {
                let (p, o) = self.confidence_interval(prediction, fit.variance, fit.slope);
                (Some(p), Some(o))
            }
            None => (None, None),
        };

        let date_of_rupture = days_until_rupture.map(|d| now + Duration::days(d));
        let risk_level = RiskLevel::from_days(days_until_rupture);
        let recommended_reorder_date = self.reorder_date(date_of_rupture, now);

        let max = stock.max_threshold_or_default();
        let target = max * self.config.reorder_target_ratio;
        let recommended_reorder_quantity = (target - stock.quantity).ceil().max(0.0) as u32;

        debug!(
            stock = %stock.id,
            slope = fit.slope,
            days = ?days_until_rupture,
            risk = %risk_level,
            "predicted stock rupture"
        );

        Ok(StockPrediction {
            stock_id: stock.id.clone(),
            stock_name: stock.name.clone(),
            current_quantity: stock.quantity,
            days_until_rupture,
            date_of_rupture,
            days_until_rupture_pessimistic: pessimistic,
            days_until_rupture_optimistic: optimistic,
            daily_consumption_rate: (-fit.slope).max(0.0),
            confidence: fit.confidence.round(),
            risk_level,
            recommended_reorder_date,
            recommended_reorder_quantity,
        })
    }

    /// Predicts every stock, dropping the ones whose regression fails
    /// rather than aborting the batch, and returns the result ordered most
    /// severe first (ties broken by the shorter rupture estimate).
    #[instrument(skip_all, fields(stocks = stocks.len()))]
    pub fn predict_all(&self, stocks: &[Stock]) -> Vec<StockPrediction> {
        let mut predictions: Vec<StockPrediction> = stocks
            .iter()
            .filter_map(|stock| match self.predict(stock) {
                Ok(prediction) => Some(prediction),
                Err(err) => {
                    warn!(stock = %stock.id, error = %err, "skipping stock in batch prediction");
                    None
                }
            })
            .collect();

        predictions.sort_by(|a, b| {
            a.risk_level
                .severity_rank()
                .cmp(&b.risk_level.severity_rank())
                .then_with(
                    || match (a.days_until_rupture, b.days_until_rupture) {
                        (Some(x), Some(y)) => x.cmp(&y),
                        _ => Ordering::Equal,
                    },
                )
        });
        predictions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forecaster() -> RuptureForecaster<SimulatedHistoryProvider> {
        RuptureForecaster::new()
    }

    #[test]
    fn rupture_time_matches_linear_depletion() {
        assert_eq!(forecaster().rupture_time(100.0, -10.0), Some(10));
    }

    #[test]
    fn flat_or_replenishing_slopes_never_rupture() {
        let forecaster = forecaster();
        assert_eq!(forecaster.rupture_time(100.0, 0.0), None);
        assert_eq!(forecaster.rupture_time(100.0, 0.5), None);
        assert_eq!(forecaster.rupture_time(100.0, -0.009), None);
    }

    #[test]
    fn predictions_beyond_the_horizon_are_discarded() {
        // 400 days out at this rate
        assert_eq!(forecaster().rupture_time(400.0, -1.0), None);
    }

    #[test]
    fn interval_brackets_the_prediction() {
        let (pessimistic, optimistic) = forecaster().confidence_interval(10, 4.0, -2.0);
        // margin = 1.96 * 2 / 2 = 1.96 days
        assert_eq!(pessimistic, 8);
        assert_eq!(optimistic, 12);
        assert!(pessimistic <= 10 && 10 <= optimistic);
    }

    #[test]
    fn pessimistic_bound_never_goes_negative() {
        let (pessimistic, _) = forecaster().confidence_interval(1, 10_000.0, -0.5);
        assert_eq!(pessimistic, 0);
    }

    #[test]
    fn reorder_date_leaves_lead_time_before_rupture() {
        let forecaster = forecaster();
        let now = Utc::now();
        let rupture = now + Duration::days(20);

        let date = forecaster.reorder_date(Some(rupture), now).unwrap();
        assert_eq!(date, rupture - Duration::days(7));
    }

    #[test]
    fn imminent_rupture_means_reorder_now() {
        let forecaster = forecaster();
        let now = Utc::now();
        let rupture = now + Duration::days(3);

        // 3 - 7 days is in the past, so the recommendation collapses to now
        let date = forecaster.reorder_date(Some(rupture), now).unwrap();
        assert_eq!(date, now);
    }

    #[test]
    fn no_rupture_means_no_reorder_date() {
        assert_eq!(forecaster().reorder_date(None, Utc::now()), None);
    }
}
