/*!
 * # Regression Forecaster
 *
 * Statistical rupture forecasting: a history source feeds an ordinary
 * least-squares fit, whose slope and residual variance drive the rupture
 * estimate, its 95% confidence interval, risk classification, and reorder
 * recommendation.
 */

/// History source seam; ships with a seedable simulator.
pub mod history;

/// Ordinary least-squares regression over quantity samples.
pub mod regression;

/// Rupture time, confidence interval, risk level, and batch prediction.
pub mod forecasting;

pub use forecasting::RuptureForecaster;
pub use history::{HistoryProvider, SimulatedHistoryProvider};
pub use regression::fit_linear_regression;
