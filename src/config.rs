use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use validator::Validate;

use crate::models::stock::{DEFAULT_MAX_THRESHOLD, DEFAULT_MIN_THRESHOLD};

const CONFIG_DIR: &str = "config";
const DEFAULT_ENV: &str = "development";

/// Tuning knobs for the trend/suggestion engine. Defaults reproduce the
/// production heuristics; override via `config/analytics.*` or
/// `ANALYTICS__SUGGESTION__*` environment variables.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SuggestionConfig {
    /// Reorder bound applied when a stock carries no min threshold.
    #[serde(default = "default_min_threshold")]
    #[validate(range(min = 0.0))]
    pub default_min_threshold: f64,

    /// Reorder bound applied when a stock carries no max threshold.
    #[serde(default = "default_max_threshold")]
    #[validate(range(min = 0.0))]
    pub default_max_threshold: f64,

    /// Baseline daily consumption as a fraction of the max threshold.
    #[serde(default = "default_base_consumption_ratio")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub base_consumption_ratio: f64,

    /// Consumption multiplier when the quantity sits below the midpoint.
    #[serde(default = "default_below_midpoint_factor")]
    #[validate(range(min = 0.0))]
    pub below_midpoint_factor: f64,

    /// Consumption multiplier when the quantity sits at or above the midpoint.
    #[serde(default = "default_above_midpoint_factor")]
    #[validate(range(min = 0.0))]
    pub above_midpoint_factor: f64,

    /// Relative position below which consumption reads as increasing.
    #[serde(default = "default_low_position_ratio")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub low_position_ratio: f64,

    /// Relative position above which consumption reads as decreasing.
    #[serde(default = "default_high_position_ratio")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub high_position_ratio: f64,

    /// Base trend confidence before the deviation bonus.
    #[serde(default = "default_base_confidence")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub base_confidence: f64,

    /// Stocks below this trend confidence are skipped entirely.
    #[serde(default = "default_min_confidence")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub min_confidence: f64,

    /// Rupture predictions within this many days raise an alert.
    #[serde(default = "default_rupture_alert_days")]
    #[validate(range(min = 0))]
    pub rupture_alert_days: i64,

    /// Fraction of the predicted runway removed per unit of volatility.
    #[serde(default = "default_volatility_penalty")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub volatility_penalty: f64,

    /// Overstock triggers above `max_threshold * overstock_ratio`.
    #[serde(default = "default_overstock_ratio")]
    #[validate(range(min = 1.0))]
    pub overstock_ratio: f64,

    /// Excess ratio above which overstock is flagged high priority.
    #[serde(default = "default_overstock_high_ratio")]
    #[validate(range(min = 1.0))]
    pub overstock_high_ratio: f64,

    /// Reorder triggers below `min_threshold * reorder_ratio`.
    #[serde(default = "default_reorder_ratio")]
    #[validate(range(min = 0.0))]
    pub reorder_ratio: f64,

    /// Volatility above which threshold optimization is considered.
    #[serde(default = "default_volatility_threshold")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub volatility_threshold: f64,

    /// Minimum trend confidence for threshold optimization.
    #[serde(default = "default_optimize_min_confidence")]
    #[validate(range(min = 0.0, max = 100.0))]
    pub optimize_min_confidence: f64,

    /// Supplier lead time in days, used for reorder sizing.
    #[serde(default = "default_lead_time_days")]
    #[validate(range(min = 0.0))]
    pub lead_time_days: f64,

    /// Safety stock as a fraction of lead-time demand.
    #[serde(default = "default_safety_stock_ratio")]
    #[validate(range(min = 0.0))]
    pub safety_stock_ratio: f64,

    /// Simulated storage cost, euros per unit per month.
    #[serde(default = "default_storage_cost_per_unit")]
    #[validate(range(min = 0.0))]
    pub storage_cost_per_unit: f64,

    /// Default cap for `SuggestionEngine::top_default`.
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

fn default_min_threshold() -> f64 {
    DEFAULT_MIN_THRESHOLD
}
fn default_max_threshold() -> f64 {
    DEFAULT_MAX_THRESHOLD
}
fn default_base_consumption_ratio() -> f64 {
    0.05
}
fn default_below_midpoint_factor() -> f64 {
    1.5
}
fn default_above_midpoint_factor() -> f64 {
    0.7
}
fn default_low_position_ratio() -> f64 {
    0.3
}
fn default_high_position_ratio() -> f64 {
    0.7
}
fn default_base_confidence() -> f64 {
    70.0
}
fn default_min_confidence() -> f64 {
    70.0
}
fn default_rupture_alert_days() -> i64 {
    7
}
fn default_volatility_penalty() -> f64 {
    0.3
}
fn default_overstock_ratio() -> f64 {
    2.0
}
fn default_overstock_high_ratio() -> f64 {
    2.5
}
fn default_reorder_ratio() -> f64 {
    1.5
}
fn default_volatility_threshold() -> f64 {
    0.5
}
fn default_optimize_min_confidence() -> f64 {
    85.0
}
fn default_lead_time_days() -> f64 {
    5.0
}
fn default_safety_stock_ratio() -> f64 {
    0.2
}
fn default_storage_cost_per_unit() -> f64 {
    2.0
}
fn default_max_suggestions() -> usize {
    5
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            default_min_threshold: default_min_threshold(),
            default_max_threshold: default_max_threshold(),
            base_consumption_ratio: default_base_consumption_ratio(),
            below_midpoint_factor: default_below_midpoint_factor(),
            above_midpoint_factor: default_above_midpoint_factor(),
            low_position_ratio: default_low_position_ratio(),
            high_position_ratio: default_high_position_ratio(),
            base_confidence: default_base_confidence(),
            min_confidence: default_min_confidence(),
            rupture_alert_days: default_rupture_alert_days(),
            volatility_penalty: default_volatility_penalty(),
            overstock_ratio: default_overstock_ratio(),
            overstock_high_ratio: default_overstock_high_ratio(),
            reorder_ratio: default_reorder_ratio(),
            volatility_threshold: default_volatility_threshold(),
            optimize_min_confidence: default_optimize_min_confidence(),
            lead_time_days: default_lead_time_days(),
            safety_stock_ratio: default_safety_stock_ratio(),
            storage_cost_per_unit: default_storage_cost_per_unit(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

/// Tuning knobs for the regression forecaster.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ForecastConfig {
    /// Length of the history window fed into the regression, in days.
    #[serde(default = "default_history_days")]
    #[validate(range(min = 3))]
    pub history_days: u32,

    /// Z-score for the confidence interval (1.96 for 95%).
    #[serde(default = "default_confidence_z")]
    #[validate(range(min = 0.0))]
    pub confidence_z: f64,

    /// Slopes shallower than this count as flat (no depletion detected).
    #[serde(default = "default_flat_slope_epsilon")]
    #[validate(range(min = 0.0))]
    pub flat_slope_epsilon: f64,

    /// Predictions beyond this horizon are discarded.
    #[serde(default = "default_max_horizon_days")]
    #[validate(range(min = 1.0))]
    pub max_horizon_days: f64,

    /// Supplier lead time in days.
    #[serde(default = "default_forecast_lead_time_days")]
    #[validate(range(min = 0))]
    pub lead_time_days: i64,

    /// Extra days subtracted alongside the lead time when placing the
    /// recommended reorder date.
    #[serde(default = "default_safety_margin_days")]
    #[validate(range(min = 0))]
    pub safety_margin_days: i64,

    /// Reorders aim to restore this fraction of the max threshold.
    #[serde(default = "default_reorder_target_ratio")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub reorder_target_ratio: f64,
}

fn default_history_days() -> u32 {
    30
}
fn default_confidence_z() -> f64 {
    1.96
}
fn default_flat_slope_epsilon() -> f64 {
    0.01
}
fn default_max_horizon_days() -> f64 {
    365.0
}
fn default_forecast_lead_time_days() -> i64 {
    5
}
fn default_safety_margin_days() -> i64 {
    2
}
fn default_reorder_target_ratio() -> f64 {
    0.7
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            history_days: default_history_days(),
            confidence_z: default_confidence_z(),
            flat_slope_epsilon: default_flat_slope_epsilon(),
            max_horizon_days: default_max_horizon_days(),
            lead_time_days: default_forecast_lead_time_days(),
            safety_margin_days: default_safety_margin_days(),
            reorder_target_ratio: default_reorder_target_ratio(),
        }
    }
}

/// Tuning knobs for the synthetic history generator.
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Assumed days to depletion for critical stocks.
    #[serde(default = "default_depletion_days_critical")]
    #[validate(range(min = 1.0))]
    pub depletion_days_critical: f64,

    /// Assumed days to depletion for low stocks.
    #[serde(default = "default_depletion_days_low")]
    #[validate(range(min = 1.0))]
    pub depletion_days_low: f64,

    /// Assumed days to depletion for overstocked stocks.
    #[serde(default = "default_depletion_days_overstocked")]
    #[validate(range(min = 1.0))]
    pub depletion_days_overstocked: f64,

    /// Assumed days to depletion for every other status.
    #[serde(default = "default_depletion_days_default")]
    #[validate(range(min = 1.0))]
    pub depletion_days_default: f64,

    /// Per-step noise amplitude as a fraction of the consumption rate.
    #[serde(default = "default_noise_ratio")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub noise_ratio: f64,

    /// Simulated start quantity is capped at `max_threshold * this`.
    #[serde(default = "default_start_headroom_ratio")]
    #[validate(range(min = 1.0))]
    pub start_headroom_ratio: f64,

    /// Simulated quantities never drop below `min_threshold * this`.
    #[serde(default = "default_floor_ratio")]
    #[validate(range(min = 0.0))]
    pub floor_ratio: f64,

    /// Simulated quantities never rise above `max_threshold * this`.
    #[serde(default = "default_ceiling_ratio")]
    #[validate(range(min = 1.0))]
    pub ceiling_ratio: f64,
}

fn default_depletion_days_critical() -> f64 {
    10.0
}
fn default_depletion_days_low() -> f64 {
    15.0
}
fn default_depletion_days_overstocked() -> f64 {
    40.0
}
fn default_depletion_days_default() -> f64 {
    20.0
}
fn default_noise_ratio() -> f64 {
    0.3
}
fn default_start_headroom_ratio() -> f64 {
    1.1
}
fn default_floor_ratio() -> f64 {
    0.5
}
fn default_ceiling_ratio() -> f64 {
    1.2
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            depletion_days_critical: default_depletion_days_critical(),
            depletion_days_low: default_depletion_days_low(),
            depletion_days_overstocked: default_depletion_days_overstocked(),
            depletion_days_default: default_depletion_days_default(),
            noise_ratio: default_noise_ratio(),
            start_headroom_ratio: default_start_headroom_ratio(),
            floor_ratio: default_floor_ratio(),
            ceiling_ratio: default_ceiling_ratio(),
        }
    }
}

/// Root configuration handed to the engine constructors.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AnalyticsConfig {
    #[serde(default)]
    #[validate]
    pub suggestion: SuggestionConfig,

    #[serde(default)]
    #[validate]
    pub forecast: ForecastConfig,

    #[serde(default)]
    #[validate]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Error)]
pub enum AnalyticsConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

impl AnalyticsConfig {
    /// Loads configuration from `config/analytics.*` (optional), an
    /// environment-specific overlay, and `ANALYTICS__*` environment
    /// variables, in that order. Missing sources fall back to built-in
    /// defaults.
    pub fn load() -> Result<Self, AnalyticsConfigError> {
        let run_env = env::var("RUN_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| DEFAULT_ENV.to_string());
        info!("Loading analytics configuration for environment: {}", run_env);

        if !Path::new(CONFIG_DIR).exists() {
            info!(
                "Config directory '{}' not found; relying on built-in defaults and environment variables",
                CONFIG_DIR
            );
        }

        let merged = Config::builder()
            .add_source(File::with_name(&format!("{}/analytics", CONFIG_DIR)).required(false))
            .add_source(
                File::with_name(&format!("{}/analytics.{}", CONFIG_DIR, run_env)).required(false),
            )
            .add_source(Environment::with_prefix("ANALYTICS").separator("__"))
            .build()?;

        let config: AnalyticsConfig = merged.try_deserialize()?;
        config.validate()?;

        info!("Analytics configuration loaded successfully");
        Ok(config)
    }
}
