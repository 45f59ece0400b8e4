use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::stock::StockId;

/// Consumption-intensity label derived from where the quantity sits between
/// the reorder bounds. Despite the name this classifies pressure on the
/// stock, not a fitted time-series direction: a nearly empty stock reads as
/// `Increasing` consumption, a nearly full one as `Decreasing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Stable,
    Decreasing,
}

/// Synthetic consumption profile for one stock. Recomputed on every call,
/// never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionTrend {
    /// Estimated units consumed per day.
    pub daily_average: f64,
    pub direction: TrendDirection,
    /// Normalized distance from the optimal midpoint, in `[0, 1]`.
    pub volatility: f64,
    /// Heuristic confidence in the estimate, in `[0, 100]`.
    pub confidence: f64,
}

/// One observation of a stock's quantity at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub quantity: f64,
}

/// Ordinary least-squares fit over `(days since first sample, quantity)`.
/// The slope is the consumption rate in quantity per day; depleting stocks
/// fit a negative slope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegression {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Sample variance of the residuals (`SSres / (n - 2)`).
    pub variance: f64,
    /// Fit confidence in `[0, 100]`.
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Classifies a predicted days-to-rupture. No prediction means no
    /// detected depletion, which reads as low risk.
    pub fn from_days(days: Option<i64>) -> Self {
        match days {
            None => RiskLevel::Low,
            Some(d) if d <= 3 => RiskLevel::Critical,
            Some(d) if d <= 7 => RiskLevel::High,
            Some(d) if d <= 14 => RiskLevel::Medium,
            Some(_) => RiskLevel::Low,
        }
    }

    /// Sort key with the most severe level first.
    pub fn severity_rank(&self) -> u8 {
        match self {
            RiskLevel::Critical => 0,
            RiskLevel::High => 1,
            RiskLevel::Medium => 2,
            RiskLevel::Low => 3,
        }
    }
}

/// Regression-based rupture forecast for one stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockPrediction {
    pub stock_id: StockId,
    pub stock_name: String,
    pub current_quantity: f64,
    /// Point estimate; `None` when no depletion was detected or the
    /// prediction fell outside the forecast horizon.
    pub days_until_rupture: Option<i64>,
    pub date_of_rupture: Option<DateTime<Utc>>,
    /// 95% confidence interval around the point estimate.
    pub days_until_rupture_pessimistic: Option<i64>,
    pub days_until_rupture_optimistic: Option<i64>,
    /// Fitted consumption rate, clamped non-negative.
    pub daily_consumption_rate: f64,
    /// Fit confidence in `[0, 100]`, rounded.
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub recommended_reorder_date: Option<DateTime<Utc>>,
    pub recommended_reorder_quantity: u32,
}
