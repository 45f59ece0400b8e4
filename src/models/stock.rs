use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{AnalyticsError, AnalyticsResult};

/// Fallback reorder bounds applied when a stock record carries none.
pub const DEFAULT_MIN_THRESHOLD: f64 = 10.0;
pub const DEFAULT_MAX_THRESHOLD: f64 = 100.0;

/// Stock identifier as supplied by the host application. Upstream records
/// use numeric ids for locally created stocks and opaque strings for
/// synced ones, so both shapes are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StockId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for StockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockId::Numeric(id) => write!(f, "{}", id),
            StockId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for StockId {
    fn from(id: i64) -> Self {
        StockId::Numeric(id)
    }
}

impl From<&str> for StockId {
    fn from(id: &str) -> Self {
        StockId::Text(id.to_string())
    }
}

impl From<String> for StockId {
    fn from(id: String) -> Self {
        StockId::Text(id)
    }
}

/// Stock health as classified by the host application. The forecaster uses
/// it to shape the simulated depletion rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum StockStatus {
    #[default]
    Optimal,
    Low,
    Critical,
    OutOfStock,
    Overstocked,
}

/// Measurement unit for a stock's quantity. Unknown units still flow
/// through the pipelines; only session estimates are unavailable for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StockUnit {
    #[default]
    Piece,
    Percentage,
    Meter,
    Ml,
    Liter,
    G,
    Kg,
    #[serde(other)]
    Unknown,
}

/// Inventory record supplied by the host application's state layer.
/// Read-only to this crate; every derived value is computed fresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    pub id: StockId,
    #[serde(alias = "label")]
    pub name: String,
    pub quantity: f64,
    #[serde(default)]
    pub min_threshold: Option<f64>,
    #[serde(default)]
    pub max_threshold: Option<f64>,
    #[serde(default)]
    pub status: StockStatus,
    #[serde(default)]
    pub unit: StockUnit,
}

impl Stock {
    pub fn new(id: impl Into<StockId>, name: impl Into<String>, quantity: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity,
            min_threshold: None,
            max_threshold: None,
            status: StockStatus::default(),
            unit: StockUnit::default(),
        }
    }

    pub fn with_thresholds(mut self, min: f64, max: f64) -> Self {
        self.min_threshold = Some(min);
        self.max_threshold = Some(max);
        self
    }

    pub fn with_status(mut self, status: StockStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_unit(mut self, unit: StockUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn min_threshold_or(&self, default: f64) -> f64 {
        self.min_threshold.unwrap_or(default)
    }

    pub fn max_threshold_or(&self, default: f64) -> f64 {
        self.max_threshold.unwrap_or(default)
    }

    pub fn min_threshold_or_default(&self) -> f64 {
        self.min_threshold_or(DEFAULT_MIN_THRESHOLD)
    }

    pub fn max_threshold_or_default(&self) -> f64 {
        self.max_threshold_or(DEFAULT_MAX_THRESHOLD)
    }

    /// Strict threshold check for callers that want a hard error instead of
    /// the trend analyzer's degenerate-trend fallback.
    pub fn validate_thresholds(&self) -> AnalyticsResult<()> {
        let min = self.min_threshold_or_default();
        let max = self.max_threshold_or_default();
        if max <= 0.0 || min + max <= 0.0 {
            return Err(AnalyticsError::InvalidThresholds(format!(
                "stock {} has unusable thresholds (min {}, max {})",
                self.id, min, max
            )));
        }
        if min > max {
            return Err(AnalyticsError::InvalidThresholds(format!(
                "stock {} has min threshold {} above max threshold {}",
                self.id, min, max
            )));
        }
        Ok(())
    }
}
