use tracing::{debug, warn};

use crate::config::SuggestionConfig;
use crate::models::prediction::{ConsumptionTrend, TrendDirection};
use crate::models::stock::{Stock, StockUnit};

/// Derives a synthetic consumption profile for a stock from its position
/// between the reorder bounds. All outputs are clamped to documented
/// ranges; the analyzer itself never fails.
pub struct TrendAnalyzer {
    config: SuggestionConfig,
}

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self::with_config(SuggestionConfig::default())
    }

    pub fn with_config(config: SuggestionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    fn thresholds(&self, stock: &Stock) -> (f64, f64) {
        (
            stock.min_threshold_or(self.config.default_min_threshold),
            stock.max_threshold_or(self.config.default_max_threshold),
        )
    }

    /// Analyzes a stock's consumption profile.
    ///
    /// With unusable thresholds (non-positive midpoint or max) the ratio
    /// math is undefined, so the analyzer returns a zero-confidence stable
    /// trend instead. The suggestion engine's confidence gate then skips
    /// the stock, keeping NaN out of every downstream consumer.
    pub fn analyze(&self, stock: &Stock) -> ConsumptionTrend {
        let (min, max) = self.thresholds(stock);
        let midpoint = (min + max) / 2.0;

        if midpoint <= 0.0 || max <= 0.0 {
            warn!(
                stock = %stock.id,
                min, max,
                "unusable thresholds, returning degenerate trend"
            );
            return ConsumptionTrend {
                daily_average: 0.0,
                direction: TrendDirection::Stable,
                volatility: 0.0,
                confidence: 0.0,
            };
        }

        let deviation = (stock.quantity - midpoint).abs();

        let base_consumption = max * self.config.base_consumption_ratio;
        let adjustment = if stock.quantity < midpoint {
            self.config.below_midpoint_factor
        } else {
            self.config.above_midpoint_factor
        };
        let daily_average = base_consumption * adjustment;

        // Relative position classifies consumption intensity, not a fitted
        // time direction: a nearly empty stock is being consumed hard.
        let relative_position = stock.quantity / max;
        let direction = if relative_position < self.config.low_position_ratio {
            TrendDirection::Increasing
        } else if relative_position > self.config.high_position_ratio {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        };

        let volatility = (deviation / midpoint).min(1.0);
        let confidence = (self.config.base_confidence + (deviation / midpoint) * 20.0)
            .min(100.0)
            .round();

        debug!(
            stock = %stock.id,
            daily_average,
            %direction,
            volatility,
            confidence,
            "analyzed consumption trend"
        );

        ConsumptionTrend {
            daily_average,
            direction,
            volatility,
            confidence,
        }
    }

    /// Predicts whole days until the stock runs out, or `None` when no
    /// consumption is detected. An already-empty stock ruptures now.
    pub fn days_until_rupture(&self, stock: &Stock, trend: &ConsumptionTrend) -> Option<i64> {
        if stock.quantity <= 0.0 {
            return Some(0);
        }
        if trend.daily_average <= 0.0 {
            return None;
        }

        let days_until_empty = stock.quantity / trend.daily_average;
        let adjusted =
            days_until_empty * (1.0 - trend.volatility * self.config.volatility_penalty);
        Some(adjusted.floor() as i64)
    }

    /// Estimates how many usage sessions the remaining quantity covers.
    /// Session sizes are unit-specific; unknown units have no estimate.
    pub fn sessions_remaining(&self, stock: &Stock) -> Option<i64> {
        let q = stock.quantity;
        let sessions = match stock.unit {
            StockUnit::Percentage => q / 12.0,
            StockUnit::Meter => q / 1.5,
            StockUnit::Ml => q / 75.0,
            StockUnit::Liter => q * 1000.0 / 75.0,
            StockUnit::G => q / 200.0,
            StockUnit::Kg => q * 1000.0 / 200.0,
            StockUnit::Piece => q * 2.0,
            StockUnit::Unknown => return None,
        };
        Some(sessions.floor() as i64)
    }

    /// Sizes a reorder to refill lead-time demand plus safety stock on top
    /// of the gap to the optimal midpoint, scaled by consumption intensity
    /// and capped at the max threshold.
    pub fn optimal_reorder_quantity(&self, stock: &Stock, trend: &ConsumptionTrend) -> u32 {
        let (min, max) = self.thresholds(stock);

        let lead_time_demand = trend.daily_average * self.config.lead_time_days;
        let safety_stock = lead_time_demand * self.config.safety_stock_ratio;
        let target_quantity = (min + max) / 2.0;
        let gap = (target_quantity - stock.quantity).max(0.0);

        let mut recommended = gap + lead_time_demand + safety_stock;
        recommended *= match trend.direction {
            TrendDirection::Increasing => 1.2,
            TrendDirection::Decreasing => 0.8,
            TrendDirection::Stable => 1.0,
        };

        recommended.round().min(max).max(0.0) as u32
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
