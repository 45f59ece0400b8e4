use std::cmp::Ordering;

use tracing::{debug, instrument};

use crate::config::SuggestionConfig;
use crate::models::prediction::ConsumptionTrend;
use crate::models::stock::{Stock, StockUnit};
use crate::models::suggestion::{AiSuggestion, SuggestionKind, SuggestionPriority};
use crate::services::trend::TrendAnalyzer;
use crate::units::format_quantity;

/// Rule-based generator turning consumption trends into prioritized,
/// human-readable suggestions. Rules are evaluated in strict order and the
/// first match wins, so a stock never receives more than one suggestion
/// per invocation.
pub struct SuggestionEngine {
    analyzer: TrendAnalyzer,
    config: SuggestionConfig,
}

impl SuggestionEngine {
    pub fn new() -> Self {
        Self::with_config(SuggestionConfig::default())
    }

    pub fn with_config(config: SuggestionConfig) -> Self {
        Self {
            analyzer: TrendAnalyzer::with_config(config.clone()),
            config,
        }
    }

    pub fn analyzer(&self) -> &TrendAnalyzer {
        &self.analyzer
    }

    /// Generates at most one suggestion per stock, sorted most urgent
    /// first (priority rank, then descending confidence).
    #[instrument(skip_all, fields(stocks = stocks.len()))]
    pub fn generate(&self, stocks: &[Stock]) -> Vec<AiSuggestion> {
        let mut suggestions = Vec::new();

        for stock in stocks {
            let trend = self.analyzer.analyze(stock);
            if trend.confidence < self.config.min_confidence {
                debug!(stock = %stock.id, confidence = trend.confidence, "below confidence gate, skipping");
                continue;
            }

            let days = self.analyzer.days_until_rupture(stock, &trend);
            let min = stock.min_threshold_or(self.config.default_min_threshold);
            let max = stock.max_threshold_or(self.config.default_max_threshold);

            let suggestion = match days {
                Some(d) if d <= self.config.rupture_alert_days => {
                    self.rupture_risk_suggestion(stock, &trend, d)
                }
                _ if stock.quantity > max * self.config.overstock_ratio => {
                    self.overstock_suggestion(stock, &trend)
                }
                _ if stock.quantity < min * self.config.reorder_ratio => {
                    self.reorder_suggestion(stock, &trend, days)
                }
                _ if trend.volatility > self.config.volatility_threshold
                    && trend.confidence >= self.config.optimize_min_confidence =>
                {
                    self.optimize_suggestion(stock, &trend)
                }
                _ => continue,
            };
            suggestions.push(suggestion);
        }

        suggestions.sort_by(|a, b| {
            a.priority.rank().cmp(&b.priority.rank()).then_with(|| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(Ordering::Equal)
            })
        });
        suggestions
    }

    /// Returns the most urgent suggestions, capped at `limit`.
    pub fn top(&self, stocks: &[Stock], limit: usize) -> Vec<AiSuggestion> {
        let mut suggestions = self.generate(stocks);
        suggestions.truncate(limit);
        suggestions
    }

    /// Returns the most urgent suggestions using the configured cap.
    pub fn top_default(&self, stocks: &[Stock]) -> Vec<AiSuggestion> {
        self.top(stocks, self.config.max_suggestions)
    }

    /// Imminent-rupture alert with a sized reorder.
    pub fn rupture_risk_suggestion(
        &self,
        stock: &Stock,
        trend: &ConsumptionTrend,
        days_until_rupture: i64,
    ) -> AiSuggestion {
        let priority = if days_until_rupture <= 3 {
            SuggestionPriority::Critical
        } else if days_until_rupture <= 7 {
            SuggestionPriority::High
        } else {
            SuggestionPriority::Medium
        };

        let confidence = (trend.confidence - trend.volatility * 10.0).clamp(0.0, 100.0);
        let quantity = self.analyzer.optimal_reorder_quantity(stock, trend);

        // Session wording reads better for consumable units measured out
        // per use; countable units keep the day horizon.
        let message = match stock.unit {
            StockUnit::Percentage | StockUnit::Meter | StockUnit::Ml | StockUnit::Liter => {
                match self.analyzer.sessions_remaining(stock) {
                    Some(sessions) => format!(
                        "{} has about {} sessions left ({} remaining).",
                        stock.name,
                        sessions,
                        format_quantity(stock.quantity, stock.unit)
                    ),
                    None => format!(
                        "{} will run out in about {} days at the current consumption rate.",
                        stock.name, days_until_rupture
                    ),
                }
            }
            _ => format!(
                "{} will run out in about {} days at the current consumption rate.",
                stock.name, days_until_rupture
            ),
        };

        AiSuggestion {
            id: AiSuggestion::id_for(SuggestionKind::RuptureRisk, &stock.id),
            stock_id: stock.id.clone(),
            stock_name: stock.name.clone(),
            kind: SuggestionKind::RuptureRisk,
            priority,
            confidence,
            title: format!("Rupture risk: {}", stock.name),
            message,
            action: format!(
                "Reorder {} now",
                format_quantity(quantity as f64, stock.unit)
            ),
            impact: format!(
                "Avoids a stock-out expected within {} days",
                days_until_rupture
            ),
            quantity_recommended: Some(quantity),
            days_until_rupture: Some(days_until_rupture),
            savings_estimate: None,
        }
    }

    /// Excess-inventory alert with an estimated monthly storage saving.
    pub fn overstock_suggestion(&self, stock: &Stock, trend: &ConsumptionTrend) -> AiSuggestion {
        let max = stock.max_threshold_or(self.config.default_max_threshold);
        let excess_ratio = stock.quantity / max;
        let priority = if excess_ratio > self.config.overstock_high_ratio {
            SuggestionPriority::High
        } else {
            SuggestionPriority::Medium
        };
        let savings = ((stock.quantity - max) * self.config.storage_cost_per_unit).round();

        AiSuggestion {
            id: AiSuggestion::id_for(SuggestionKind::Overstock, &stock.id),
            stock_id: stock.id.clone(),
            stock_name: stock.name.clone(),
            kind: SuggestionKind::Overstock,
            priority,
            confidence: trend.confidence,
            title: format!("Overstock: {}", stock.name),
            message: format!(
                "{} holds {}, {:.1}x its max threshold of {}.",
                stock.name,
                format_quantity(stock.quantity, stock.unit),
                excess_ratio,
                format_quantity(max, stock.unit)
            ),
            action: "Pause replenishment until the excess is consumed".to_string(),
            impact: format!("Frees about {:.0} EUR/month in storage costs", savings),
            quantity_recommended: None,
            days_until_rupture: None,
            savings_estimate: Some(savings),
        }
    }

    /// Low-stock reorder, urgent when a rupture is already predicted soon.
    pub fn reorder_suggestion(
        &self,
        stock: &Stock,
        trend: &ConsumptionTrend,
        days_until_rupture: Option<i64>,
    ) -> AiSuggestion {
        let urgent = matches!(days_until_rupture, Some(d) if d <= self.config.rupture_alert_days);
        let (kind, priority) = if urgent {
            (SuggestionKind::ReorderNow, SuggestionPriority::High)
        } else {
            (SuggestionKind::ReorderSoon, SuggestionPriority::Medium)
        };

        let quantity = self.analyzer.optimal_reorder_quantity(stock, trend);
        let min = stock.min_threshold_or(self.config.default_min_threshold);

        AiSuggestion {
            id: AiSuggestion::id_for(kind, &stock.id),
            stock_id: stock.id.clone(),
            stock_name: stock.name.clone(),
            kind,
            priority,
            confidence: trend.confidence,
            title: if urgent {
                format!("Reorder now: {}", stock.name)
            } else {
                format!("Plan a reorder: {}", stock.name)
            },
            message: format!(
                "{} is down to {}, close to its minimum threshold of {}.",
                stock.name,
                format_quantity(stock.quantity, stock.unit),
                format_quantity(min, stock.unit)
            ),
            action: format!("Order {}", format_quantity(quantity as f64, stock.unit)),
            impact: "Keeps the stock above its reorder point".to_string(),
            quantity_recommended: Some(quantity),
            days_until_rupture,
            savings_estimate: None,
        }
    }

    /// Threshold-tuning advice for volatile, well-understood stocks.
    pub fn optimize_suggestion(&self, stock: &Stock, trend: &ConsumptionTrend) -> AiSuggestion {
        let recommended_min =
            (trend.daily_average * self.config.lead_time_days * 1.5).round();
        let recommended_max = recommended_min * 3.0;

        AiSuggestion {
            id: AiSuggestion::id_for(SuggestionKind::OptimizeStock, &stock.id),
            stock_id: stock.id.clone(),
            stock_name: stock.name.clone(),
            kind: SuggestionKind::OptimizeStock,
            priority: SuggestionPriority::Low,
            confidence: (trend.confidence * 0.9).round(),
            title: format!("Optimize thresholds: {}", stock.name),
            message: format!(
                "{} swings far from its optimal level; thresholds of {} / {} would fit the observed consumption better.",
                stock.name,
                format_quantity(recommended_min, stock.unit),
                format_quantity(recommended_max, stock.unit)
            ),
            action: format!(
                "Set min threshold to {} and max threshold to {}",
                format_quantity(recommended_min, stock.unit),
                format_quantity(recommended_max, stock.unit)
            ),
            impact: "Fewer emergency reorders and less idle stock".to_string(),
            quantity_recommended: None,
            days_until_rupture: None,
            savings_estimate: None,
        }
    }
}

impl Default for SuggestionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::stock::StockStatus;

    fn engine() -> SuggestionEngine {
        SuggestionEngine::new()
    }

    #[test]
    fn critical_stock_gets_a_rupture_risk_suggestion() {
        let stocks = vec![Stock::new(1, "Wax", 5.0)
            .with_thresholds(10.0, 100.0)
            .with_status(StockStatus::Critical)];
        let suggestions = engine().generate(&stocks);

        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.kind, SuggestionKind::RuptureRisk);
        assert_eq!(s.priority, SuggestionPriority::Critical);
        assert_eq!(s.days_until_rupture, Some(0));
        assert!(s.quantity_recommended.is_some());
    }

    #[test]
    fn overstocked_stock_gets_savings_estimate() {
        // 250 against a max of 100: exactly 2.5x, priority stays medium
        let stocks = vec![Stock::new(2, "Towels", 250.0).with_thresholds(10.0, 100.0)];
        let suggestions = engine().generate(&stocks);

        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.kind, SuggestionKind::Overstock);
        assert_eq!(s.priority, SuggestionPriority::Medium);
        assert_eq!(s.savings_estimate, Some(300.0));
    }

    #[test]
    fn far_overstocked_stock_is_high_priority() {
        let stocks = vec![Stock::new(2, "Towels", 300.0).with_thresholds(10.0, 100.0)];
        let suggestions = engine().generate(&stocks);
        assert_eq!(suggestions[0].priority, SuggestionPriority::High);
    }

    #[test]
    fn low_stock_gets_reorder_soon() {
        // quantity 14 is under min * 1.5, and with a max of 20 the derived
        // consumption is slow enough (9 days runway) that the rupture rule
        // does not claim it first
        let stocks = vec![Stock::new(3, "Oil", 14.0).with_thresholds(10.0, 20.0)];
        let suggestions = engine().generate(&stocks);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionKind::ReorderSoon);
        assert_eq!(suggestions[0].priority, SuggestionPriority::Medium);
    }

    #[test]
    fn volatile_high_stock_gets_optimize_suggestion() {
        // quantity 98 of max 100: no rupture soon, not overstocked, above
        // the reorder band, but deviation from midpoint 55 drives
        // volatility and confidence over the optimize gates
        let stocks = vec![Stock::new(4, "Cream", 98.0).with_thresholds(10.0, 100.0)];
        let suggestions = engine().generate(&stocks);

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionKind::OptimizeStock);
        assert_eq!(suggestions[0].priority, SuggestionPriority::Low);
    }

    #[test]
    fn healthy_stock_gets_no_suggestion() {
        // quantity at the midpoint: no rule matches
        let stocks = vec![Stock::new(5, "Balanced", 55.0).with_thresholds(10.0, 100.0)];
        assert!(engine().generate(&stocks).is_empty());
    }

    #[test]
    fn degenerate_thresholds_are_skipped_by_the_confidence_gate() {
        let stocks = vec![Stock::new(6, "Broken", 5.0).with_thresholds(0.0, 0.0)];
        assert!(engine().generate(&stocks).is_empty());
    }

    #[test]
    fn at_most_one_suggestion_per_stock() {
        // qualifies for rupture risk AND reorder; only the first rule fires
        let stocks = vec![Stock::new(7, "Both", 5.0).with_thresholds(10.0, 100.0)];
        let suggestions = engine().generate(&stocks);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].kind, SuggestionKind::RuptureRisk);
    }

    #[test]
    fn output_is_sorted_by_priority_then_confidence() {
        let stocks = vec![
            Stock::new(10, "Optimizable", 98.0).with_thresholds(10.0, 100.0),
            Stock::new(11, "Critical", 2.0).with_thresholds(10.0, 100.0),
            Stock::new(12, "Overstocked", 250.0).with_thresholds(10.0, 100.0),
        ];
        let suggestions = engine().generate(&stocks);

        assert_eq!(suggestions.len(), 3);
        for pair in suggestions.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.priority.rank() <= b.priority.rank());
            if a.priority == b.priority {
                assert!(a.confidence >= b.confidence);
            }
        }
        assert_eq!(suggestions[0].kind, SuggestionKind::RuptureRisk);
    }

    #[test]
    fn top_caps_the_result() {
        let stocks: Vec<Stock> = (0..8i64)
            .map(|i| Stock::new(i, format!("S{}", i), 2.0).with_thresholds(10.0, 100.0))
            .collect();
        assert_eq!(engine().top(&stocks, 3).len(), 3);
        assert_eq!(engine().top_default(&stocks).len(), 5);
    }

    #[test]
    fn reorder_now_when_rupture_is_near() {
        // exercised directly: inside generate() the rupture rule claims
        // every stock with a short runway before the reorder rule runs
        let engine = engine();
        let stock = Stock::new(8, "Serum", 12.0).with_thresholds(10.0, 100.0);
        let trend = engine.analyzer().analyze(&stock);

        let urgent = engine.reorder_suggestion(&stock, &trend, Some(4));
        assert_eq!(urgent.kind, SuggestionKind::ReorderNow);
        assert_eq!(urgent.priority, SuggestionPriority::High);

        let relaxed = engine.reorder_suggestion(&stock, &trend, None);
        assert_eq!(relaxed.kind, SuggestionKind::ReorderSoon);
        assert_eq!(relaxed.priority, SuggestionPriority::Medium);
    }

    #[test]
    fn session_wording_for_measured_units() {
        let engine = engine();
        let stock = Stock::new(9, "Lotion", 450.0)
            .with_thresholds(10.0, 100.0)
            .with_unit(StockUnit::Ml);
        let trend = engine.analyzer().analyze(&stock);
        let suggestion = engine.rupture_risk_suggestion(&stock, &trend, 5);
        assert!(suggestion.message.contains("sessions"));

        let pieces = Stock::new(10, "Combs", 4.0).with_thresholds(10.0, 100.0);
        let trend = engine.analyzer().analyze(&pieces);
        let suggestion = engine.rupture_risk_suggestion(&pieces, &trend, 5);
        assert!(suggestion.message.contains("days"));
    }
}
