use serde::{Deserialize, Serialize};

use super::stock::StockId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SuggestionKind {
    RuptureRisk,
    Overstock,
    ReorderNow,
    ReorderSoon,
    OptimizeStock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SuggestionPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl SuggestionPriority {
    /// Sort key with the most urgent priority first.
    pub fn rank(&self) -> u8 {
        match self {
            SuggestionPriority::Critical => 0,
            SuggestionPriority::High => 1,
            SuggestionPriority::Medium => 2,
            SuggestionPriority::Low => 3,
        }
    }
}

/// Typed, human-readable recommendation for one stock. The engine emits at
/// most one per stock per invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiSuggestion {
    /// Stable identifier of the form `<kind>-<stock_id>`.
    pub id: String,
    pub stock_id: StockId,
    pub stock_name: String,
    pub kind: SuggestionKind,
    pub priority: SuggestionPriority,
    /// Confidence in `[0, 100]`.
    pub confidence: f64,
    pub title: String,
    pub message: String,
    pub action: String,
    pub impact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_recommended: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_rupture: Option<i64>,
    /// Estimated monthly storage savings in euros, overstock only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings_estimate: Option<f64>,
}

impl AiSuggestion {
    pub fn id_for(kind: SuggestionKind, stock_id: &StockId) -> String {
        format!("{}-{}", kind, stock_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_combine_kind_and_stock_id() {
        assert_eq!(
            AiSuggestion::id_for(SuggestionKind::RuptureRisk, &StockId::Numeric(7)),
            "rupture-risk-7"
        );
        assert_eq!(
            AiSuggestion::id_for(SuggestionKind::OptimizeStock, &StockId::Text("abc".into())),
            "optimize-stock-abc"
        );
    }

    #[test]
    fn priority_ranks_are_strictly_ordered() {
        assert!(SuggestionPriority::Critical.rank() < SuggestionPriority::High.rank());
        assert!(SuggestionPriority::High.rank() < SuggestionPriority::Medium.rank());
        assert!(SuggestionPriority::Medium.rank() < SuggestionPriority::Low.rank());
    }

    #[test]
    fn kind_serializes_kebab_case() {
        let json = serde_json::to_string(&SuggestionKind::ReorderSoon).unwrap();
        assert_eq!(json, "\"reorder-soon\"");
    }
}
