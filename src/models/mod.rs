//! Data model shared by the two analytics pipelines.
//!
//! `Stock` is the external input record owned by the host application;
//! everything else is derived output, recomputed on every call.

pub mod prediction;
pub mod stock;
pub mod suggestion;

pub use prediction::{
    ConsumptionTrend, DataPoint, LinearRegression, RiskLevel, StockPrediction, TrendDirection,
};
pub use stock::{Stock, StockId, StockStatus, StockUnit};
pub use suggestion::{AiSuggestion, SuggestionKind, SuggestionPriority};
