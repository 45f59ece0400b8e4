//! Stocksense Analytics Library
//!
//! Predictive analytics core for stock-management dashboards. Two
//! independent, synchronous pipelines operate over the same [`Stock`]
//! record: the trend/suggestion engine ([`SuggestionEngine`]) emits at
//! most one prioritized recommendation per stock, and the regression
//! forecaster ([`RuptureForecaster`]) predicts days to rupture with a 95%
//! confidence interval. Both are pure functions of their inputs; nothing
//! is cached or persisted.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod errors;
pub mod logging;
pub mod ml;
pub mod models;
pub mod services;
pub mod units;

pub use config::{
    AnalyticsConfig, AnalyticsConfigError, ForecastConfig, SimulationConfig, SuggestionConfig,
};
pub use errors::{AnalyticsError, AnalyticsResult};
pub use ml::{fit_linear_regression, HistoryProvider, RuptureForecaster, SimulatedHistoryProvider};
pub use models::{
    AiSuggestion, ConsumptionTrend, DataPoint, LinearRegression, RiskLevel, Stock, StockId,
    StockPrediction, StockStatus, StockUnit, SuggestionKind, SuggestionPriority, TrendDirection,
};
pub use services::{SuggestionEngine, TrendAnalyzer};
