use serde::Serialize;

/// Convenience alias used across the analytics pipelines.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[derive(Debug, thiserror::Error, Serialize)]
pub enum AnalyticsError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Degenerate series: {0}")]
    DegenerateSeries(String),

    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Other error: {0}")]
    Other(
        #[from]
        #[serde(skip)]
        anyhow::Error,
    ),
}

impl AnalyticsError {
    /// True when the error only affects a single stock and a batch caller
    /// may drop the offending entry instead of aborting.
    pub fn is_per_stock(&self) -> bool {
        matches!(
            self,
            AnalyticsError::InsufficientData(_) | AnalyticsError::DegenerateSeries(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_is_recoverable_per_stock() {
        let err = AnalyticsError::InsufficientData("2 points, need 3".to_string());
        assert!(err.is_per_stock());
        assert_eq!(err.to_string(), "Insufficient data: 2 points, need 3");
    }

    #[test]
    fn invalid_thresholds_aborts() {
        let err = AnalyticsError::InvalidThresholds("min + max must be positive".to_string());
        assert!(!err.is_per_stock());
    }
}
