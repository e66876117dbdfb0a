// src/error.rs

/// Error types for the pricing engine and its collaborators
#[derive(Debug, Clone, thiserror::Error)]
pub enum PricerError {
    /// Invalid parameter values
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameters {
        parameter: String,
        value: f64,
        constraint: String,
    },

    /// Invalid configuration (counts, flags, option settings)
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// Numerical fault inside a simulation worker
    #[error("Simulation error in worker {worker}: {reason}")]
    Simulation { worker: usize, reason: String },

    /// Non-finite estimate after aggregation
    #[error("Numerical instability in {method}: {reason}")]
    NumericalInstability { method: String, reason: String },

    /// The worker thread pool could not be built
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Result export failure
    #[error("Export error: {0}")]
    Export(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl PricerError {
    /// True for the validation family (rejected before any work is done)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PricerError::InvalidParameters { .. } | PricerError::InvalidConfiguration { .. }
        )
    }

    /// True for numeric faults raised while sampling or aggregating
    pub fn is_simulation(&self) -> bool {
        matches!(
            self,
            PricerError::Simulation { .. } | PricerError::NumericalInstability { .. }
        )
    }
}

impl From<std::io::Error> for PricerError {
    fn from(e: std::io::Error) -> Self {
        PricerError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for PricerError {
    fn from(e: serde_json::Error) -> Self {
        PricerError::Config(e.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for PricerError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        PricerError::WorkerPool(e.to_string())
    }
}

/// Result type alias for pricer operations
pub type PricerResult<T> = Result<T, PricerError>;

/// Validation utilities
pub mod validation {
    use super::{PricerError, PricerResult};

    /// Validate that a parameter is positive and finite
    pub fn validate_positive(name: &str, value: f64) -> PricerResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(PricerError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is non-negative and finite
    pub fn validate_non_negative(name: &str, value: f64) -> PricerResult<()> {
        validate_finite(name, value)?;
        if value < 0.0 {
            Err(PricerError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be non-negative (≥ 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &str, value: f64) -> PricerResult<()> {
        if !value.is_finite() {
            Err(PricerError::InvalidParameters {
                parameter: name.to_string(),
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate sample count; any positive count is accepted
    pub fn validate_samples(samples: usize) -> PricerResult<()> {
        if samples == 0 {
            Err(PricerError::InvalidConfiguration {
                field: "samples".to_string(),
                reason: "must be greater than 0".to_string(),
            })
        } else {
            Ok(())
        }
    }
}
