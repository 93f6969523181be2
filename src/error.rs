use thiserror::Error;

/// Result type for evalbook operations
pub type Result<T> = std::result::Result<T, EvalError>;

/// Main error type for evaluation and loss bookkeeping
#[derive(Debug, Error)]
pub enum EvalError {
    /// Unrecognized task name
    #[error("Invalid task: {0}")]
    InvalidTask(String),

    /// ROC requested on a split where only one class is observed
    #[error("Degenerate label set for '{label}' in split '{split}': only one class present")]
    DegenerateLabelSet {
        label: String,
        split: String,
    },

    /// Metric is mathematically undefined for the given data
    #[error("Undefined metric '{metric}': {reason}")]
    UndefinedMetric {
        metric: String,
        reason: String,
    },

    /// Latest value requested before anything was recorded
    #[error("Empty sequence: {0}")]
    EmptySequence(String),

    /// Required column absent from a prediction table
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Mismatched lengths or shapes
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// IO errors (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Figure rasterization errors
    #[error("Plot error: {0}")]
    Plot(String),
}

// Helper functions for common error patterns
impl EvalError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        EvalError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        EvalError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn undefined_metric<S: Into<String>>(metric: S, reason: S) -> Self {
        EvalError::UndefinedMetric {
            metric: metric.into(),
            reason: reason.into(),
        }
    }

    pub fn degenerate<S: Into<String>>(label: S, split: S) -> Self {
        EvalError::DegenerateLabelSet {
            label: label.into(),
            split: split.into(),
        }
    }
}
