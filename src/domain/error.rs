use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// No platform rows anywhere in the requested range. Never silently
    /// treated as zero sales.
    #[error("No data: {0}")]
    DataNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(String),

    /// An external lookup (weather/holiday/tourism) failed. Callers recover
    /// with documented defaults instead of propagating this.
    #[error("External lookup failed: {0}")]
    ExternalLookup(String),

    /// A persisted model manifest disagrees with the current feature
    /// contract. Fatal for the ML path; retrain before inference.
    #[error("Model feature mismatch ({expected} expected, {found} in manifest): {detail}")]
    ModelFeatureMismatch {
        expected: usize,
        found: usize,
        detail: String,
    },

    /// Prediction or explanation requested with no trained model loaded.
    #[error("No trained model available")]
    ModelUntrained,

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<String> for DomainError {
    fn from(s: String) -> Self {
        DomainError::Database(s)
    }
}

impl From<&str> for DomainError {
    fn from(s: &str) -> Self {
        DomainError::InvalidInput(s.to_string())
    }
}
