use chrono::NaiveDate;

use crate::domain::error::DomainError;

/// Normalized tourist-season intensity for a date, in [0, 1].
/// Implementations degrade to a neutral mid-season value on failure.
pub trait TourismIndexLookup: Send + Sync {
    fn index(&self, date: NaiveDate) -> Result<f64, DomainError>;
}
