use crate::domain::error::DomainError;
use crate::domain::values::regression::TrainedModel;

/// Persistence for the trained global sales model. Training writes the
/// artifact once; inference loads it once per process lifetime.
pub trait ModelStore: Send + Sync {
    fn save(&self, model: &TrainedModel) -> Result<(), DomainError>;

    /// `Ok(None)` when no artifact has been trained yet.
    fn load(&self) -> Result<Option<TrainedModel>, DomainError>;
}
