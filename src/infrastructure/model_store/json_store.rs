//! File-based model persistence: one JSON artifact per deployment.

use std::path::PathBuf;

use crate::domain::error::DomainError;
use crate::domain::ports::model_store::ModelStore;
use crate::domain::values::regression::TrainedModel;

pub struct JsonModelStore {
    path: PathBuf,
}

impl JsonModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ModelStore for JsonModelStore {
    fn save(&self, model: &TrainedModel) -> Result<(), DomainError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| DomainError::Database(format!("create model dir: {e}")))?;
            }
        }
        let json = serde_json::to_string_pretty(model)
            .map_err(|e| DomainError::Parse(format!("serialize model: {e}")))?;
        std::fs::write(&self.path, json)
            .map_err(|e| DomainError::Database(format!("write model artifact: {e}")))?;
        Ok(())
    }

    fn load(&self) -> Result<Option<TrainedModel>, DomainError> {
        let json = match std::fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DomainError::Database(format!("read model artifact: {e}")));
            }
        };
        let model: TrainedModel = serde_json::from_str(&json)
            .map_err(|e| DomainError::Parse(format!("corrupt model artifact: {e}")))?;
        Ok(Some(model))
    }
}
