use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::model::Stage;
use crate::store::{Collection, StoreError};

/// Errors surfaced by lifecycle operations. Nothing is retried or recovered
/// locally; callers decide how to present them.
#[derive(Debug, Error)]
pub enum CaseError {
    #[error("{collection} record '{id}' not found")]
    NotFound { collection: Collection, id: String },

    #[error("Cannot {operation} a case that is '{stage}'")]
    PreconditionFailed { operation: String, stage: String },

    #[error("Validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Permission denied: {operation} is not available to this session")]
    PermissionDenied { operation: String },

    #[error("Store error: {0}")]
    Store(#[source] StoreError),

    #[error("External service error: {0}")]
    ExternalService(#[source] DispatchError),
}

impl CaseError {
    pub fn not_found(collection: Collection, id: &str) -> Self {
        CaseError::NotFound {
            collection,
            id: id.to_string(),
        }
    }

    pub fn precondition(operation: &str, stage: Stage) -> Self {
        CaseError::PreconditionFailed {
            operation: operation.to_string(),
            stage: stage.status_label().to_string(),
        }
    }

    pub fn validation(reason: impl Into<String>) -> Self {
        CaseError::ValidationFailed {
            reason: reason.into(),
        }
    }

    pub fn permission_denied(operation: &str) -> Self {
        CaseError::PermissionDenied {
            operation: operation.to_string(),
        }
    }
}

impl From<StoreError> for CaseError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => CaseError::NotFound { collection, id },
            other => CaseError::Store(other),
        }
    }
}

impl From<serde_json::Error> for CaseError {
    fn from(err: serde_json::Error) -> Self {
        CaseError::Store(StoreError::Serialization(err))
    }
}

impl From<DispatchError> for CaseError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::MissingFields(fields) => CaseError::ValidationFailed {
                reason: format!("missing required document fields: {}", fields.join(", ")),
            },
            other => CaseError::ExternalService(other),
        }
    }
}
