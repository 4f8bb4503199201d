use bigdecimal::BigDecimal;
use thiserror::Error;
use uuid::Uuid;
use crate::{
    error::HttpError,
    models::requestmodel::RequestKind,
};
use axum::http::StatusCode;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Project {0} not found")]
    ProjectNotFound(Uuid),

    #[error("{} {id} not found", .kind.label())]
    RequestNotFound { kind: RequestKind, id: Uuid },

    #[error("Task {0} not found")]
    TaskNotFound(Uuid),

    #[error("Material {0} not found")]
    MaterialNotFound(Uuid),

    #[error("Payment {0} not found")]
    PaymentNotFound(Uuid),

    #[error("Installment {0} not found")]
    InstallmentNotFound(Uuid),

    #[error("Approval request {0} not found")]
    ApprovalNotFound(Uuid),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Insufficient pool funds: requested {requested}, available {available}")]
    InsufficientPool { requested: BigDecimal, available: BigDecimal },

    #[error("Project {id} was modified concurrently: expected version {expected}, found {found}")]
    ConcurrencyConflict { id: Uuid, expected: i32, found: i32 },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        match status {
            StatusCode::NOT_FOUND => HttpError::not_found(error.to_string()),
            StatusCode::BAD_REQUEST => HttpError::bad_request(error.to_string()),
            StatusCode::CONFLICT => HttpError::conflict(error.to_string()),
            _ => {
                tracing::error!("unexpected service failure: {}", error);
                HttpError::server_error(error.to_string())
            }
        }
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::ProjectNotFound(_)
            | ServiceError::RequestNotFound { .. }
            | ServiceError::TaskNotFound(_)
            | ServiceError::MaterialNotFound(_)
            | ServiceError::PaymentNotFound(_)
            | ServiceError::InstallmentNotFound(_)
            | ServiceError::ApprovalNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::InvalidStateTransition(_)
            | ServiceError::InsufficientPool { .. }
            | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::ConcurrencyConflict { .. } => StatusCode::CONFLICT,

            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
