use thiserror::Error;

use crate::validate::FieldError;

/// Failure reported by the delivery collaborator. Either the endpoint
/// answered with a non-success status or the request never completed.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("delivery transport failed: {0}")]
    Transport(String),
}

/// Session-level errors surfaced to callers of the wizard engine.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Application already submitted")]
    AlreadySubmitted,

    #[error("A submission for this session is already in flight")]
    SubmitInFlight,

    #[error("Session was reset while the submission was in flight")]
    Superseded,

    #[error("Application failed validation")]
    Invalid(Vec<FieldError>),

    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, FlowError>;
