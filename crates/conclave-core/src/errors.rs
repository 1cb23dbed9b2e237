use thiserror::Error;

/// Boundary error taxonomy. Handlers map these onto HTTP status codes;
/// everything else travels as `anyhow::Error` and surfaces as a 500.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    /// Misconfigured collaborator (e.g. missing auth secret), distinct from
    /// an invalid credential.
    #[error("{0}")]
    Infrastructure(String),
}

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ServiceError::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }
}
