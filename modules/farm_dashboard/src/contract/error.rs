use thiserror::Error;

/// Errors that are safe to expose to callers of the dashboard
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Authentication failed: {message}")]
    Auth { message: String },

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Failed to load data: {message}")]
    Fetch { message: String },

    #[error("Failed to save data: {message}")]
    Persist { message: String },

    #[error("Failed to upload file: {message}")]
    Upload { message: String },
}

/// Stable classification of [`DashboardError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    PasswordMismatch,
    InvalidCredentials,
    Network,
    Auth,
    NotAuthenticated,
    Fetch,
    Persist,
    Upload,
}

impl DashboardError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::PasswordMismatch => ErrorKind::PasswordMismatch,
            Self::InvalidCredentials { .. } => ErrorKind::InvalidCredentials,
            Self::Network { .. } => ErrorKind::Network,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::NotAuthenticated => ErrorKind::NotAuthenticated,
            Self::Fetch { .. } => ErrorKind::Fetch,
            Self::Persist { .. } => ErrorKind::Persist,
            Self::Upload { .. } => ErrorKind::Upload,
        }
    }
}

impl From<crate::domain::error::DomainError> for DashboardError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            Validation { field, message } => Self::validation(format!("{}: {}", field, message)),
            PasswordMismatch => Self::PasswordMismatch,
            InvalidCredentials { message } => Self::InvalidCredentials { message },
            Network { message } => Self::Network { message },
            AuthRejected { message } => Self::Auth { message },
            NotAuthenticated => Self::NotAuthenticated,
            Fetch { message } => Self::Fetch { message },
            Persist { message } => Self::Persist { message },
            AssetPatch { message, .. } => Self::Persist { message },
            Upload { message } => Self::Upload { message },
        }
    }
}
