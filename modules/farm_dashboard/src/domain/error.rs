use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Invalid credentials: {message}")]
    InvalidCredentials { message: String },

    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Auth request rejected: {message}")]
    AuthRejected { message: String },

    #[error("No active session")]
    NotAuthenticated,

    #[error("Fetch failed: {message}")]
    Fetch { message: String },

    #[error("Persist failed: {message}")]
    Persist { message: String },

    #[error("Upload failed: {message}")]
    Upload { message: String },

    /// The object was stored but the profile field could not be patched.
    #[error("Asset stored at '{path}' but profile patch failed: {message}")]
    AssetPatch { path: String, message: String },
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn password_mismatch() -> Self {
        Self::PasswordMismatch
    }

    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        Self::InvalidCredentials {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn auth_rejected(message: impl Into<String>) -> Self {
        Self::AuthRejected {
            message: message.into(),
        }
    }

    pub fn not_authenticated() -> Self {
        Self::NotAuthenticated
    }

    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    pub fn persist(message: impl Into<String>) -> Self {
        Self::Persist {
            message: message.into(),
        }
    }

    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload {
            message: message.into(),
        }
    }

    pub fn asset_patch(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AssetPatch {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Local, pre-flight failures that never reached the backend.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::PasswordMismatch)
    }
}
