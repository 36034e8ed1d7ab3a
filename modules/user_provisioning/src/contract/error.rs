use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningError {
    #[error("Invalid name: '{component}' has no usable characters")]
    InvalidName { component: String },

    #[error("No free login left for '{base}' after {attempts} suffixes")]
    ExhaustedSuffixSpace { base: String, attempts: u32 },

    #[error("Login '{login}' already exists")]
    AlreadyExists { login: String },

    #[error("Directory service authentication failed: {message}")]
    ServiceAuth { message: String },

    #[error("Account creation failed: {message}")]
    CreationFailed { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },
}

impl ProvisioningError {
    pub fn invalid_name(component: impl Into<String>) -> Self {
        Self::InvalidName {
            component: component.into(),
        }
    }

    pub fn already_exists(login: impl Into<String>) -> Self {
        Self::AlreadyExists {
            login: login.into(),
        }
    }

    pub fn creation_failed(message: impl Into<String>) -> Self {
        Self::CreationFailed {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<crate::domain::error::DomainError> for ProvisioningError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            InvalidName { component } => Self::invalid_name(component),
            ExhaustedSuffixSpace { base, attempts } => {
                Self::ExhaustedSuffixSpace { base, attempts }
            }
            AlreadyExists { login } => Self::already_exists(login),
            ServiceAuth { message } => Self::ServiceAuth { message },
            CreationFailed { message, .. } => Self::creation_failed(message),
            Validation { field, message } => Self::validation(format!("{}: {}", field, message)),
        }
    }
}
