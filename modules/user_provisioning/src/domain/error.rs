use thiserror::Error;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid name: '{component}' has no usable characters")]
    InvalidName { component: String },

    #[error("No free login left for '{base}' after {attempts} suffixes")]
    ExhaustedSuffixSpace { base: String, attempts: u32 },

    #[error("Login '{login}' already exists in the directory")]
    AlreadyExists { login: String },

    #[error("Directory service authentication failed: {message}")]
    ServiceAuth { message: String },

    #[error("Account creation failed: {message}")]
    CreationFailed {
        message: String,
        /// The directory rejected the payload itself (as opposed to failing).
        rejected_input: bool,
    },

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },
}

impl DomainError {
    pub fn invalid_name(component: impl Into<String>) -> Self {
        Self::InvalidName {
            component: component.into(),
        }
    }

    pub fn exhausted_suffix_space(base: impl Into<String>, attempts: u32) -> Self {
        Self::ExhaustedSuffixSpace {
            base: base.into(),
            attempts,
        }
    }

    pub fn already_exists(login: impl Into<String>) -> Self {
        Self::AlreadyExists {
            login: login.into(),
        }
    }

    pub fn service_auth(message: impl Into<String>) -> Self {
        Self::ServiceAuth {
            message: message.into(),
        }
    }

    pub fn creation_failed(message: impl Into<String>) -> Self {
        Self::CreationFailed {
            message: message.into(),
            rejected_input: false,
        }
    }

    pub fn creation_rejected(message: impl Into<String>) -> Self {
        Self::CreationFailed {
            message: message.into(),
            rejected_input: true,
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}
