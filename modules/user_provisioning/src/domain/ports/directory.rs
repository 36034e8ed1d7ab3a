use async_trait::async_trait;
use thiserror::Error;

use crate::contract::model::ProvisionedAccount;

/// Transport-level failures reported by a directory adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The directory already holds an object with the same login.
    #[error("conflict: {message}")]
    Conflict { message: String },

    /// Credentials were refused or lack the required permissions.
    #[error("unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// The directory refused the payload as invalid.
    #[error("rejected: {message}")]
    Rejected { message: String },

    /// Network errors, timeouts, 5xx and undecodable responses.
    #[error("directory unavailable: {message}")]
    Unavailable { message: String },
}

impl DirectoryError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Password settings sent along with a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordProfile {
    pub password: String,
    pub force_change_password_next_sign_in: bool,
}

/// Fully-formed account creation request; the adapter only serializes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRequest {
    pub account_enabled: bool,
    pub display_name: String,
    pub mail_nickname: String,
    pub user_principal_name: String,
    pub given_name: String,
    pub surname: String,
    pub job_title: String,
    pub department: String,
    pub password_profile: PasswordProfile,
}

/// Existence check used while searching for a free login.
#[async_trait]
pub trait LoginOracle: Send + Sync {
    /// Whether an account with this full login is already present.
    async fn login_exists(&self, full_login: &str) -> Result<bool, DirectoryError>;
}

/// Port for the domain layer: the directory operations provisioning needs.
#[async_trait]
pub trait DirectoryPort: LoginOracle {
    /// Materialize the account. The directory is the authority on collisions.
    async fn create_account(
        &self,
        request: &AccountRequest,
    ) -> Result<ProvisionedAccount, DirectoryError>;
}
