use async_trait::async_trait;

use crate::contract::{
    error::ProvisioningError,
    model::{NewAccount, PersonName, ProvisionedAccount, ResolvedIdentity},
};

/// Public API trait for the user_provisioning module that other modules can use
#[async_trait]
pub trait UserProvisioningApi: Send + Sync {
    /// Preview the login a person would receive, without creating anything
    async fn resolve_login(&self, name: PersonName) -> Result<ResolvedIdentity, ProvisioningError>;

    /// Resolve a login and create the account in the directory
    async fn provision(&self, account: NewAccount)
        -> Result<ProvisionedAccount, ProvisioningError>;
}
