use async_trait::async_trait;
use std::sync::Arc;

use crate::contract::{
    client::UserProvisioningApi,
    error::ProvisioningError,
    model::{NewAccount, PersonName, ProvisionedAccount, ResolvedIdentity},
};
use crate::domain::service::Service;

/// Local implementation of the UserProvisioningApi trait that delegates to the domain service
pub struct UserProvisioningLocalClient {
    service: Arc<Service>,
}

impl UserProvisioningLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl UserProvisioningApi for UserProvisioningLocalClient {
    async fn resolve_login(&self, name: PersonName) -> Result<ResolvedIdentity, ProvisioningError> {
        self.service.resolve_login(&name).await.map_err(Into::into)
    }

    async fn provision(
        &self,
        account: NewAccount,
    ) -> Result<ProvisionedAccount, ProvisioningError> {
        self.service.provision(account).await.map_err(Into::into)
    }
}
