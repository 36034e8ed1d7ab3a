use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tracing::info;

use crate::api::rest::routes;
use crate::config::{DirectoryKind, UserProvisioningConfig};
use crate::contract::client::UserProvisioningApi;
use crate::domain::ports::DirectoryPort;
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::UserProvisioningLocalClient;
use crate::infra::graph::GraphDirectory;
use crate::infra::memory::InMemoryDirectory;

/// Module name used for the `modules.user_provisioning` config section.
pub const MODULE_NAME: &str = "user_provisioning";

/// Wired module: domain service plus the surfaces exposed to the host.
#[derive(Clone)]
pub struct UserProvisioningModule {
    service: Arc<Service>,
}

impl UserProvisioningModule {
    /// Build the module from its config; `mock` forces the in-memory directory.
    pub fn from_config(config: UserProvisioningConfig, mock: bool) -> anyhow::Result<Self> {
        config.validate()?;

        let directory: Arc<dyn DirectoryPort> =
            if mock || config.directory.kind == DirectoryKind::Memory {
                info!(
                    taken = config.directory.taken_logins.len(),
                    "Using in-memory directory"
                );
                Arc::new(
                    InMemoryDirectory::new().with_taken(config.directory.taken_logins.clone()),
                )
            } else {
                let settings = config.graph_settings()?;
                info!(
                    graph = %settings.graph_base_url,
                    tenant = %settings.tenant_id,
                    "Using Microsoft Graph directory"
                );
                Arc::new(GraphDirectory::new(settings).context("Failed to set up Graph directory")?)
            };

        Ok(Self::with_directory(directory, &config))
    }

    /// Build the module over an explicit directory adapter.
    pub fn with_directory(directory: Arc<dyn DirectoryPort>, config: &UserProvisioningConfig) -> Self {
        let service_config = ServiceConfig {
            domain: config.domain.trim().to_string(),
            initial_password: config.initial_password.clone(),
            max_suffix_attempts: config.max_suffix_attempts,
        };
        Self {
            service: Arc::new(Service::new(directory, service_config)),
        }
    }

    pub fn service(&self) -> Arc<Service> {
        self.service.clone()
    }

    /// In-process client for other modules.
    pub fn client(&self) -> Arc<dyn UserProvisioningApi> {
        Arc::new(UserProvisioningLocalClient::new(self.service.clone()))
    }

    pub fn router(&self) -> Router {
        routes::register_routes(self.service.clone())
    }

    pub fn openapi(&self) -> utoipa::openapi::OpenApi {
        routes::openapi()
    }
}
