//! User Provisioning Module
//!
//! Resolves unique logins for operational staff and creates their accounts in
//! the organization directory (Microsoft Graph, or in memory for local runs).
//!
//! ## Public API
//!
//! Other modules should use the in-process client:
//! ```ignore
//! let api: Arc<dyn UserProvisioningApi> = module.client();
//! let identity = api.resolve_login(PersonName::new("María", "González")).await?;
//! ```

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::{
    client::UserProvisioningApi, error::ProvisioningError, model::NewAccount,
    model::PersonName, model::ProvisionedAccount, model::ResolvedIdentity,
};

// === MODULE DEFINITION ===
pub mod config;
pub mod module;
pub use config::UserProvisioningConfig;
pub use module::{UserProvisioningModule, MODULE_NAME};

// === INTERNAL MODULES ===
// Public for tests and the server binary; not part of the stable contract.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
