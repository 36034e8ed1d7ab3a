pub mod client;
pub mod error;
pub mod model;

pub use client::UserProvisioningApi;
pub use error::ProvisioningError;
pub use model::{NewAccount, PersonName, ProvisionedAccount, ResolvedIdentity};
