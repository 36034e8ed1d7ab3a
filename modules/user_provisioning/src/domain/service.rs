use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::contract::model::{NewAccount, PersonName, ProvisionedAccount, ResolvedIdentity};
use crate::domain::bulk::{BulkReport, BulkRow, BulkRowOutcome};
use crate::domain::error::DomainError;
use crate::domain::ports::{AccountRequest, DirectoryError, DirectoryPort, PasswordProfile};
use crate::domain::resolver::{LoginResolver, DEFAULT_MAX_SUFFIX_ATTEMPTS};

/// Domain service orchestrating login resolution and account creation.
/// Depends only on the directory port, not on infra types.
#[derive(Clone)]
pub struct Service {
    directory: Arc<dyn DirectoryPort>,
    resolver: LoginResolver,
    config: ServiceConfig,
}

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub domain: String,
    pub initial_password: String,
    pub max_suffix_attempts: u32,
}

impl ServiceConfig {
    pub fn new(domain: impl Into<String>, initial_password: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            initial_password: initial_password.into(),
            max_suffix_attempts: DEFAULT_MAX_SUFFIX_ATTEMPTS,
        }
    }
}

impl Service {
    pub fn new(directory: Arc<dyn DirectoryPort>, config: ServiceConfig) -> Self {
        let resolver = LoginResolver::new(config.domain.clone())
            .with_max_suffix_attempts(config.max_suffix_attempts);
        Self {
            directory,
            resolver,
            config,
        }
    }

    #[instrument(name = "user_provisioning.service.resolve_login", skip(self, name))]
    pub async fn resolve_login(&self, name: &PersonName) -> Result<ResolvedIdentity, DomainError> {
        debug!("Resolving login preview");
        let identity = self.resolver.resolve(name, self.directory.as_ref()).await?;
        debug!(login = %identity.full_login, "Resolved login preview");
        Ok(identity)
    }

    #[instrument(
        name = "user_provisioning.service.provision",
        skip(self, account),
        fields(display_name = tracing::field::Empty, login = tracing::field::Empty)
    )]
    pub async fn provision(&self, account: NewAccount) -> Result<ProvisionedAccount, DomainError> {
        let span = tracing::Span::current();
        span.record("display_name", account.name.display_name().as_str());
        info!("Provisioning account");

        let identity = self
            .resolver
            .resolve(&account.name, self.directory.as_ref())
            .await?;
        span.record("login", identity.full_login.as_str());

        let request = self.account_request(&account, &identity);
        let created = self
            .directory
            .create_account(&request)
            .await
            .map_err(|e| map_directory_error(e, &identity.full_login))?;

        info!(id = %created.id, "Successfully provisioned account");
        Ok(created)
    }

    /// Provision every row in order; one row's failure never stops the batch.
    #[instrument(name = "user_provisioning.service.provision_batch", skip(self, rows), fields(rows = rows.len()))]
    pub async fn provision_batch(&self, rows: Vec<BulkRow>) -> BulkReport {
        info!("Processing bulk provisioning");
        let mut report = BulkReport::default();

        for BulkRow { row, form } in rows {
            let outcome = match form.into_new_account() {
                Ok(account) => match self.provision(account).await {
                    Ok(created) => BulkRowOutcome::created(row, created.login, created.display_name),
                    Err(e) => BulkRowOutcome::failed(row, e.to_string()),
                },
                Err(e) => BulkRowOutcome::failed(row, e.to_string()),
            };
            if outcome.error.is_some() {
                warn!(row, error = ?outcome.error, "Bulk row failed");
            }
            report.push(outcome);
        }

        info!(
            total = report.total,
            created = report.created,
            failed = report.failed,
            "Bulk provisioning finished"
        );
        report
    }

    fn account_request(&self, account: &NewAccount, identity: &ResolvedIdentity) -> AccountRequest {
        AccountRequest {
            account_enabled: true,
            display_name: account.name.display_name(),
            mail_nickname: identity.local_part.clone(),
            user_principal_name: identity.full_login.clone(),
            given_name: account.name.given_names(),
            surname: account.name.surnames(),
            job_title: account.job_title.clone(),
            department: account.department.clone(),
            password_profile: PasswordProfile {
                password: self.config.initial_password.clone(),
                force_change_password_next_sign_in: true,
            },
        }
    }
}

fn map_directory_error(error: DirectoryError, login: &str) -> DomainError {
    match error {
        DirectoryError::Conflict { .. } => DomainError::already_exists(login),
        DirectoryError::Unauthorized { message, .. } => DomainError::service_auth(message),
        DirectoryError::Rejected { message } => DomainError::creation_rejected(message),
        DirectoryError::Unavailable { message } => DomainError::creation_failed(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_errors_map_to_domain_errors() {
        let login = "ana.soto@corp.test";
        assert_eq!(
            map_directory_error(
                DirectoryError::Conflict {
                    message: "taken".into()
                },
                login
            ),
            DomainError::already_exists(login)
        );
        assert_eq!(
            map_directory_error(
                DirectoryError::Unauthorized {
                    status: 403,
                    message: "denied".into()
                },
                login
            ),
            DomainError::service_auth("denied")
        );
        assert_eq!(
            map_directory_error(
                DirectoryError::Rejected {
                    message: "bad payload".into()
                },
                login
            ),
            DomainError::creation_rejected("bad payload")
        );
        assert_eq!(
            map_directory_error(DirectoryError::unavailable("timeout"), login),
            DomainError::creation_failed("timeout")
        );
    }
}
