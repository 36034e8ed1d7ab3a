use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::contract::model::ProvisionedAccount;
use crate::domain::ports::{AccountRequest, DirectoryError, DirectoryPort, LoginOracle};

#[derive(Default)]
struct State {
    // keyed by lower-cased login
    accounts: HashMap<String, ProvisionedAccount>,
    created: Vec<AccountRequest>,
    lookups: Vec<String>,
}

/// Process-local directory used by `--mock` runs and tests.
#[derive(Default)]
pub struct InMemoryDirectory {
    state: Mutex<State>,
    lookup_error: Option<DirectoryError>,
    create_error: Option<DirectoryError>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-register logins as existing accounts.
    pub fn with_taken<I, S>(self, logins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut state = self.state.lock();
            for login in logins {
                let login = login.into();
                state.accounts.insert(
                    login.to_lowercase(),
                    ProvisionedAccount {
                        id: Uuid::new_v4().to_string(),
                        login: login.clone(),
                        display_name: login,
                    },
                );
            }
        }
        self
    }

    /// Every existence check fails with `error`.
    pub fn with_lookup_error(mut self, error: DirectoryError) -> Self {
        self.lookup_error = Some(error);
        self
    }

    /// Every creation fails with `error`.
    pub fn with_create_error(mut self, error: DirectoryError) -> Self {
        self.create_error = Some(error);
        self
    }

    /// Logins probed so far, in order.
    pub fn lookups(&self) -> Vec<String> {
        self.state.lock().lookups.clone()
    }

    /// Creation requests accepted so far, in order.
    pub fn created(&self) -> Vec<AccountRequest> {
        self.state.lock().created.clone()
    }

    pub fn contains(&self, login: &str) -> bool {
        self.state
            .lock()
            .accounts
            .contains_key(&login.to_lowercase())
    }
}

#[async_trait]
impl LoginOracle for InMemoryDirectory {
    async fn login_exists(&self, full_login: &str) -> Result<bool, DirectoryError> {
        let mut state = self.state.lock();
        state.lookups.push(full_login.to_string());
        if let Some(err) = &self.lookup_error {
            return Err(err.clone());
        }
        Ok(state.accounts.contains_key(&full_login.to_lowercase()))
    }
}

#[async_trait]
impl DirectoryPort for InMemoryDirectory {
    async fn create_account(
        &self,
        request: &AccountRequest,
    ) -> Result<ProvisionedAccount, DirectoryError> {
        if let Some(err) = &self.create_error {
            return Err(err.clone());
        }

        let key = request.user_principal_name.to_lowercase();
        let mut state = self.state.lock();
        if state.accounts.contains_key(&key) {
            return Err(DirectoryError::Conflict {
                message: format!(
                    "Another object with the same value for property userPrincipalName already exists: {}",
                    request.user_principal_name
                ),
            });
        }

        let account = ProvisionedAccount {
            id: Uuid::new_v4().to_string(),
            login: request.user_principal_name.clone(),
            display_name: request.display_name.clone(),
        };
        state.accounts.insert(key, account.clone());
        state.created.push(request.clone());
        debug!(login = %account.login, "in-memory account created");
        Ok(account)
    }
}
