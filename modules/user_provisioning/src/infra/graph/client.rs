use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use modkit::TracedClient;
use reqwest::{header, Method, Response, StatusCode};
use tracing::{debug, instrument, warn};
use url::{form_urlencoded, Url};

use super::dto::{
    CreateUserBody, CreatedUser, GraphErrorBody, TokenErrorBody, TokenResponse, UserList,
};
use super::token::TokenCache;
use crate::config::GraphSettings;
use crate::contract::model::ProvisionedAccount;
use crate::domain::ports::{AccountRequest, DirectoryError, DirectoryPort, LoginOracle};

const GRAPH_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Directory adapter over Microsoft Graph `/v1.0/users`, authenticated with
/// the OAuth2 client-credentials flow.
pub struct GraphDirectory {
    client: TracedClient,
    settings: GraphSettings,
    tokens: TokenCache,
}

impl GraphDirectory {
    pub fn new(settings: GraphSettings) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_sec))
            .build()
            .context("Failed to build Graph HTTP client")?;
        Ok(Self::with_client(TracedClient::new(http), settings))
    }

    pub fn with_client(client: TracedClient, settings: GraphSettings) -> Self {
        Self {
            client,
            settings,
            tokens: TokenCache::new(),
        }
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.settings.authority_url, self.settings.tenant_id
        )
    }

    fn users_url(&self) -> Result<Url, DirectoryError> {
        Url::parse(&format!("{}/v1.0/users", self.settings.graph_base_url))
            .map_err(|e| DirectoryError::unavailable(format!("invalid Graph base URL: {e}")))
    }

    #[instrument(name = "user_provisioning.graph.acquire_token", skip_all)]
    async fn access_token(&self) -> Result<String, DirectoryError> {
        if let Some(token) = self.tokens.get() {
            return Ok(token);
        }

        let form = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "client_credentials")
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("client_secret", &self.settings.client_secret)
            .append_pair("scope", GRAPH_SCOPE)
            .finish();
        let request = self
            .client
            .request(Method::POST, &self.token_url())
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(form);

        let response = self.client.send(request).await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "token request refused");
            return Err(classify_token_error(status, &body));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DirectoryError::unavailable(format!("invalid token response: {e}")))?;
        self.tokens
            .store(token.access_token.clone(), Duration::from_secs(token.expires_in));
        debug!(expires_in = token.expires_in, "access token acquired");
        Ok(token.access_token)
    }

    /// Turn a non-success resource response into a classified error.
    async fn failure(&self, response: Response) -> DirectoryError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let error = classify_graph_error(status.as_u16(), &body);
        if matches!(error, DirectoryError::Unauthorized { .. }) {
            self.tokens.invalidate();
        }
        error
    }
}

#[async_trait]
impl LoginOracle for GraphDirectory {
    #[instrument(
        name = "user_provisioning.graph.login_exists",
        skip_all,
        fields(login = %full_login)
    )]
    async fn login_exists(&self, full_login: &str) -> Result<bool, DirectoryError> {
        let token = self.access_token().await?;

        let mut url = self.users_url()?;
        url.query_pairs_mut()
            .append_pair(
                "$filter",
                &format!("userPrincipalName eq {}", odata_string_literal(full_login)),
            )
            .append_pair("$select", "id");

        let request = self
            .client
            .request(Method::GET, url.as_str())
            .bearer_auth(token);
        let response = self.client.send(request).await.map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(self.failure(response).await);
        }

        let list: UserList = response
            .json()
            .await
            .map_err(|e| DirectoryError::unavailable(format!("invalid user list: {e}")))?;
        Ok(!list.value.is_empty())
    }
}

#[async_trait]
impl DirectoryPort for GraphDirectory {
    #[instrument(
        name = "user_provisioning.graph.create_account",
        skip_all,
        fields(login = %request.user_principal_name)
    )]
    async fn create_account(
        &self,
        request: &AccountRequest,
    ) -> Result<ProvisionedAccount, DirectoryError> {
        let token = self.access_token().await?;
        let url = self.users_url()?;

        let builder = self
            .client
            .request(Method::POST, url.as_str())
            .bearer_auth(token)
            .json(&CreateUserBody::from(request));
        let response = self.client.send(builder).await.map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(self.failure(response).await);
        }

        let created: CreatedUser = response
            .json()
            .await
            .map_err(|e| DirectoryError::unavailable(format!("invalid create response: {e}")))?;
        debug!(id = %created.id, "Graph user created");

        Ok(ProvisionedAccount {
            id: created.id,
            login: created
                .user_principal_name
                .unwrap_or_else(|| request.user_principal_name.clone()),
            display_name: created
                .display_name
                .unwrap_or_else(|| request.display_name.clone()),
        })
    }
}

/// Quote a value as an OData string literal (single quotes doubled).
pub fn odata_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Map a Graph error response onto the directory error taxonomy.
pub fn classify_graph_error(status: u16, body: &str) -> DirectoryError {
    let detail = serde_json::from_str::<GraphErrorBody>(body)
        .ok()
        .map(|b| b.error);
    let message = detail
        .as_ref()
        .map(|d| d.message.trim())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| match body.trim() {
            "" => format!("HTTP {status}"),
            raw => raw.to_string(),
        });

    let duplicate = detail.as_ref().is_some_and(|d| {
        matches!(d.code.as_str(), "Request_BadRequest" | "ObjectConflict")
            && d.message.to_lowercase().contains("already exists")
    });

    match status {
        409 => DirectoryError::Conflict { message },
        400 if duplicate => DirectoryError::Conflict { message },
        401 | 403 => DirectoryError::Unauthorized { status, message },
        400 => DirectoryError::Rejected { message },
        _ => DirectoryError::unavailable(format!("HTTP {status}: {message}")),
    }
}

fn classify_token_error(status: StatusCode, body: &str) -> DirectoryError {
    let message = serde_json::from_str::<TokenErrorBody>(body)
        .map(|b| b.error_description.unwrap_or(b.error))
        .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
    if status.is_server_error() {
        DirectoryError::unavailable(format!("token endpoint failed: {message}"))
    } else {
        DirectoryError::Unauthorized {
            status: status.as_u16(),
            message,
        }
    }
}

fn transport_error(e: reqwest::Error) -> DirectoryError {
    if e.is_timeout() {
        DirectoryError::unavailable(format!("request timed out: {e}"))
    } else {
        DirectoryError::unavailable(e.to_string())
    }
}
