//! Wire shapes of the Microsoft Graph and identity-platform endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::ports::AccountRequest;

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

/// Error body of the token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserList {
    #[serde(default)]
    pub value: Vec<UserRef>,
}

#[derive(Debug, Deserialize)]
pub struct UserRef {
    #[allow(dead_code)]
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordProfileBody<'a> {
    pub password: &'a str,
    pub force_change_password_next_sign_in: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserBody<'a> {
    pub account_enabled: bool,
    pub display_name: &'a str,
    pub mail_nickname: &'a str,
    pub user_principal_name: &'a str,
    pub given_name: &'a str,
    pub surname: &'a str,
    pub job_title: &'a str,
    pub department: &'a str,
    pub password_profile: PasswordProfileBody<'a>,
}

impl<'a> From<&'a AccountRequest> for CreateUserBody<'a> {
    fn from(r: &'a AccountRequest) -> Self {
        Self {
            account_enabled: r.account_enabled,
            display_name: &r.display_name,
            mail_nickname: &r.mail_nickname,
            user_principal_name: &r.user_principal_name,
            given_name: &r.given_name,
            surname: &r.surname,
            job_title: &r.job_title,
            department: &r.department,
            password_profile: PasswordProfileBody {
                password: &r.password_profile.password,
                force_change_password_next_sign_in: r
                    .password_profile
                    .force_change_password_next_sign_in,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    pub id: String,
    #[serde(default)]
    pub user_principal_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// `{ "error": { "code": "...", "message": "..." } }`
#[derive(Debug, Deserialize)]
pub struct GraphErrorBody {
    pub error: GraphErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct GraphErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}
