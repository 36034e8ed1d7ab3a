use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::contract::model::{ProvisionedAccount, ResolvedIdentity};
use crate::domain::bulk::{BulkReport, BulkRowOutcome, RowStatus};
use crate::domain::form::{AccountForm, NameForm};

/// Query parameters for the login preview
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct NextUsernameQuery {
    /// Primary given name; may hold several words
    pub given_name: String,
    pub second_given_name: Option<String>,
    pub surname1: String,
    pub surname2: Option<String>,
}

/// REST DTO for a login preview
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NextUsernameDto {
    /// Local part, e.g. `maria.gonzalez`
    pub user_name: String,
    pub user_principal_name: String,
}

/// REST DTO for creating an operational account
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateOperationalUserReq {
    pub given_name: String,
    pub second_given_name: Option<String>,
    pub surname1: String,
    pub surname2: Option<String>,
    pub job_title: String,
    pub department: String,
}

/// REST DTO for a created account
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUserDto {
    pub id: String,
    pub user_principal_name: String,
    pub display_name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BulkRowStatusDto {
    Created,
    Failed,
}

/// Outcome of one spreadsheet row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkRowDto {
    /// Row number as shown by the spreadsheet (header row included)
    pub row: u32,
    pub status: BulkRowStatusDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_principal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// REST DTO for a bulk upload report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkReportDto {
    pub total: usize,
    pub created: usize,
    pub failed: usize,
    pub results: Vec<BulkRowDto>,
}

/// Multipart body of a bulk upload
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct BulkUploadForm {
    /// `.xlsx`, `.xls` or `.ods` workbook; the first worksheet is read
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

// Conversion implementations between REST DTOs and domain/contract models

impl From<NextUsernameQuery> for NameForm {
    fn from(q: NextUsernameQuery) -> Self {
        Self {
            given_name: q.given_name,
            second_given_name: q.second_given_name,
            surname1: q.surname1,
            surname2: q.surname2,
        }
    }
}

impl From<CreateOperationalUserReq> for AccountForm {
    fn from(req: CreateOperationalUserReq) -> Self {
        Self {
            name: NameForm {
                given_name: req.given_name,
                second_given_name: req.second_given_name,
                surname1: req.surname1,
                surname2: req.surname2,
            },
            job_title: req.job_title,
            department: req.department,
        }
    }
}

impl From<ResolvedIdentity> for NextUsernameDto {
    fn from(identity: ResolvedIdentity) -> Self {
        Self {
            user_name: identity.local_part,
            user_principal_name: identity.full_login,
        }
    }
}

impl From<ProvisionedAccount> for CreatedUserDto {
    fn from(account: ProvisionedAccount) -> Self {
        Self {
            id: account.id,
            email: account.login.clone(),
            message: format!("User {} created", account.login),
            user_principal_name: account.login,
            display_name: account.display_name,
        }
    }
}

impl From<BulkRowOutcome> for BulkRowDto {
    fn from(outcome: BulkRowOutcome) -> Self {
        Self {
            row: outcome.row,
            status: match outcome.status {
                RowStatus::Created => BulkRowStatusDto::Created,
                RowStatus::Failed => BulkRowStatusDto::Failed,
            },
            user_principal_name: outcome.login,
            display_name: outcome.display_name,
            error: outcome.error,
        }
    }
}

impl From<BulkReport> for BulkReportDto {
    fn from(report: BulkReport) -> Self {
        Self {
            total: report.total,
            created: report.created,
            failed: report.failed,
            results: report.results.into_iter().map(BulkRowDto::from).collect(),
        }
    }
}
