use crate::domain::form::AccountForm;

/// One decoded spreadsheet row, numbered as the spreadsheet shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRow {
    pub row: u32,
    pub form: AccountForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Created,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRowOutcome {
    pub row: u32,
    pub status: RowStatus,
    pub login: Option<String>,
    pub display_name: Option<String>,
    pub error: Option<String>,
}

impl BulkRowOutcome {
    pub fn created(row: u32, login: String, display_name: String) -> Self {
        Self {
            row,
            status: RowStatus::Created,
            login: Some(login),
            display_name: Some(display_name),
            error: None,
        }
    }

    pub fn failed(row: u32, error: impl Into<String>) -> Self {
        Self {
            row,
            status: RowStatus::Failed,
            login: None,
            display_name: None,
            error: Some(error.into()),
        }
    }
}

/// Per-row results of a bulk upload, in spreadsheet order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkReport {
    pub total: usize,
    pub created: usize,
    pub failed: usize,
    pub results: Vec<BulkRowOutcome>,
}

impl BulkReport {
    pub fn push(&mut self, outcome: BulkRowOutcome) {
        self.total += 1;
        match outcome.status {
            RowStatus::Created => self.created += 1,
            RowStatus::Failed => self.failed += 1,
        }
        self.results.push(outcome);
    }
}
