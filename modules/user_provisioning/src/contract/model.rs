/// Name parts of the person an account is provisioned for.
///
/// Values are kept as supplied (display casing included); the resolver
/// derives login characters from them with its own normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonName {
    pub primary_given: String,
    pub secondary_given: Option<String>,
    pub surname1: String,
    pub surname2: Option<String>,
}

impl PersonName {
    pub fn new(primary_given: impl Into<String>, surname1: impl Into<String>) -> Self {
        Self {
            primary_given: primary_given.into(),
            surname1: surname1.into(),
            ..Default::default()
        }
    }

    pub fn with_secondary_given(mut self, secondary_given: impl Into<String>) -> Self {
        self.secondary_given = Some(secondary_given.into());
        self
    }

    pub fn with_surname2(mut self, surname2: impl Into<String>) -> Self {
        self.surname2 = Some(surname2.into());
        self
    }

    /// Given-name parts joined by single spaces.
    pub fn given_names(&self) -> String {
        join_parts([Some(self.primary_given.as_str()), self.secondary_given.as_deref()])
    }

    /// Surname parts joined by single spaces.
    pub fn surnames(&self) -> String {
        join_parts([Some(self.surname1.as_str()), self.surname2.as_deref()])
    }

    /// Given names followed by surnames, single-space separated.
    pub fn display_name(&self) -> String {
        join_parts([
            Some(self.primary_given.as_str()),
            self.secondary_given.as_deref(),
            Some(self.surname1.as_str()),
            self.surname2.as_deref(),
        ])
    }
}

fn join_parts<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    parts
        .into_iter()
        .flatten()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A login that was confirmed (or optimistically assumed) to be free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub local_part: String,
    pub full_login: String,
}

/// Validated input for a single account provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub name: PersonName,
    pub job_title: String,
    pub department: String,
}

/// Identity of an account materialized by the directory service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedAccount {
    pub id: String,
    pub login: String,
    pub display_name: String,
}
