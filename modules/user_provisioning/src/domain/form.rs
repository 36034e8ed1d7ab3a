//! Field rules and display normalization for raw provisioning input.
//!
//! REST requests and spreadsheet rows both arrive as free text; these forms
//! trim, check and re-case them before anything reaches the resolver.

use std::collections::BTreeMap;

use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::contract::model::{NewAccount, PersonName};
use crate::domain::error::DomainError;

const ACCENTED_LETTERS: &str = "áéíóúÁÉÍÓÚñÑüÜ";

fn letters_only(value: &str) -> Result<(), ValidationError> {
    let ok = value.chars().all(|c| {
        c.is_ascii_alphabetic() || ACCENTED_LETTERS.contains(c) || c.is_whitespace() || c == '-'
    });
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("letters_only").with_message("only letters are allowed".into()))
    }
}

/// Name fields as typed by an operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct NameForm {
    #[validate(
        length(min = 3, max = 50, message = "must have between 3 and 50 characters"),
        custom(function = "letters_only")
    )]
    pub given_name: String,
    #[validate(
        length(min = 3, max = 50, message = "must have between 3 and 50 characters"),
        custom(function = "letters_only")
    )]
    pub second_given_name: Option<String>,
    #[validate(
        length(min = 3, max = 50, message = "must have between 3 and 50 characters"),
        custom(function = "letters_only")
    )]
    pub surname1: String,
    #[validate(
        length(min = 3, max = 50, message = "must have between 3 and 50 characters"),
        custom(function = "letters_only")
    )]
    pub surname2: Option<String>,
}

/// Full provisioning form: name plus job data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct AccountForm {
    #[validate(nested)]
    pub name: NameForm,
    #[validate(length(min = 3, max = 50, message = "must have between 3 and 50 characters"))]
    pub job_title: String,
    #[validate(length(min = 3, max = 50, message = "must have between 3 and 50 characters"))]
    pub department: String,
}

impl NameForm {
    fn trimmed(self) -> Self {
        Self {
            given_name: self.given_name.trim().to_string(),
            second_given_name: trim_optional(self.second_given_name),
            surname1: self.surname1.trim().to_string(),
            surname2: trim_optional(self.surname2),
        }
    }

    fn check_required(&self) -> Result<(), DomainError> {
        require("given_name", &self.given_name)?;
        require("surname1", &self.surname1)
    }

    /// Validate and title-case into a [`PersonName`].
    ///
    /// A single given-name field holding several words is split: the first
    /// word becomes the primary given name, the rest the secondary one.
    pub fn into_person_name(self) -> Result<PersonName, DomainError> {
        let form = self.trimmed();
        form.check_required()?;
        form.validate().map_err(first_violation)?;
        Ok(form.into_person_name_unchecked())
    }

    fn into_person_name_unchecked(self) -> PersonName {
        let (primary, secondary) = match self.second_given_name {
            Some(second) => (self.given_name, Some(second)),
            None => match self.given_name.split_once(char::is_whitespace) {
                Some((first, rest)) => (first.to_string(), Some(rest.trim().to_string())),
                None => (self.given_name, None),
            },
        };

        PersonName {
            primary_given: title_case(&primary),
            secondary_given: secondary.as_deref().map(title_case),
            surname1: title_case(&self.surname1),
            surname2: self.surname2.as_deref().map(title_case),
        }
    }
}

impl AccountForm {
    /// Validate, then title-case names and upper-case job title and department.
    pub fn into_new_account(self) -> Result<NewAccount, DomainError> {
        let form = Self {
            name: self.name.trimmed(),
            job_title: self.job_title.trim().to_string(),
            department: self.department.trim().to_string(),
        };
        form.name.check_required()?;
        require("job_title", &form.job_title)?;
        require("department", &form.department)?;
        form.validate().map_err(first_violation)?;

        Ok(NewAccount {
            name: form.name.into_person_name_unchecked(),
            job_title: form.job_title.to_uppercase(),
            department: form.department.to_uppercase(),
        })
    }
}

/// Lower-case every word, capitalize its first letter, single-space join.
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require(field: &str, value: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::validation(field, "is required"));
    }
    Ok(())
}

/// Reduce validator output to the first violation, ordered by field path.
fn first_violation(errors: ValidationErrors) -> DomainError {
    let mut flat = BTreeMap::new();
    flatten_errors(&errors, "", &mut flat);

    match flat.into_iter().next() {
        Some((field, message)) => DomainError::validation(field, message),
        None => DomainError::validation("form", "invalid input"),
    }
}

fn flatten_errors(errors: &ValidationErrors, prefix: &str, out: &mut BTreeMap<String, String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                if let Some(err) = list.first() {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    out.insert(path, message);
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    flatten_errors(inner, &format!("{path}[{idx}]"), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_form(given: &str, surname1: &str) -> NameForm {
        NameForm {
            given_name: given.to_string(),
            surname1: surname1.to_string(),
            ..Default::default()
        }
    }

    fn account_form(name: NameForm) -> AccountForm {
        AccountForm {
            name,
            job_title: " operador de planta ".to_string(),
            department: "mina".to_string(),
        }
    }

    #[test]
    fn title_case_collapses_whitespace() {
        assert_eq!(title_case("  maría   JOSÉ "), "María José");
        assert_eq!(title_case("ñusta"), "Ñusta");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn account_form_normalizes_display_values() {
        let mut name = name_form("  juan ", "PÉREZ");
        name.surname2 = Some(" gómez ".to_string());
        let account = account_form(name).into_new_account().unwrap();

        assert_eq!(account.name.primary_given, "Juan");
        assert_eq!(account.name.surname1, "Pérez");
        assert_eq!(account.name.surname2.as_deref(), Some("Gómez"));
        assert_eq!(account.job_title, "OPERADOR DE PLANTA");
        assert_eq!(account.department, "MINA");
    }

    #[test]
    fn multi_word_given_name_is_split() {
        let person = name_form("ana maría luisa", "Soto").into_person_name().unwrap();
        assert_eq!(person.primary_given, "Ana");
        assert_eq!(person.secondary_given.as_deref(), Some("María Luisa"));
    }

    #[test]
    fn explicit_second_given_name_wins_over_split() {
        let mut form = name_form("Ana María", "Soto");
        form.second_given_name = Some("Luisa".to_string());
        let person = form.into_person_name().unwrap();
        assert_eq!(person.primary_given, "Ana María");
        assert_eq!(person.secondary_given.as_deref(), Some("Luisa"));
    }

    #[test]
    fn blank_optional_fields_become_absent() {
        let mut form = name_form("Ana", "Soto");
        form.surname2 = Some("   ".to_string());
        let person = form.into_person_name().unwrap();
        assert_eq!(person.surname2, None);
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let err = name_form("  ", "Soto").into_person_name().unwrap_err();
        assert_eq!(err, DomainError::validation("given_name", "is required"));

        let mut form = account_form(name_form("Ana", "Soto"));
        form.department = " ".to_string();
        let err = form.into_new_account().unwrap_err();
        assert_eq!(err, DomainError::validation("department", "is required"));
    }

    #[test]
    fn length_limits_are_enforced() {
        let err = name_form("Al", "Soto").into_person_name().unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "given_name"));

        let long = "a".repeat(51);
        let err = name_form("Ana", &long).into_person_name().unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "surname1"));
    }

    #[test]
    fn name_fields_reject_digits_and_symbols() {
        let err = name_form("Ana3", "Soto").into_person_name().unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("given_name", "only letters are allowed")
        );
    }

    #[test]
    fn nested_errors_carry_field_path() {
        let form = account_form(name_form("Ana", "S0to"));
        let err = form.into_new_account().unwrap_err();
        assert_eq!(
            err,
            DomainError::validation("name.surname1", "only letters are allowed")
        );
    }

    #[test]
    fn job_fields_accept_digits() {
        let mut form = account_form(name_form("Ana", "Soto"));
        form.job_title = "Operador 2".to_string();
        assert_eq!(form.into_new_account().unwrap().job_title, "OPERADOR 2");
    }
}
