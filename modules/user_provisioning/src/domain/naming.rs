//! Login-character normalization.
//!
//! Independent of display casing: the output only ever contains `[a-z0-9]`.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Lower-case, strip diacritics and drop everything outside `[a-z0-9]`.
///
/// ```
/// use user_provisioning::domain::naming::normalize;
/// assert_eq!(normalize("José"), "jose");
/// assert_eq!(normalize("O'Neil-Pérez"), "oneilperez");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Normalize a component, treating an all-stripped result as absent.
pub(crate) fn normalize_non_empty(raw: &str) -> Option<String> {
    let normalized = normalize(raw);
    (!normalized.is_empty()).then_some(normalized)
}

/// Join two already-normalized components into a login local part.
pub(crate) fn local_part(given: &str, surname: &str) -> String {
    format!("{given}.{surname}")
}
