//! Name validation for document owners and document names.
//!
//! Valid names:
//! - Must be non-empty after trimming surrounding whitespace
//! - Must not contain control characters
//! - Must not contain `/` (the owner/name separator in display form)
//! - Must not exceed the per-kind length limit
//!
//! Interior spaces are allowed in document names ("Fifth Test") but not in
//! user names.

use crate::error::TypeError;

/// Maximum length of a user name, in characters.
pub const MAX_USER_NAME_LEN: usize = 64;

/// Maximum length of a document name, in characters.
pub const MAX_DOCUMENT_NAME_LEN: usize = 128;

/// Validate a user name, returning the trimmed form.
///
/// ```
/// use quire_types::names::validate_user_name;
///
/// assert_eq!(validate_user_name(" sim ").unwrap(), "sim");
/// assert!(validate_user_name("").is_err());
/// assert!(validate_user_name("two words").is_err());
/// ```
pub fn validate_user_name(name: &str) -> Result<String, TypeError> {
    let trimmed = validate_common("user name", name, MAX_USER_NAME_LEN)?;
    if trimmed.chars().any(char::is_whitespace) {
        return Err(invalid("user name", name, "must not contain whitespace"));
    }
    Ok(trimmed.to_string())
}

/// Validate a document name, returning the trimmed form.
pub fn validate_document_name(name: &str) -> Result<String, TypeError> {
    validate_common("document name", name, MAX_DOCUMENT_NAME_LEN).map(str::to_string)
}

fn validate_common<'a>(
    kind: &'static str,
    name: &'a str,
    max_len: usize,
) -> Result<&'a str, TypeError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid(kind, name, "must not be empty"));
    }
    if trimmed.chars().count() > max_len {
        return Err(invalid(
            kind,
            name,
            &format!("must be at most {max_len} characters"),
        ));
    }
    if let Some(ch) = trimmed.chars().find(|c| c.is_control()) {
        return Err(invalid(
            kind,
            name,
            &format!("contains control character {ch:?}"),
        ));
    }
    if trimmed.contains('/') {
        return Err(invalid(kind, name, "must not contain '/'"));
    }
    Ok(trimmed)
}

fn invalid(kind: &'static str, value: &str, reason: &str) -> TypeError {
    TypeError::InvalidName {
        kind,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
