//! Input validation helpers shared by domain constructors.

use crate::error::{DomainError, DomainResult};

/// Require a non-blank text field, returning it trimmed.
///
/// `field` names the input in the error message so callers can tell which
/// form field was rejected.
pub fn required(field: &'static str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}
