//! Optional Contact Fields
//!
//! Phone number and LinkedIn reference. Both are optional; a blank
//! submission means "absent" so that empty values never collide on the
//! unique indexes.

use kernel::error::app_error::{AppError, AppResult};

/// Maximum length of a contact field, in characters
pub const CONTACT_MAX_LENGTH: usize = 255;

/// Normalize an optional contact field: trimmed, blank becomes `None`
pub fn optional_contact(raw: Option<&str>, label: &str) -> AppResult<Option<String>> {
    let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    if value.chars().count() > CONTACT_MAX_LENGTH {
        return Err(AppError::bad_request(format!(
            "{label} must be at most {CONTACT_MAX_LENGTH} characters."
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(AppError::bad_request(format!(
            "{label} contains invalid characters."
        )));
    }

    Ok(Some(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_is_absent() {
        assert_eq!(optional_contact(None, "Phone").unwrap(), None);
        assert_eq!(optional_contact(Some(""), "Phone").unwrap(), None);
        assert_eq!(optional_contact(Some("   "), "Phone").unwrap(), None);
    }

    #[test]
    fn test_value_is_trimmed() {
        assert_eq!(
            optional_contact(Some(" 555-0100 "), "Phone").unwrap(),
            Some("555-0100".to_string())
        );
    }

    #[test]
    fn test_too_long_rejected() {
        let err = optional_contact(Some(&"9".repeat(CONTACT_MAX_LENGTH + 1)), "Phone").unwrap_err();
        assert!(err.message().starts_with("Phone"));
    }
}
