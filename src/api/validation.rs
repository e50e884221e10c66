use validator::Validate;

use crate::api::errors::ApiError;
use crate::db::types::UserRole;

pub(crate) const MIN_PASSWORD_LEN: usize = 8;

pub(crate) fn validate_password_len(password: &str) -> Result<(), ApiError> {
    if password.chars().count() >= MIN_PASSWORD_LEN {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )))
    }
}

pub(crate) fn validate_payload(payload: &impl Validate) -> Result<(), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// Trimmed value of a required text field, or 400 naming the field.
pub(crate) fn require_text<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("{field} is required")))
}

pub(crate) fn require_role(value: Option<&str>) -> Result<UserRole, ApiError> {
    let raw = require_text(value, "role")?;
    UserRole::parse(raw).ok_or_else(|| ApiError::BadRequest(format!("Unknown role '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_length_counts_characters() {
        assert!(validate_password_len("short").is_err());
        assert!(validate_password_len("long enough").is_ok());
        assert!(validate_password_len("пароль12").is_ok());
    }

    #[test]
    fn required_text_rejects_blank_values() {
        assert_eq!(require_text(Some("  ana "), "username").unwrap(), "ana");
        assert!(matches!(require_text(Some("   "), "email"), Err(ApiError::BadRequest(_))));
        assert!(matches!(require_text(None, "email"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!(require_role(Some("Teacher")).unwrap(), UserRole::Teacher);
        assert!(require_role(Some("admin")).is_err());
        assert!(require_role(None).is_err());
    }
}
