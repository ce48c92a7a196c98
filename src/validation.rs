//! Input validation for user-supplied step ids and email addresses.
//!
//! Both end up as document file names inside the store, so they are
//! validated before any path is built from them.

use anyhow::{bail, Result};

/// Maximum allowed length for step ids.
pub const MAX_STEP_ID_LENGTH: usize = 16;

/// Maximum allowed length for email addresses (RFC 5321 limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Validates that a step id is a plain decimal ordinal.
///
/// A step id is valid if:
/// - It is not empty
/// - It is no longer than MAX_STEP_ID_LENGTH characters
/// - It contains only ASCII digits
/// - It has no leading zeros (other than "0" itself)
///
/// # Examples
///
/// ```
/// use jaunt::validation::validate_step_id;
///
/// assert!(validate_step_id("1").is_ok());
/// assert!(validate_step_id("12").is_ok());
/// assert!(validate_step_id("").is_err());
/// assert!(validate_step_id("../etc/passwd").is_err());
/// ```
pub fn validate_step_id(id: &str) -> Result<()> {
    if id.is_empty() {
        bail!("step id cannot be empty");
    }

    if id.len() > MAX_STEP_ID_LENGTH {
        bail!(
            "step id too long: {} characters (max {})",
            id.len(),
            MAX_STEP_ID_LENGTH
        );
    }

    if !id.chars().all(|c| c.is_ascii_digit()) {
        bail!("step id '{id}' must contain only digits");
    }

    if id.len() > 1 && id.starts_with('0') {
        bail!("step id '{id}' must not have leading zeros");
    }

    Ok(())
}

/// Validates that an email address is plausible and safe as a file name.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        bail!("email cannot be empty");
    }

    if email.len() > MAX_EMAIL_LENGTH {
        bail!(
            "email too long: {} characters (max {})",
            email.len(),
            MAX_EMAIL_LENGTH
        );
    }

    let at = match email.find('@') {
        Some(pos) => pos,
        None => bail!("email '{email}' must contain an @"),
    };
    if at == 0 || at == email.len() - 1 {
        bail!("email '{email}' must have text on both sides of the @");
    }

    if email
        .chars()
        .any(|c| c.is_whitespace() || c == '/' || c == '\\' || c.is_control())
    {
        bail!("email '{email}' contains characters not allowed here");
    }

    Ok(())
}

/// Clap value parser for step id arguments.
pub fn clap_step_id_validator(s: &str) -> Result<String, String> {
    validate_step_id(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}

/// Clap value parser for email arguments.
pub fn clap_email_validator(s: &str) -> Result<String, String> {
    validate_email(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}
