//! Credential Validation
//!
//! Pure well-formedness rules for usernames and passwords, plus a 0-5
//! strength score the login form renders as a meter. Everything here is a
//! function of its inputs only; the network is never involved.
//!
//! The demo account (`emilys` / `emilyspass`) is a documented escape hatch:
//! the remote service ships it for testing and its password contains neither
//! an uppercase letter nor a digit, so the complexity checks skip it and the
//! strength score pins it to the maximum.

use crate::error::FieldError;

/// Username of the well-known demo account on the remote service
pub const DEMO_USERNAME: &str = "emilys";

/// Password of the well-known demo account
pub const DEMO_PASSWORD: &str = "emilyspass";

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 20;
const PASSWORD_MIN: usize = 6;
const PASSWORD_MAX: usize = 50;

/// Highest possible strength score
pub const MAX_STRENGTH: u8 = 5;

/// Whether the given pair is exactly the demo account
pub fn is_demo_pair(username: &str, password: &str) -> bool {
    username == DEMO_USERNAME && password == DEMO_PASSWORD
}

/// Validate a username: non-empty, 3-20 characters, `[A-Za-z0-9._-]` only.
pub fn validate_username(username: &str) -> Result<(), FieldError> {
    if username.is_empty() {
        return Err(FieldError::Required);
    }
    if username.chars().count() < USERNAME_MIN {
        return Err(FieldError::TooShort { min: USERNAME_MIN });
    }
    if username.chars().count() > USERNAME_MAX {
        return Err(FieldError::TooLong { max: USERNAME_MAX });
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(FieldError::InvalidPattern);
    }
    Ok(())
}

/// Validate a password: non-empty, 6-50 characters, at least one uppercase
/// letter and one digit. The demo pair bypasses the complexity checks.
pub fn validate_password(username: &str, password: &str) -> Result<(), FieldError> {
    if password.is_empty() {
        return Err(FieldError::Required);
    }
    if password.chars().count() < PASSWORD_MIN {
        return Err(FieldError::TooShort { min: PASSWORD_MIN });
    }
    if password.chars().count() > PASSWORD_MAX {
        return Err(FieldError::TooLong { max: PASSWORD_MAX });
    }
    if is_demo_pair(username, password) {
        return Ok(());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(FieldError::MissingUpperCase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(FieldError::MissingDigit);
    }
    Ok(())
}

/// Score password strength on a 0-5 scale.
///
/// One point each for: length >= 6, length >= 10, an uppercase letter, a
/// digit, a non-alphanumeric character. The demo pair always scores 5.
pub fn score_strength(username: &str, password: &str) -> u8 {
    if is_demo_pair(username, password) {
        return MAX_STRENGTH;
    }
    if password.is_empty() {
        return 0;
    }

    let mut score = 0u8;
    let len = password.chars().count();
    if len >= 6 {
        score += 1;
    }
    if len >= 10 {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| !c.is_alphanumeric()) {
        score += 1;
    }
    score.min(MAX_STRENGTH)
}

/// Coarse strength bucket shown next to the meter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrengthLabel {
    Weak,
    Medium,
    Strong,
}

/// Map a strength score to its display bucket: weak below 2, medium below 4,
/// strong otherwise.
pub fn strength_label(score: u8) -> StrengthLabel {
    match score {
        0 | 1 => StrengthLabel::Weak,
        2 | 3 => StrengthLabel::Medium,
        _ => StrengthLabel::Strong,
    }
}
