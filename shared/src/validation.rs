//! Input validation functions
//!
//! Field-level checks shared by the registration, recipe and follow flows.
//! Simple length/range rules live on the request types as `validator`
//! derives; the rules here need more than an attribute can express.

use crate::errors::ValidationError;
use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

/// Smallest ingredient amount accepted in a recipe
pub const MIN_AMOUNT: i32 = 1;
/// Largest ingredient amount accepted in a recipe
pub const MAX_AMOUNT: i32 = 32_000;
/// Smallest cooking time in minutes
pub const MIN_COOKING_TIME: i32 = 1;
/// Largest cooking time in minutes
pub const MAX_COOKING_TIME: i32 = 32_000;

pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::Empty("email"));
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email",
            max: MAX_EMAIL_LENGTH,
        });
    }
    let matches = regex_lite::Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map(|re| re.is_match(email))
        .unwrap_or(false);
    if !matches {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 || password.len() > 128 {
        return Err(ValidationError::WeakPassword);
    }
    Ok(())
}

/// Validate a username: word characters plus `.`, `@`, `+` and `-`
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::Empty("username"));
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "username",
            max: MAX_USERNAME_LENGTH,
        });
    }
    let allowed = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | '+' | '-'));
    if !allowed {
        return Err(ValidationError::InvalidUsername);
    }
    Ok(())
}

/// Validate an ingredient amount
pub fn validate_amount(amount: i32) -> Result<(), ValidationError> {
    validate_range("amount", amount, MIN_AMOUNT, MAX_AMOUNT)
}

/// Validate a cooking time in minutes
pub fn validate_cooking_time(minutes: i32) -> Result<(), ValidationError> {
    validate_range("cooking_time", minutes, MIN_COOKING_TIME, MAX_COOKING_TIME)
}

fn validate_range(field: &'static str, value: i32, min: i32, max: i32) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            min: min.into(),
            max: max.into(),
        });
    }
    Ok(())
}

/// Reject blank text fields
pub fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty(field));
    }
    Ok(())
}

/// Reject an empty list, then reject the first key that appears twice
///
/// Recipes compare ingredients and tags by id.
pub fn require_unique<K, I>(field: &'static str, keys: I) -> Result<(), ValidationError>
where
    K: Eq + Hash + Display,
    I: IntoIterator<Item = K>,
{
    let mut seen = HashSet::new();
    let mut any = false;
    for key in keys {
        any = true;
        if seen.contains(&key) {
            return Err(ValidationError::Duplicate {
                field,
                value: key.to_string(),
            });
        }
        seen.insert(key);
    }
    if !any {
        return Err(ValidationError::Empty(field));
    }
    Ok(())
}
