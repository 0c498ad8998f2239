//! Error types for the Foodgram domain

use thiserror::Error;

/// Input rejected by domain validation
///
/// The backend surfaces every variant as a 400 response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("Duplicate {field}: {value}")]
    Duplicate { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Username contains invalid characters")]
    InvalidUsername,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password must be between 8 and 128 characters")]
    WeakPassword,

    #[error("You cannot subscribe to yourself")]
    SelfFollow,
}

impl ValidationError {
    /// Name of the offending field, when the error concerns a single field
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::Empty(field)
            | ValidationError::Duplicate { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::TooLong { field, .. } => Some(field),
            ValidationError::InvalidUsername => Some("username"),
            ValidationError::InvalidEmail => Some("email"),
            ValidationError::WeakPassword => Some("password"),
            ValidationError::SelfFollow => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names() {
        assert_eq!(ValidationError::Empty("tags").field(), Some("tags"));
        assert_eq!(ValidationError::InvalidUsername.field(), Some("username"));
        assert_eq!(ValidationError::SelfFollow.field(), None);
    }

    #[test]
    fn test_out_of_range_message() {
        let err = ValidationError::OutOfRange {
            field: "amount",
            min: 1,
            max: 32000,
        };
        assert_eq!(err.to_string(), "amount must be between 1 and 32000");
    }
}
