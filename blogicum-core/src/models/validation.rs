//! Validation error types

use thiserror::Error;

/// Validation error for domain models
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Field exceeds maximum length
    #[error("{field} exceeds maximum length of {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Field is shorter than its minimum length
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    /// String doesn't match required format (e.g., slug)
    #[error("{field}: {reason}")]
    InvalidFormat { field: &'static str, reason: &'static str },

    /// A referenced row (category, location) does not exist
    #[error("{field} refers to an unknown record")]
    UnknownReference { field: &'static str },
}

/// Count characters, not bytes: limits are user-facing.
pub(crate) fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ValidationError::TooLong {
            field: "title",
            max: 256,
        };
        assert_eq!(
            err.to_string(),
            "title exceeds maximum length of 256 characters"
        );
    }

    #[test]
    fn unknown_reference_display() {
        let err = ValidationError::UnknownReference { field: "category_id" };
        assert_eq!(err.to_string(), "category_id refers to an unknown record");
    }

    #[test]
    fn char_len_counts_scalars() {
        assert_eq!(char_len("пост"), 4);
        assert_eq!("пост".len(), 8);
    }
}
