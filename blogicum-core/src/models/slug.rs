//! Category slug validation
//!
//! Slug format: latin letters, digits, hyphens and underscores

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

/// Maximum length for category slugs
const MAX_SLUG_LEN: usize = 50;

static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("invalid slug regex"));

/// Validated category slug, used as the category's URL identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CategorySlug(String);

impl CategorySlug {
    /// Create a new slug, validating its format.
    ///
    /// # Rules
    /// - Max 50 characters
    /// - Latin letters, digits, hyphens, underscores
    ///
    /// # Example
    /// ```
    /// use blogicum_core::CategorySlug;
    ///
    /// assert!(CategorySlug::new("travel_2024").is_ok());
    /// assert!(CategorySlug::new("путешествия").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "slug" });
        }

        if s.len() > MAX_SLUG_LEN {
            return Err(ValidationError::TooLong {
                field: "slug",
                max: MAX_SLUG_LEN,
            });
        }

        if !SLUG_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "slug",
                reason: "allowed characters are latin letters, digits, hyphen and underscore",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for CategorySlug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
