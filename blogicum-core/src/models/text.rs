//! Title and body text validation

use super::validation::char_len;
use super::ValidationError;

/// Maximum length for titles and names
pub const MAX_TITLE_LEN: usize = 256;

/// Maximum length for body text (64KB)
const MAX_BODY_LEN: usize = 65536;

/// Validated short text: post title, category title, location name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title(String);

impl Title {
    /// Create a post title.
    ///
    /// # Rules
    /// - Non-empty (after trimming whitespace)
    /// - Max 256 characters
    ///
    /// # Example
    /// ```
    /// use blogicum_core::Title;
    ///
    /// assert!(Title::new("Morning in Yasnaya Polyana").is_ok());
    /// assert!(Title::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        Self::for_field("title", s)
    }

    /// Same rules as [`Title::new`], reporting errors against `field`.
    pub fn for_field(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field });
        }

        if char_len(trimmed) > MAX_TITLE_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_TITLE_LEN,
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated long text: post text, comment text, category description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body(String);

impl Body {
    /// Create body text. Whitespace-only input is rejected; the text itself is
    /// stored as given so formatting survives.
    pub fn new(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field });
        }

        if s.len() > MAX_BODY_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_BODY_LEN,
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

impl AsRef<str> for Body {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
