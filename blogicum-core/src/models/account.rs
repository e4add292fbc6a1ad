//! Account fields: username, password, email, first/last name

use once_cell::sync::Lazy;
use regex::Regex;

use super::validation::char_len;
use super::ValidationError;

/// Maximum length for usernames and person names
const MAX_NAME_LEN: usize = 150;

/// Minimum password length
const MIN_PASSWORD_LEN: usize = 8;

/// Maximum length for email addresses
const MAX_EMAIL_LEN: usize = 254;

/// Letters, digits and @/./+/-/_ only.
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("invalid username regex"));

/// Validated username
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Create a username.
    ///
    /// # Rules
    /// - 1 to 150 characters
    /// - Letters, digits and `@ . + - _`
    ///
    /// # Example
    /// ```
    /// use blogicum_core::Username;
    ///
    /// assert!(Username::new("leo.tolstoy").is_ok());
    /// assert!(Username::new("leo tolstoy").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "username" });
        }

        if char_len(s) > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "username",
                max: MAX_NAME_LEN,
            });
        }

        if !USERNAME_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "username",
                reason: "may contain only letters, digits and @/./+/-/_",
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

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validated plaintext password, held only until it is hashed
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Create a password for the given username.
    ///
    /// # Rules
    /// - At least 8 characters
    /// - Not entirely numeric
    /// - Not the same as the username (case-insensitive)
    pub fn new(s: &str, username: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "password" });
        }

        if char_len(s) < MIN_PASSWORD_LEN {
            return Err(ValidationError::TooShort {
                field: "password",
                min: MIN_PASSWORD_LEN,
            });
        }

        if s.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "password",
                reason: "cannot be entirely numeric",
            });
        }

        if s.to_lowercase() == username.to_lowercase() {
            return Err(ValidationError::InvalidFormat {
                field: "password",
                reason: "is too similar to the username",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Validated email address (empty allowed)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Email(String);

impl Email {
    /// Create an email address. Empty input yields an empty email.
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        if char_len(trimmed) > MAX_EMAIL_LEN {
            return Err(ValidationError::TooLong {
                field: "email",
                max: MAX_EMAIL_LEN,
            });
        }

        let mut parts = trimmed.split('@');
        let valid = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None)
                if !local.is_empty() && !domain.is_empty() && !trimmed.contains(char::is_whitespace)
        );
        if !valid {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must look like name@example.com",
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// First or last name (empty allowed, trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonName(String);

impl PersonName {
    pub fn new(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if char_len(trimmed) > MAX_NAME_LEN {
            return Err(ValidationError::TooLong {
                field,
                max: MAX_NAME_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
