//! Post image reference

use super::validation::char_len;
use super::ValidationError;

const MAX_IMAGE_LEN: usize = 100;

/// Reference to an already-stored image (relative path or URL)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef(String);

impl ImageRef {
    /// Parse an optional image reference. Blank input means "no image".
    pub fn parse(s: Option<&str>) -> Result<Option<Self>, ValidationError> {
        let Some(raw) = s.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(None);
        };

        if char_len(raw) > MAX_IMAGE_LEN {
            return Err(ValidationError::TooLong {
                field: "image",
                max: MAX_IMAGE_LEN,
            });
        }

        if raw.contains(char::is_whitespace) {
            return Err(ValidationError::InvalidFormat {
                field: "image",
                reason: "cannot contain whitespace",
            });
        }

        Ok(Some(Self(raw.to_owned())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_none() {
        assert_eq!(ImageRef::parse(None).unwrap(), None);
        assert_eq!(ImageRef::parse(Some("  ")).unwrap(), None);
    }

    #[test]
    fn accepts_paths() {
        let image = ImageRef::parse(Some("posts_images/lake.jpg")).unwrap().unwrap();
        assert_eq!(image.as_str(), "posts_images/lake.jpg");
    }

    #[test]
    fn rejects_bad_refs() {
        assert!(ImageRef::parse(Some("my lake.jpg")).is_err());
        assert!(ImageRef::parse(Some(&"a".repeat(101))).is_err());
    }
}
