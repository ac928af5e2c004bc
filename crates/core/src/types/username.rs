//! Username type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Username`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum UsernameError {
    /// The input string is too short.
    #[error("username must be at least {min} characters")]
    TooShort {
        /// Minimum allowed length.
        min: usize,
    },
    /// The input string is too long.
    #[error("username must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[A-Za-z0-9_]`.
    #[error("username may only contain letters, digits and underscores")]
    InvalidCharacter,
}

/// A login username.
///
/// Usernames are case-sensitive: `Alice` and `alice` are distinct accounts.
///
/// ## Constraints
///
/// - Length: 3-30 characters
/// - Characters: ASCII letters, digits, underscore
///
/// ## Examples
///
/// ```
/// use punchlist_core::Username;
///
/// assert!(Username::parse("alice").is_ok());
/// assert!(Username::parse("alice_92").is_ok());
///
/// assert!(Username::parse("al").is_err());          // too short
/// assert!(Username::parse("alice bob").is_err());   // space
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Minimum length of a username.
    pub const MIN_LENGTH: usize = 3;

    /// Maximum length of a username.
    pub const MAX_LENGTH: usize = 30;

    /// Parse a `Username` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is shorter than 3 characters, longer
    /// than 30 characters, or contains a character outside `[A-Za-z0-9_]`.
    pub fn parse(s: &str) -> Result<Self, UsernameError> {
        if s.len() < Self::MIN_LENGTH {
            return Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(UsernameError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Username` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Username {
    type Err = UsernameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert!(Username::parse("bob").is_ok());
        assert!(Username::parse("alice_92").is_ok());
        assert!(Username::parse("X_1").is_ok());
        assert!(Username::parse(&"a".repeat(30)).is_ok());
    }

    #[test]
    fn test_parse_too_short() {
        assert!(matches!(
            Username::parse("al"),
            Err(UsernameError::TooShort { .. })
        ));
        assert!(matches!(
            Username::parse(""),
            Err(UsernameError::TooShort { .. })
        ));
    }

    #[test]
    fn test_parse_too_long() {
        assert!(matches!(
            Username::parse(&"a".repeat(31)),
            Err(UsernameError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_invalid_characters() {
        assert!(matches!(
            Username::parse("alice bob"),
            Err(UsernameError::InvalidCharacter)
        ));
        assert!(matches!(
            Username::parse("alice-bob"),
            Err(UsernameError::InvalidCharacter)
        ));
        assert!(matches!(
            Username::parse("aliç"),
            Err(UsernameError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_case_sensitive_equality() {
        let lower = Username::parse("alice").unwrap();
        let upper = Username::parse("Alice").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn test_display_and_from_str() {
        let name: Username = "alice".parse().unwrap();
        assert_eq!(format!("{name}"), "alice");
        assert_eq!(name.as_str(), "alice");
    }

    #[test]
    fn test_serde_roundtrip() {
        let name = Username::parse("alice").unwrap();
        let json = serde_json::to_string(&name).unwrap();
        assert_eq!(json, "\"alice\"");
        let parsed: Username = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, name);
    }
}
