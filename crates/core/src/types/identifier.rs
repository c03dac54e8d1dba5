//! Normalized identifiers for parts and appliance models.
//!
//! Use the `define_identifier!` macro to create type-safe identifier wrappers
//! that prevent accidentally passing a model number where a part number is
//! expected.

use thiserror::Error;

/// Errors that can occur when parsing an identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The input string is empty (after trimming).
    #[error("identifier cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("identifier must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character other than ASCII letters, digits or `-`.
    #[error("identifier contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Macro to define a normalized identifier wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - Parsing that trims whitespace and upper-cases the value
/// - `Serialize`/`Deserialize` as a plain string, validated on the way in
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `Display`, `FromStr`
///
/// # Example
///
/// ```rust
/// # use parts_assist_core::define_identifier;
/// define_identifier!(SkuNumber);
///
/// let sku = SkuNumber::parse(" ab-12 ").expect("valid");
/// assert_eq!(sku.as_str(), "AB-12");
/// ```
#[macro_export]
macro_rules! define_identifier {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Maximum length of an identifier.
            pub const MAX_LENGTH: usize = 32;

            /// Parse and normalize an identifier.
            ///
            /// # Errors
            ///
            /// Returns an error if the trimmed input is empty, longer than
            /// [`Self::MAX_LENGTH`], or contains characters other than ASCII
            /// letters, digits and `-`.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::IdentifierError> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err($crate::IdentifierError::Empty);
                }
                if trimmed.len() > Self::MAX_LENGTH {
                    return Err($crate::IdentifierError::TooLong {
                        max: Self::MAX_LENGTH,
                    });
                }
                if let Some(c) = trimmed
                    .chars()
                    .find(|c| !(c.is_ascii_alphanumeric() || *c == '-'))
                {
                    return Err($crate::IdentifierError::InvalidCharacter(c));
                }
                Ok(Self(trimmed.to_ascii_uppercase()))
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the identifier and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdentifierError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::IdentifierError;

            fn try_from(s: String) -> ::core::result::Result<Self, Self::Error> {
                Self::parse(&s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_identifier!(PartNumber);
define_identifier!(ModelNumber);

impl PartNumber {
    /// Whether this looks like a retailer catalog number (`PS` followed by digits).
    #[must_use]
    pub fn is_catalog_number(&self) -> bool {
        self.0
            .strip_prefix("PS")
            .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
    }
}

impl ModelNumber {
    /// The model number with any trailing revision digits removed.
    ///
    /// Manufacturers append a digit for minor production revisions, so
    /// `WDT780SAEM1` and `WDT780SAEM2` share the base `WDT780SAEM`.
    #[must_use]
    pub fn base(&self) -> &str {
        self.0.trim_end_matches(|c: char| c.is_ascii_digit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case_and_whitespace() {
        let part = PartNumber::parse("  ps11752778 ").expect("valid");
        assert_eq!(part.as_str(), "PS11752778");
        assert_eq!(part.to_string(), "PS11752778");
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(PartNumber::parse("   "), Err(IdentifierError::Empty));
    }

    #[test]
    fn test_parse_rejects_invalid_characters() {
        assert_eq!(
            ModelNumber::parse("WDT780/SAEM1"),
            Err(IdentifierError::InvalidCharacter('/'))
        );
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let long = "A".repeat(ModelNumber::MAX_LENGTH + 1);
        assert!(matches!(
            ModelNumber::parse(&long),
            Err(IdentifierError::TooLong { .. })
        ));
    }

    #[test]
    fn test_is_catalog_number() {
        assert!(PartNumber::parse("PS11752778").expect("valid").is_catalog_number());
        assert!(!PartNumber::parse("W10190965").expect("valid").is_catalog_number());
        assert!(!PartNumber::parse("PS").expect("valid").is_catalog_number());
    }

    #[test]
    fn test_model_base_strips_revision_digits() {
        let model = ModelNumber::parse("wdt780saem1").expect("valid");
        assert_eq!(model.base(), "WDT780SAEM");
    }

    #[test]
    fn test_deserialize_validates() {
        let part: PartNumber = serde_json::from_str("\"ps123456\"").expect("deserialize");
        assert_eq!(part.as_str(), "PS123456");

        let result: Result<PartNumber, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
