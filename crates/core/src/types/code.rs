//! Validated product and batch codes.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Sku`] or [`BatchCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    /// The input is empty after trimming.
    #[error("{kind} cannot be empty")]
    Empty {
        /// Which code failed.
        kind: &'static str,
    },
    /// The input is shorter than allowed.
    #[error("{kind} must be at least {min} characters")]
    TooShort {
        /// Which code failed.
        kind: &'static str,
        /// Minimum allowed length.
        min: usize,
    },
    /// The input is longer than allowed.
    #[error("{kind} must be at most {max} characters")]
    TooLong {
        /// Which code failed.
        kind: &'static str,
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `A-Z`, `0-9` and `-`.
    #[error("{kind} may only contain letters, digits and hyphens")]
    InvalidCharacter {
        /// Which code failed.
        kind: &'static str,
    },
}

/// Trim, upper-case and check a code against length and charset limits.
fn normalize(kind: &'static str, s: &str, min: usize, max: usize) -> Result<String, CodeError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(CodeError::Empty { kind });
    }
    if !s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(CodeError::InvalidCharacter { kind });
    }
    if s.len() < min {
        return Err(CodeError::TooShort { kind, min });
    }
    if s.len() > max {
        return Err(CodeError::TooLong { kind, max });
    }
    Ok(s.to_ascii_uppercase())
}

macro_rules! define_code {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $min:literal, $max:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Minimum length after trimming.
            pub const MIN_LENGTH: usize = $min;
            /// Maximum length after trimming.
            pub const MAX_LENGTH: usize = $max;

            #[doc = concat!("Parse a `", stringify!($name), "`, trimming and upper-casing the input.")]
            ///
            /// # Errors
            ///
            /// Returns an error if the trimmed input is empty, outside the
            /// length limits, or contains characters other than ASCII
            /// letters, digits and `-`.
            pub fn parse(s: &str) -> Result<Self, CodeError> {
                normalize($kind, s, Self::MIN_LENGTH, Self::MAX_LENGTH).map(Self)
            }

            /// Returns the code as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes the code and returns its inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = CodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = CodeError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(&s)
            }
        }

        impl From<$name> for String {
            fn from(code: $name) -> Self {
                code.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                // Database values are assumed valid
                Ok(Self(s))
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
            }
        }
    };
}

define_code!(
    /// A product stock-keeping unit such as `CL-NEURO-001`.
    ///
    /// ## Constraints
    ///
    /// - Length: 1-32 characters after trimming
    /// - ASCII letters, digits and `-` only
    /// - Stored upper-case
    ///
    /// ```
    /// use crowe_logic_core::Sku;
    ///
    /// assert_eq!(Sku::parse(" cl-neuro-001 ").unwrap().as_str(), "CL-NEURO-001");
    /// assert!(Sku::parse("CL NEURO").is_err());
    /// ```
    Sku,
    "sku",
    1,
    32
);

define_code!(
    /// A production batch code such as `CLF001-2304`.
    ///
    /// Shoppers type these from a printed label, so parsing is forgiving
    /// about case and surrounding whitespace.
    ///
    /// ## Constraints
    ///
    /// - Length: 6-20 characters after trimming
    /// - `A-Z`, `0-9` and `-` only (lower-case input is upper-cased)
    ///
    /// ```
    /// use crowe_logic_core::BatchCode;
    ///
    /// assert_eq!(BatchCode::parse("clf001-2304").unwrap().as_str(), "CLF001-2304");
    /// assert!(BatchCode::parse("ABC").is_err());
    /// ```
    BatchCode,
    "batch code",
    6,
    20
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_code_normalizes_input() {
        let code = BatchCode::parse("  clf002-2305\n").unwrap();
        assert_eq!(code.as_str(), "CLF002-2305");
    }

    #[test]
    fn test_batch_code_length_limits() {
        assert!(matches!(
            BatchCode::parse("AB12"),
            Err(CodeError::TooShort { min: 6, .. })
        ));
        assert!(matches!(
            BatchCode::parse(&"A".repeat(21)),
            Err(CodeError::TooLong { max: 20, .. })
        ));
        assert!(BatchCode::parse("ABC123").is_ok());
        assert!(BatchCode::parse(&"9".repeat(20)).is_ok());
    }

    #[test]
    fn test_batch_code_rejects_symbols() {
        assert!(matches!(
            BatchCode::parse("CLF001_2304"),
            Err(CodeError::InvalidCharacter { kind: "batch code" })
        ));
        assert!(matches!(
            BatchCode::parse("CLF 001"),
            Err(CodeError::InvalidCharacter { .. })
        ));
    }

    #[test]
    fn test_empty_after_trim() {
        assert!(matches!(Sku::parse("   "), Err(CodeError::Empty { kind: "sku" })));
    }

    #[test]
    fn test_sku_error_message() {
        let err = Sku::parse(&"X".repeat(33)).unwrap_err();
        assert_eq!(err.to_string(), "sku must be at most 32 characters");
    }

    #[test]
    fn test_deserialize_validates() {
        let sku: Sku = serde_json::from_str("\"cl-immune-002\"").unwrap();
        assert_eq!(sku.as_str(), "CL-IMMUNE-002");
        assert!(serde_json::from_str::<Sku>("\"bad sku\"").is_err());

        let json = serde_json::to_string(&sku).unwrap();
        assert_eq!(json, "\"CL-IMMUNE-002\"");
    }
}
