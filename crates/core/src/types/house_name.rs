//! House name type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`HouseName`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HouseNameError {
    /// The name is empty after trimming.
    #[error("house name cannot be empty")]
    Empty,
    /// The name is too long.
    #[error("house name must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length in characters.
        max: usize,
    },
    /// The name contains a path separator or control character.
    #[error("house name cannot contain '/' or control characters")]
    InvalidCharacter,
}

/// The user-chosen name of a house, e.g. `Rumah A` or `Kos Mahasiswa`.
///
/// House names appear as a path segment in `/house/{name}/...`, so slashes
/// and control characters are rejected. Surrounding whitespace is trimmed.
///
/// ```
/// use stock_home_core::HouseName;
///
/// let name = HouseName::parse("  Rumah A ").unwrap();
/// assert_eq!(name.as_str(), "Rumah A");
///
/// assert!(HouseName::parse("   ").is_err());
/// assert!(HouseName::parse("a/b").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct HouseName(String);

impl HouseName {
    /// Maximum length of a house name in characters.
    pub const MAX_LENGTH: usize = 100;

    /// Parse a `HouseName`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, longer than
    /// [`Self::MAX_LENGTH`] characters, or contains `/` or a control character.
    pub fn parse(s: &str) -> Result<Self, HouseNameError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HouseNameError::Empty);
        }

        if s.chars().count() > Self::MAX_LENGTH {
            return Err(HouseNameError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(|c| c == '/' || c.is_control()) {
            return Err(HouseNameError::InvalidCharacter);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `HouseName` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for HouseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for HouseName {
    type Err = HouseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for HouseName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for HouseName {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for HouseName {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for HouseName {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
