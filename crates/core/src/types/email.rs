//! Account email address.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why a string was rejected as an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email is empty")]
    Empty,
    #[error("email is longer than {max} characters")]
    TooLong { max: usize },
    #[error("email needs exactly one '@' with text on both sides")]
    Malformed,
    #[error("email cannot contain spaces")]
    Whitespace,
}

/// A normalized account email.
///
/// Stored trimmed and lowercased, so `Rani@Email.com` signs in to the same
/// account as `rani@email.com` and member invitations match either form.
///
/// ```
/// use stock_home_core::Email;
///
/// let email = Email::parse(" Rani@Email.com ").unwrap();
/// assert_eq!(email.as_str(), "rani@email.com");
/// assert_eq!(email.name_hint(), "rani");
/// assert!(Email::parse("rani@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Validate and normalize an address.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] for empty, overlong, space-containing input or
    /// input without exactly one `@` between a non-empty mailbox and domain.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }
        if trimmed.chars().count() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        match trimmed.split_once('@') {
            Some((mailbox, domain))
                if !mailbox.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(trimmed.to_lowercase()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// The mailbox part, used as a display name when a profile has none.
    #[must_use]
    pub fn name_hint(&self) -> &str {
        self.0.split_once('@').map_or(self.0.as_str(), |(mailbox, _)| mailbox)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Email {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

// Rows are written through `parse`, so they are not re-validated on read.
#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Email {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(Self(<String as sqlx::Decode<sqlx::Postgres>>::decode(value)?))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Email {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_household_addresses() {
        for raw in ["rani@email.com", "andi.s+belanja@kos-b.id", "b@c"] {
            assert_eq!(Email::parse(raw).unwrap().as_str(), raw);
        }
    }

    #[test]
    fn test_invitation_matches_regardless_of_case() {
        let typed = Email::parse("  ANDI@Email.com").unwrap();
        let stored = Email::parse("andi@email.com").unwrap();
        assert_eq!(typed, stored);
    }

    #[test]
    fn test_rejections() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        assert_eq!(Email::parse("rani"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("@email.com"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("rani@"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("rani@a@b"), Err(EmailError::Malformed));
        assert_eq!(Email::parse("rani sari@email.com"), Err(EmailError::Whitespace));

        let long = format!("{}@email.com", "r".repeat(Email::MAX_LENGTH));
        assert_eq!(
            Email::parse(&long),
            Err(EmailError::TooLong {
                max: Email::MAX_LENGTH
            })
        );
    }

    #[test]
    fn test_name_hint() {
        assert_eq!(Email::parse("sari.w@email.com").unwrap().name_hint(), "sari.w");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let email = Email::parse("budi@email.com").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"budi@email.com\"");
        assert_eq!(email.to_string(), "budi@email.com");
    }
}
