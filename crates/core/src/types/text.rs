//! Non-empty text type for required user fields.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`RequiredText`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TextError {
    /// The input string is empty.
    #[error("value cannot be empty")]
    Empty,
}

/// A string that is guaranteed to be non-empty.
///
/// Names, phone numbers and addresses are stored as-is; the only constraint
/// the service enforces is that a required field is never empty.
///
/// ## Examples
///
/// ```
/// use users_core::RequiredText;
///
/// assert!(RequiredText::parse("Jane").is_ok());
/// assert!(RequiredText::parse("").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct RequiredText(String);

impl RequiredText {
    /// Parse a `RequiredText` from a string.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] if the input is empty.
    pub fn parse(s: &str) -> Result<Self, TextError> {
        if s.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the text as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `RequiredText` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RequiredText {
    type Error = TextError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(s))
    }
}

impl From<RequiredText> for String {
    fn from(text: RequiredText) -> Self {
        text.0
    }
}

impl fmt::Display for RequiredText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequiredText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for RequiredText {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for RequiredText {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::try_from(s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for RequiredText {
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
    fn test_parse_empty() {
        assert_eq!(RequiredText::parse(""), Err(TextError::Empty));
    }

    #[test]
    fn test_parse_keeps_value_verbatim() {
        let text = RequiredText::parse(" 1 Main St ").unwrap();
        assert_eq!(text.as_str(), " 1 Main St ");
    }

    #[test]
    fn test_deserialize_rejects_empty() {
        assert!(serde_json::from_str::<RequiredText>(r#""""#).is_err());

        let text: RequiredText = serde_json::from_str(r#""Doe""#).unwrap();
        assert_eq!(text.to_string(), "Doe");
    }
}
