//! User identity model.
//!
//! [`User`] is the public view of an account and is safe to serialise.
//! [`StoredUser`] adds the credential hash and never leaves the accounts
//! boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Maximum allowed length for a username, in characters.
pub const USERNAME_MAX: usize = 150;

/// Validation errors returned by [`Username::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyUsername,
    UsernameTooLong { max: usize },
    UsernameInvalidCharacters,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::UsernameInvalidCharacters => write!(
                f,
                "username must not contain whitespace or control characters",
            ),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier assigned by the store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wrap a raw store identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier as stored.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique login name.
///
/// ## Invariants
/// - Trimmed of surrounding whitespace and non-empty.
/// - At most [`USERNAME_MAX`] characters.
/// - Contains no interior whitespace or control characters.
///
/// # Examples
/// ```
/// use eventhub::domain::Username;
///
/// let name = Username::new("  ada ").expect("valid username");
/// assert_eq!(name.as_ref(), "ada");
/// assert!(Username::new("ada lovelace").is_err());
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "ada")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(raw: impl Into<String>) -> Result<Self, UserValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        if trimmed
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Public account view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[schema(value_type = i64, example = 1)]
    id: UserId,
    username: Username,
    is_admin: bool,
}

impl User {
    /// Build a user from validated parts.
    #[must_use]
    pub fn new(id: UserId, username: Username, is_admin: bool) -> Self {
        Self {
            id,
            username,
            is_admin,
        }
    }

    /// Stable identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Login name.
    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Whether the user may view rosters.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_admin
    }
}

/// Opaque credential hash produced by a credential hasher.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Wrap an encoded hash.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded hash string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CredentialHash(<redacted>)")
    }
}

/// Account record including the credential hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub user: User,
    pub credential_hash: CredentialHash,
}

/// Insert payload for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub credential_hash: CredentialHash,
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    //! Validation coverage for usernames and user serialisation.
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case("", UserValidationError::EmptyUsername)]
    #[case("   ", UserValidationError::EmptyUsername)]
    #[case("ada lovelace", UserValidationError::UsernameInvalidCharacters)]
    #[case("tab\tname", UserValidationError::UsernameInvalidCharacters)]
    fn rejects_invalid_usernames(#[case] raw: &str, #[case] expected: UserValidationError) {
        let err = Username::new(raw).expect_err("invalid username");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn rejects_overlong_usernames() {
        let raw = "a".repeat(USERNAME_MAX + 1);
        let err = Username::new(raw).expect_err("too long");
        assert_eq!(
            err,
            UserValidationError::UsernameTooLong { max: USERNAME_MAX }
        );
    }

    #[rstest]
    #[case("admin")]
    #[case("  grace_hopper  ")]
    #[case("ünïcödé")]
    fn accepts_valid_usernames(#[case] raw: &str) {
        let name = Username::new(raw).expect("valid username");
        assert_eq!(name.as_ref(), raw.trim());
    }

    #[rstest]
    fn user_serialises_camel_case() {
        let user = User::new(
            UserId::new(7),
            Username::new("ada").expect("valid username"),
            true,
        );
        let value = serde_json::to_value(&user).expect("serialise user");
        assert_eq!(value.get("id").and_then(Value::as_i64), Some(7));
        assert_eq!(value.get("isAdmin").and_then(Value::as_bool), Some(true));
        assert!(value.get("credentialHash").is_none());
    }

    #[rstest]
    fn credential_hash_debug_is_redacted() {
        let hash = CredentialHash::new("$2b$04$secret");
        assert!(!format!("{hash:?}").contains("secret"));
    }
}
