//! User, seller and admin data model.
//!
//! A [`User`] is the identity record; [`SellerProfile`] and [`AdminProfile`]
//! are one-to-one extensions owned by it. Role and document-verification
//! state only change through [`crate::domain::RoleState`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validation errors for user identity and profile fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyEmail,
    InvalidEmail,
    EmptyName,
    EmptyAddress,
    UnknownRole { value: String },
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::EmptyAddress => write!(f, "address must not be empty"),
            Self::UnknownRole { value } => write!(f, "unknown role: {value}"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid, String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap a UUID read from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid, uuid.to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        let parsed = Uuid::parse_str(id.trim()).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self::from_uuid(parsed))
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.1.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.1
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Normalised (trimmed, lower-cased) email address.
///
/// # Examples
/// ```
/// use marketplace::domain::EmailAddress;
///
/// let email = EmailAddress::new("  Ada@Example.COM ").expect("valid email");
/// assert_eq!(email.as_ref(), "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    pub fn new(value: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = value.as_ref().trim().to_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        let Some((local, domain)) = normalised.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        let domain_ok = domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && !domain.contains('@');
        if local.is_empty() || !domain_ok || normalised.chars().any(char::is_whitespace) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Actor role carried by every principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Seller,
    Admin,
}

impl Role {
    /// Storage and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Seller => "SELLER",
            Self::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "USER" => Ok(Self::User),
            "SELLER" => Ok(Self::Seller),
            "ADMIN" => Ok(Self::Admin),
            other => Err(UserValidationError::UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}

/// Opaque password digest produced by a [`crate::domain::ports::PasswordHasher`].
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    /// Wrap a digest produced by the hasher or read from storage.
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }
}

impl AsRef<str> for PasswordDigest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

/// Identity record for every account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: EmailAddress,
    pub password_digest: PasswordDigest,
    pub role: Role,
    pub is_email_verified: bool,
    pub is_document_verified: bool,
    pub address: String,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
    pub profile_pic_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Business details of a seller; one-to-one with its [`User`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerProfile {
    pub user_id: UserId,
    pub business_desc: String,
    pub business_type: String,
    pub verification_doc_url: Option<String>,
}

impl SellerProfile {
    /// True once both business fields have been filled in.
    pub fn has_business_details(&self) -> bool {
        !self.business_desc.trim().is_empty() && !self.business_type.trim().is_empty()
    }
}

/// Administrative extension; exists only for [`Role::Admin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminProfile {
    pub user_id: UserId,
    pub permissions: Vec<String>,
}

/// A user together with its role-specific extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct UserAccount {
    pub user: User,
    pub seller: Option<SellerProfile>,
    pub admin: Option<AdminProfile>,
}

impl UserAccount {
    /// Account without any role-specific extension.
    pub fn plain(user: User) -> Self {
        Self {
            user,
            seller: None,
            admin: None,
        }
    }
}

/// Insert payload for a freshly signed-up user.
///
/// New accounts always start as [`Role::User`] with both verification flags
/// cleared; repositories derive those columns rather than accepting them.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: EmailAddress,
    pub password_digest: PasswordDigest,
    pub address: String,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
}

/// Partial profile update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub email: Option<EmailAddress>,
    pub address: Option<String>,
    pub country_code: Option<String>,
    pub phone_number: Option<String>,
    pub profile_pic_url: Option<String>,
    pub seller: Option<SellerFieldsUpdate>,
}

/// Seller-only profile fields accepted by a profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SellerFieldsUpdate {
    pub business_desc: Option<String>,
    pub business_type: Option<String>,
}

impl SellerFieldsUpdate {
    /// True when no seller field would change.
    pub fn is_empty(&self) -> bool {
        self.business_desc.is_none() && self.business_type.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("   ", UserValidationError::EmptyEmail)]
    #[case("no-at-sign", UserValidationError::InvalidEmail)]
    #[case("@example.com", UserValidationError::InvalidEmail)]
    #[case("ada@localhost", UserValidationError::InvalidEmail)]
    #[case("ada@.com", UserValidationError::InvalidEmail)]
    #[case("a da@example.com", UserValidationError::InvalidEmail)]
    fn email_rejects_malformed_values(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(EmailAddress::new(raw), Err(expected));
    }

    #[rstest]
    fn email_is_normalised() {
        let email = EmailAddress::new(" Seller@Example.org ").expect("valid email");
        assert_eq!(email.as_ref(), "seller@example.org");
    }

    #[rstest]
    #[case("USER", Role::User)]
    #[case("SELLER", Role::Seller)]
    #[case("ADMIN", Role::Admin)]
    fn role_round_trips_through_storage_form(#[case] raw: &str, #[case] role: Role) {
        assert_eq!(raw.parse::<Role>(), Ok(role));
        assert_eq!(role.as_str(), raw);
    }

    #[rstest]
    fn role_rejects_lower_case() {
        assert!(matches!(
            "admin".parse::<Role>(),
            Err(UserValidationError::UnknownRole { .. })
        ));
    }

    #[rstest]
    fn role_serialises_upper_case() {
        let json = serde_json::to_string(&Role::Seller).expect("serialise role");
        assert_eq!(json, "\"SELLER\"");
    }

    #[rstest]
    #[case("", UserValidationError::EmptyId)]
    #[case("not-a-uuid", UserValidationError::InvalidId)]
    fn user_id_rejects_invalid_values(#[case] raw: &str, #[case] expected: UserValidationError) {
        assert_eq!(UserId::new(raw), Err(expected));
    }

    #[rstest]
    fn password_digest_debug_is_redacted() {
        let digest = PasswordDigest::new("$2b$10$secret");
        assert_eq!(format!("{digest:?}"), "PasswordDigest(..)");
    }
}
