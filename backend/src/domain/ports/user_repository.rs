//! Port abstraction for user, seller and admin persistence.
use async_trait::async_trait;

use crate::domain::{
    EmailAddress, Error, NewUser, PasswordDigest, ProfileUpdate, RoleState, User, UserAccount,
    UserId,
};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The unique index on `users.email` rejected the write.
        DuplicateEmail { email: String } => "email already registered: {email}",
        /// The addressed user does not exist.
        NotFound { id: String } => "user not found: {id}",
    }
}

impl From<UserPersistenceError> for Error {
    fn from(value: UserPersistenceError) -> Self {
        match value {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateEmail { .. } => {
                Error::conflict("A user with this email already exists")
            }
            UserPersistenceError::NotFound { .. } => Error::not_found("User not found"),
        }
    }
}

/// How a role transition touches the seller profile row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SellerProfileChange {
    /// Create or overwrite every seller field.
    Replace {
        business_desc: String,
        business_type: String,
        verification_doc_url: String,
    },
    /// Create or update only the verification document, leaving business
    /// fields as they are (empty for a fresh row).
    Document { verification_doc_url: String },
    /// Create an empty row if none exists; never overwrite.
    EnsureExists,
}

/// Storage for users and their one-to-one role extensions.
///
/// Adapters must enforce email uniqueness atomically and must apply
/// [`UserRepository::apply_role_state`] as a single unit: the user row and
/// the seller row either both change or neither does.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user with the initial role state.
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by normalised email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user together with its seller/admin extensions.
    async fn find_account(&self, id: &UserId)
    -> Result<Option<UserAccount>, UserPersistenceError>;

    /// Every account, newest first.
    async fn list_accounts(&self) -> Result<Vec<UserAccount>, UserPersistenceError>;

    /// Apply a partial profile update.
    ///
    /// Seller fields are written only when a seller row exists. Changing the
    /// email to one owned by another user fails with `DuplicateEmail`.
    async fn update_profile(
        &self,
        id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<UserAccount, UserPersistenceError>;

    /// Replace the stored password digest.
    async fn set_password_digest(
        &self,
        id: &UserId,
        digest: &PasswordDigest,
    ) -> Result<(), UserPersistenceError>;

    /// Flip `is_email_verified` to true.
    async fn mark_email_verified(&self, id: &UserId) -> Result<(), UserPersistenceError>;

    /// Persist a role transition together with its seller-profile change.
    async fn apply_role_state(
        &self,
        id: &UserId,
        state: RoleState,
        seller: SellerProfileChange,
    ) -> Result<UserAccount, UserPersistenceError>;

    /// Delete the account.
    ///
    /// Role extensions are removed first, owned products are retained with
    /// their owner cleared and `owner_deleted` set, and notifications and
    /// enquiries are left untouched.
    async fn delete_account(&self, id: &UserId) -> Result<(), UserPersistenceError>;
}
