//! Port abstraction for the append-only notification ledger.
use async_trait::async_trait;

use crate::domain::{Error, Notification, NotificationId, NotificationScope};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by notification ledger adapters.
    pub enum NotificationPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "notification ledger connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "notification ledger query failed: {message}",
        /// The addressed entry does not exist.
        NotFound { id: i64 } => "notification not found: {id}",
    }
}

impl From<NotificationPersistenceError> for Error {
    fn from(value: NotificationPersistenceError) -> Self {
        match value {
            NotificationPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("notification ledger unavailable: {message}"))
            }
            NotificationPersistenceError::Query { message } => {
                Error::internal(format!("notification ledger error: {message}"))
            }
            NotificationPersistenceError::NotFound { .. } => {
                Error::not_found("Notification not found")
            }
        }
    }
}

/// Ledger storage. Entries are never deleted; only `is_read` ever changes,
/// and only from false to true.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Entries in scope, newest first.
    async fn list(
        &self,
        scope: &NotificationScope,
    ) -> Result<Vec<Notification>, NotificationPersistenceError>;

    /// Fetch one entry.
    async fn find(
        &self,
        id: NotificationId,
    ) -> Result<Option<Notification>, NotificationPersistenceError>;

    /// Mark one entry read and return it.
    async fn mark_read(
        &self,
        id: NotificationId,
    ) -> Result<Notification, NotificationPersistenceError>;

    /// Mark every unread entry in scope read; returns how many changed.
    async fn mark_all_read(
        &self,
        scope: &NotificationScope,
    ) -> Result<u64, NotificationPersistenceError>;
}
