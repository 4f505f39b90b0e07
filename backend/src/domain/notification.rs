//! Notification ledger entries.
//!
//! Entries are append-only. The only mutation ever applied is flipping
//! `is_read` from false to true.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::ProductId;
use super::user::UserId;

/// Positive integer identifier of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(i64);

/// Raised when a notification identifier is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidNotificationId;

impl fmt::Display for InvalidNotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "notification id must be a positive integer")
    }
}

impl std::error::Error for InvalidNotificationId {}

impl NotificationId {
    /// Validate a raw identifier.
    pub fn new(raw: i64) -> Result<Self, InvalidNotificationId> {
        if raw <= 0 {
            return Err(InvalidNotificationId);
        }
        Ok(Self(raw))
    }

    /// Parse an identifier from a path segment.
    pub fn parse(raw: &str) -> Result<Self, InvalidNotificationId> {
        raw.trim()
            .parse::<i64>()
            .map_err(|_| InvalidNotificationId)
            .and_then(Self::new)
    }

    /// Raw integer value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of lifecycle events recorded in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
    ProductApproved,
    ProductRejected,
}

impl NotificationType {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProductCreated => "PRODUCT_CREATED",
            Self::ProductUpdated => "PRODUCT_UPDATED",
            Self::ProductDeleted => "PRODUCT_DELETED",
            Self::ProductApproved => "PRODUCT_APPROVED",
            Self::ProductRejected => "PRODUCT_REJECTED",
        }
    }
}

/// Raised when a stored type string is outside the enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownNotificationType(pub String);

impl fmt::Display for UnknownNotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown notification type: {}", self.0)
    }
}

impl std::error::Error for UnknownNotificationType {}

impl FromStr for NotificationType {
    type Err = UnknownNotificationType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PRODUCT_CREATED" => Ok(Self::ProductCreated),
            "PRODUCT_UPDATED" => Ok(Self::ProductUpdated),
            "PRODUCT_DELETED" => Ok(Self::ProductDeleted),
            "PRODUCT_APPROVED" => Ok(Self::ProductApproved),
            "PRODUCT_REJECTED" => Ok(Self::ProductRejected),
            other => Err(UnknownNotificationType(other.to_owned())),
        }
    }
}

/// Entry to append; id, read flag and timestamp are assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub user_id: UserId,
    pub product_id: Option<ProductId>,
    pub kind: NotificationType,
}

/// A stored ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub product_id: Option<ProductId>,
    pub kind: NotificationType,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Which addressees a ledger query covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationScope {
    /// Every entry in the system.
    Everyone,
    /// Entries addressed to one user.
    User(UserId),
}
