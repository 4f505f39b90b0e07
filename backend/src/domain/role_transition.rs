//! Legal role transitions.
//!
//! `role` and `is_document_verified` only ever change together through
//! [`RoleState`]. Nothing else in the crate writes either column, so a user
//! can never become a seller without the verification flag being set.

use std::fmt;

use super::user::{Role, SellerProfile, User};

/// Position of a user on the way to becoming a seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellerStatus {
    /// Ordinary buyer with no seller profile.
    PlainUser,
    /// A seller profile or document exists but has not been approved.
    PendingVerification,
    /// Verified seller.
    Seller,
    /// Administrators sit outside the seller lifecycle.
    Administrator,
}

/// Reasons a requested transition is not legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTransitionError {
    /// Administrators cannot be converted into sellers.
    AdministratorCannotSell,
}

impl fmt::Display for RoleTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdministratorCannotSell => {
                write!(f, "administrator accounts cannot become sellers")
            }
        }
    }
}

impl std::error::Error for RoleTransitionError {}

/// The pair of columns guarded by the transition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleState {
    role: Role,
    is_document_verified: bool,
}

impl RoleState {
    /// Read the current state off a user record.
    pub fn of(user: &User) -> Self {
        Self {
            role: user.role,
            is_document_verified: user.is_document_verified,
        }
    }

    /// Role after the transition.
    pub fn role(self) -> Role {
        self.role
    }

    /// Document-verification flag after the transition.
    pub fn is_document_verified(self) -> bool {
        self.is_document_verified
    }

    /// Promote to a verified seller.
    ///
    /// Idempotent: promoting an existing seller yields the same state.
    ///
    /// # Examples
    /// ```
    /// use marketplace::domain::{Role, RoleState};
    ///
    /// let promoted = RoleState::initial().promote_to_seller().expect("users may sell");
    /// assert_eq!(promoted.role(), Role::Seller);
    /// assert!(promoted.is_document_verified());
    /// assert_eq!(promoted.promote_to_seller(), Ok(promoted));
    /// ```
    pub fn promote_to_seller(self) -> Result<Self, RoleTransitionError> {
        match self.role {
            Role::Admin => Err(RoleTransitionError::AdministratorCannotSell),
            Role::User | Role::Seller => Ok(Self {
                role: Role::Seller,
                is_document_verified: true,
            }),
        }
    }

    /// Record that a verification document awaits review.
    ///
    /// A plain user stays a user with the flag cleared; an already verified
    /// seller keeps its status so replacing a document never demotes it.
    pub fn submit_document(self) -> Result<Self, RoleTransitionError> {
        match self.role {
            Role::Admin => Err(RoleTransitionError::AdministratorCannotSell),
            Role::Seller => Ok(self),
            Role::User => Ok(Self {
                role: Role::User,
                is_document_verified: false,
            }),
        }
    }

    /// State every account starts in.
    pub fn initial() -> Self {
        Self {
            role: Role::User,
            is_document_verified: false,
        }
    }
}

/// Classify a user (and optional seller profile) in the seller lifecycle.
pub fn seller_status(user: &User, seller: Option<&SellerProfile>) -> SellerStatus {
    match (user.role, user.is_document_verified, seller) {
        (Role::Admin, _, _) => SellerStatus::Administrator,
        (Role::Seller, true, _) => SellerStatus::Seller,
        (Role::Seller, false, _) | (Role::User, _, Some(_)) => SellerStatus::PendingVerification,
        (Role::User, _, None) => SellerStatus::PlainUser,
    }
}
