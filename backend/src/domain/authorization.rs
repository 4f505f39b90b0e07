//! Authenticated principals and the role predicates enforced on them.
//!
//! Login acceptance is the conjunction of two independent predicates: the
//! surface predicate ([`ensure_surface_admits`]) and the account predicates
//! checked by the account service (password match, verified email). Neither
//! implies the other.

use super::auth::LoginSurface;
use super::error::Error;
use super::user::{Role, UserId};

/// Identity and role derived from a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: UserId,
    role: Role,
}

impl Principal {
    /// Build a principal from validated token claims.
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Subject identifier.
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Role carried by the token.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Shorthand for `role() == Role::Admin`.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require the principal's role to be one of `allowed`.
    ///
    /// # Examples
    /// ```
    /// use marketplace::domain::{Principal, Role, UserId};
    ///
    /// let seller = Principal::new(UserId::random(), Role::Seller);
    /// assert!(seller.require_role(&[Role::Seller, Role::Admin]).is_ok());
    /// assert!(seller.require_role(&[Role::Admin]).is_err());
    /// ```
    pub fn require_role(&self, allowed: &[Role]) -> Result<&Self, Error> {
        if allowed.contains(&self.role) {
            Ok(self)
        } else {
            Err(Error::forbidden(format!(
                "role {} may not perform this action",
                self.role
            )))
        }
    }

    /// Require the principal to be an administrator.
    pub fn require_admin(&self) -> Result<&Self, Error> {
        if self.is_admin() {
            Ok(self)
        } else {
            Err(Error::forbidden("Access denied. Admins only."))
        }
    }

    /// Require the principal to be `target` or an administrator.
    pub fn require_self_or_admin(&self, target: &UserId) -> Result<&Self, Error> {
        if self.is_admin() || &self.user_id == target {
            Ok(self)
        } else {
            Err(Error::forbidden("you may only access your own records"))
        }
    }

    /// Resolve an optional target user under the self-or-admin rule.
    ///
    /// Administrators may name anyone; everyone else is pinned to themselves
    /// whatever they asked for.
    pub fn scope_to(&self, requested: Option<UserId>) -> Option<UserId> {
        if self.is_admin() {
            requested
        } else {
            Some(self.user_id.clone())
        }
    }
}

/// Claims signed into bearer and confirmation tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub subject: UserId,
    pub role: Role,
}

impl From<TokenClaims> for Principal {
    fn from(value: TokenClaims) -> Self {
        Self::new(value.subject, value.role)
    }
}

/// Surface predicate of the login policy.
///
/// Administrators may only sign in through the admin surface and the admin
/// surface only admits administrators.
pub fn ensure_surface_admits(surface: LoginSurface, role: Role) -> Result<(), Error> {
    match (surface, role) {
        (LoginSurface::Regular, Role::Admin) => Err(Error::forbidden(
            "Admin accounts must sign in through the admin console",
        )),
        (LoginSurface::Admin, Role::User | Role::Seller) => {
            Err(Error::forbidden("Access denied. Admins only."))
        }
        (LoginSurface::Regular, Role::User | Role::Seller) | (LoginSurface::Admin, Role::Admin) => {
            Ok(())
        }
    }
}
