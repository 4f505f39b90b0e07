//! Port for issuing and validating signed bearer tokens.
//!
//! Validation failures deliberately collapse into a single
//! [`TokenError::Invalid`]: callers learn that a token is unusable, never
//! which check rejected it.

use crate::domain::{Error, Role, TokenClaims, UserId};

use super::define_port_error;

define_port_error! {
    /// Failures raised by token adapters.
    pub enum TokenError {
        /// Malformed, forged or expired token.
        Invalid => "token is invalid or expired",
        /// The token could not be signed.
        Signing { message: String } => "token signing failed: {message}",
    }
}

impl From<TokenError> for Error {
    fn from(value: TokenError) -> Self {
        match value {
            TokenError::Invalid => Error::unauthorized("Invalid or expired token"),
            err @ TokenError::Signing { .. } => Error::internal(err.to_string()),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign `claims` into an opaque token valid for the configured lifetime.
    fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError>;

    /// Verify a token and recover its claims.
    fn validate(&self, token: &str) -> Result<TokenClaims, TokenError>;
}

/// Unsigned `ROLE.uuid` tokens for tests. Never use outside tests.
///
/// # Examples
/// ```
/// use marketplace::domain::ports::{FixtureTokenService, TokenService};
/// use marketplace::domain::{Role, TokenClaims, UserId};
///
/// let claims = TokenClaims { subject: UserId::random(), role: Role::Seller };
/// let token = FixtureTokenService.issue(&claims).unwrap();
/// assert_eq!(FixtureTokenService.validate(&token).unwrap(), claims);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTokenService;

impl TokenService for FixtureTokenService {
    fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        Ok(format!("{}.{}", claims.role, claims.subject))
    }

    fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let (role, subject) = token.split_once('.').ok_or(TokenError::Invalid)?;
        let role = role.parse::<Role>().map_err(|_| TokenError::Invalid)?;
        let subject = UserId::new(subject).map_err(|_| TokenError::Invalid)?;
        Ok(TokenClaims { subject, role })
    }
}
