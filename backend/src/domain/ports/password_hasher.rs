//! Port for password digesting.
//!
//! Hashing is CPU-bound; adapters are expected to move the work off the
//! async executor.
use async_trait::async_trait;

use crate::domain::{Error, PasswordDigest};

use super::define_port_error;

define_port_error! {
    /// Failures raised by password hashing adapters.
    pub enum PasswordHashError {
        /// The digest could not be computed.
        Hash { message: String } => "password hashing failed: {message}",
        /// A stored digest could not be parsed.
        MalformedDigest { message: String } => "stored password digest is malformed: {message}",
    }
}

impl From<PasswordHashError> for Error {
    fn from(value: PasswordHashError) -> Self {
        Error::internal(value.to_string())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Digest a plain-text password.
    async fn hash(&self, plain: &str) -> Result<PasswordDigest, PasswordHashError>;

    /// Check a plain-text password against a stored digest.
    async fn verify(&self, plain: &str, digest: &PasswordDigest)
    -> Result<bool, PasswordHashError>;
}

const FIXTURE_PREFIX: &str = "fixture$";

/// Reversible, instant hasher for tests and local fixtures. Never use it for
/// real accounts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePasswordHasher;

#[async_trait]
impl PasswordHasher for FixturePasswordHasher {
    async fn hash(&self, plain: &str) -> Result<PasswordDigest, PasswordHashError> {
        Ok(PasswordDigest::new(format!("{FIXTURE_PREFIX}{plain}")))
    }

    async fn verify(
        &self,
        plain: &str,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHashError> {
        let stored = digest
            .as_ref()
            .strip_prefix(FIXTURE_PREFIX)
            .ok_or_else(|| PasswordHashError::malformed_digest("missing fixture prefix"))?;
        Ok(stored == plain)
    }
}
