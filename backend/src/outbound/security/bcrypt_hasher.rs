//! bcrypt-backed `PasswordHasher`.

use async_trait::async_trait;
use tokio::task;

use crate::domain::PasswordDigest;
use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Work factor used when none is configured.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Digests passwords with bcrypt on the blocking thread pool.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}

fn join_error(err: task::JoinError) -> PasswordHashError {
    PasswordHashError::hash(format!("hashing task failed: {err}"))
}

#[async_trait]
impl PasswordHasher for BcryptPasswordHasher {
    async fn hash(&self, plain: &str) -> Result<PasswordDigest, PasswordHashError> {
        let plain = zeroize::Zeroizing::new(plain.to_owned());
        let cost = self.cost;
        let digest = task::spawn_blocking(move || bcrypt::hash(plain.as_str(), cost))
            .await
            .map_err(join_error)?
            .map_err(|err| PasswordHashError::hash(err.to_string()))?;
        Ok(PasswordDigest::new(digest))
    }

    async fn verify(
        &self,
        plain: &str,
        digest: &PasswordDigest,
    ) -> Result<bool, PasswordHashError> {
        let plain = zeroize::Zeroizing::new(plain.to_owned());
        let stored = digest.as_ref().to_owned();
        task::spawn_blocking(move || bcrypt::verify(plain.as_str(), &stored))
            .await
            .map_err(join_error)?
            .map_err(|err| PasswordHashError::malformed_digest(err.to_string()))
    }
}
