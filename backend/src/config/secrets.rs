//! Secret material read from the environment.
//!
//! Secrets never pass through [`AppSettings`](super::AppSettings) so they
//! cannot leak into config dumps. Only a truncated SHA-256 fingerprint of
//! the signing secret is ever logged.

use mockable::Env;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use zeroize::Zeroizing;

pub(crate) const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub(crate) const SENDGRID_API_KEY_ENV: &str = "SENDGRID_API_KEY";
/// Shortest accepted token signing secret.
pub const JWT_SECRET_MIN_LEN: usize = 32;
const FINGERPRINT_BYTES: usize = 8;

/// Build mode for secret validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate missing secrets and emit warnings.
    Debug,
    /// Release builds require every mandatory secret.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    pub fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Secrets needed at start-up.
pub struct Secrets {
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: Zeroizing<Vec<u8>>,
    /// SendGrid API key; `None` selects the logging transport.
    pub sendgrid_api_key: Option<Zeroizing<String>>,
}

/// Errors raised while validating secrets.
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("{name} too short: need >= {min_len} bytes, got {length}")]
    TooShort {
        name: &'static str,
        length: usize,
        min_len: usize,
    },
}

/// Read secrets from `env`.
///
/// Release builds require `JWT_SECRET` of at least [`JWT_SECRET_MIN_LEN`]
/// bytes. Debug builds fall back to a random per-process secret, so tokens
/// do not survive a restart.
pub fn secrets_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<Secrets, SecretsError> {
    let jwt_secret = jwt_secret_from_env(env, mode)?;
    info!(
        fingerprint = %secret_fingerprint(&jwt_secret),
        "token signing secret loaded"
    );
    let sendgrid_api_key = env
        .string(SENDGRID_API_KEY_ENV)
        .filter(|key| !key.trim().is_empty())
        .map(Zeroizing::new);
    if sendgrid_api_key.is_none() {
        warn!("SENDGRID_API_KEY not set; email will only be logged");
    }
    Ok(Secrets {
        jwt_secret,
        sendgrid_api_key,
    })
}

fn jwt_secret_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<Zeroizing<Vec<u8>>, SecretsError> {
    match env.string(JWT_SECRET_ENV) {
        Some(value) => {
            let secret = Zeroizing::new(value.into_bytes());
            let length = secret.len();
            if length >= JWT_SECRET_MIN_LEN {
                return Ok(secret);
            }
            if mode.is_debug() {
                warn!(length, "JWT_SECRET too short; using temporary secret (dev only)");
                Ok(ephemeral_secret())
            } else {
                Err(SecretsError::TooShort {
                    name: JWT_SECRET_ENV,
                    length,
                    min_len: JWT_SECRET_MIN_LEN,
                })
            }
        }
        None if mode.is_debug() => {
            warn!("JWT_SECRET not set; using temporary secret (dev only)");
            Ok(ephemeral_secret())
        }
        None => Err(SecretsError::MissingEnv {
            name: JWT_SECRET_ENV,
        }),
    }
}

fn ephemeral_secret() -> Zeroizing<Vec<u8>> {
    let mut bytes = Zeroizing::new(vec![0_u8; JWT_SECRET_MIN_LEN * 2]);
    rand::thread_rng().fill_bytes(bytes.as_mut_slice());
    bytes
}

/// First eight bytes of the secret's SHA-256 digest as lowercase hex.
#[must_use]
pub fn secret_fingerprint(secret: &[u8]) -> String {
    let digest = Sha256::digest(secret);
    hex::encode(&digest[..FINGERPRINT_BYTES])
}

#[cfg(test)]
mod tests {
    //! Unit tests for secret parsing.

    use super::*;
    use mockable::MockEnv;
    use rstest::rstest;
    use std::collections::HashMap;

    fn mock_env(vars: &[(&str, &str)]) -> MockEnv {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        env
    }

    fn long_secret() -> String {
        "s".repeat(JWT_SECRET_MIN_LEN)
    }

    #[rstest]
    fn release_requires_a_secret() {
        let env = mock_env(&[]);
        let Err(err) = secrets_from_env(&env, BuildMode::Release) else {
            panic!("missing secret should fail");
        };
        assert!(matches!(
            err,
            SecretsError::MissingEnv {
                name: JWT_SECRET_ENV
            }
        ));
    }

    #[rstest]
    fn release_rejects_short_secrets() {
        let env = mock_env(&[(JWT_SECRET_ENV, "short")]);
        let Err(err) = secrets_from_env(&env, BuildMode::Release) else {
            panic!("short secret should fail");
        };
        assert!(matches!(
            err,
            SecretsError::TooShort {
                length: 5,
                min_len: JWT_SECRET_MIN_LEN,
                ..
            }
        ));
    }

    #[rstest]
    fn release_accepts_a_long_secret() {
        let secret = long_secret();
        let env = mock_env(&[(JWT_SECRET_ENV, &secret), (SENDGRID_API_KEY_ENV, "SG.key")]);
        let secrets = secrets_from_env(&env, BuildMode::Release).expect("valid secrets");
        assert_eq!(secrets.jwt_secret.as_slice(), secret.as_bytes());
        assert_eq!(
            secrets.sendgrid_api_key.as_deref().map(String::as_str),
            Some("SG.key")
        );
    }

    #[rstest]
    #[case(&[])]
    #[case(&[(JWT_SECRET_ENV, "short")])]
    fn debug_falls_back_to_an_ephemeral_secret(#[case] vars: &[(&str, &str)]) {
        let env = mock_env(vars);
        let secrets = secrets_from_env(&env, BuildMode::Debug).expect("debug fallback");
        assert!(secrets.jwt_secret.len() >= JWT_SECRET_MIN_LEN);
        assert_ne!(secrets.jwt_secret.as_slice(), b"short");
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn blank_sendgrid_key_selects_logging(#[case] key: &str) {
        let secret = long_secret();
        let env = mock_env(&[(JWT_SECRET_ENV, &secret), (SENDGRID_API_KEY_ENV, key)]);
        let secrets = secrets_from_env(&env, BuildMode::Release).expect("valid secrets");
        assert!(secrets.sendgrid_api_key.is_none());
    }

    #[rstest]
    fn fingerprints_are_short_stable_hex() {
        let first = secret_fingerprint(b"alpha");
        assert_eq!(first.len(), FINGERPRINT_BYTES * 2);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(first, secret_fingerprint(b"alpha"));
        assert_ne!(first, secret_fingerprint(b"beta"));
    }
}
