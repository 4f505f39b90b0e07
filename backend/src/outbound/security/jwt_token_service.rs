//! HS256 bearer tokens.
//!
//! Claims carry the subject, its role, and issue/expiry instants in Unix
//! seconds. Expiry is checked against the injected clock rather than the
//! system clock, so token lifetimes follow the same time source as the rest
//! of the domain.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{Role, TokenClaims, UserId};

/// Default token lifetime: one day.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: String,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Signs and validates tokens with a shared HMAC secret.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl JwtTokenService {
    /// Build a service from the raw signing secret.
    ///
    /// The secret is copied into the key material; callers remain
    /// responsible for zeroizing their own buffer.
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            clock,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let now = self.clock.utc();
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::signing("token lifetime overflows the calendar"))?;
        let wire = WireClaims {
            sub: claims.subject.to_string(),
            role: claims.role,
            iat: now.timestamp(),
            exp: expires.timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &wire, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<WireClaims>(token, &self.decoding, &self.validation)
            .map_err(|err| {
                debug!(error = %err, "bearer token rejected");
                TokenError::Invalid
            })?;
        let wire = data.claims;
        if wire.exp <= self.clock.utc().timestamp() {
            debug!("bearer token expired");
            return Err(TokenError::Invalid);
        }
        let subject = UserId::new(&wire.sub).map_err(|_| TokenError::Invalid)?;
        Ok(TokenClaims {
            subject,
            role: wire.role,
        })
    }
}
