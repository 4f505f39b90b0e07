//! Credential adapters: bcrypt password digests and HS256 bearer tokens.

mod bcrypt_hasher;
mod jwt_token_service;

pub use bcrypt_hasher::{BcryptPasswordHasher, DEFAULT_BCRYPT_COST};
pub use jwt_token_service::{DEFAULT_TOKEN_TTL, JwtTokenService};
