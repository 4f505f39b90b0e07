//! Start-up configuration: layered settings plus environment secrets.

mod secrets;
mod settings;

pub use secrets::{
    BuildMode, JWT_SECRET_MIN_LEN, Secrets, SecretsError, secret_fingerprint, secrets_from_env,
};
pub use settings::{AppSettings, SettingsError};
