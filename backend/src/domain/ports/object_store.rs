//! Port for storing uploaded blobs.
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::{Error, ObjectKey};

use super::define_port_error;

define_port_error! {
    /// Failures raised by object store adapters.
    pub enum ObjectStoreError {
        /// The backing store could not be reached.
        Unavailable { message: String } => "object store unavailable: {message}",
        /// The write failed.
        Write { key: String, message: String } => "failed to store {key}: {message}",
    }
}

impl From<ObjectStoreError> for Error {
    fn from(value: ObjectStoreError) -> Self {
        match value {
            ObjectStoreError::Unavailable { message } => {
                Error::service_unavailable(format!("object store unavailable: {message}"))
            }
            err @ ObjectStoreError::Write { .. } => Error::internal(err.to_string()),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`, overwriting any previous object, and return
    /// the public URL of the object.
    async fn put(&self, key: &ObjectKey, bytes: Vec<u8>) -> Result<String, ObjectStoreError>;
}

/// In-memory store returning `memory://{key}` URLs.
#[derive(Debug, Default, Clone)]
pub struct FixtureObjectStore {
    objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl FixtureObjectStore {
    /// Keys stored so far, sorted.
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|guard| guard.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for FixtureObjectStore {
    async fn put(&self, key: &ObjectKey, bytes: Vec<u8>) -> Result<String, ObjectStoreError> {
        let mut guard = self
            .objects
            .lock()
            .map_err(|_| ObjectStoreError::unavailable("fixture store poisoned"))?;
        guard.insert(key.to_string(), bytes);
        Ok(format!("memory://{key}"))
    }
}
