//! Filesystem object store rooted in a capability directory.
//!
//! Objects are written below one root directory opened through `cap-std`,
//! so a key can never address a path outside that root. Writes go through
//! a hidden temporary file renamed into place, so readers never observe a
//! partially written object.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tokio::task;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ObjectKey;
use crate::domain::ports::{ObjectStore, ObjectStoreError};

/// Writes uploads below a root directory and serves them from a base URL.
#[derive(Clone)]
pub struct CapStdObjectStore {
    root: Arc<Dir>,
    public_base_url: String,
}

impl CapStdObjectStore {
    /// Create `root` if needed and open it.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while creating or opening the directory.
    pub fn open(root: &Path, public_base_url: impl Into<String>) -> io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: Arc::new(dir),
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    fn public_url(&self, key: &ObjectKey) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}

fn write_object(root: &Dir, key: &str, bytes: &[u8]) -> io::Result<()> {
    let path = PathBuf::from(key);
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "key has no file name"))?;
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    if !parent.as_os_str().is_empty() {
        root.create_dir_all(parent)?;
    }
    let staged = parent.join(format!(
        ".{}.tmp.{}",
        file_name.to_string_lossy(),
        Uuid::new_v4().simple()
    ));
    if let Err(err) = root.write(&staged, bytes) {
        let _ = root.remove_file(&staged);
        return Err(err);
    }
    root.rename(&staged, root, &path).inspect_err(|_| {
        let _ = root.remove_file(&staged);
    })
}

#[async_trait]
impl ObjectStore for CapStdObjectStore {
    async fn put(&self, key: &ObjectKey, bytes: Vec<u8>) -> Result<String, ObjectStoreError> {
        let root = Arc::clone(&self.root);
        let relative = key.to_string();
        let size = bytes.len();
        task::spawn_blocking(move || write_object(&root, &relative, &bytes))
            .await
            .map_err(|err| ObjectStoreError::unavailable(err.to_string()))?
            .map_err(|err| ObjectStoreError::write(key.to_string(), err.to_string()))?;
        debug!(key = %key, bytes = size, "object stored");
        Ok(self.public_url(key))
    }
}
