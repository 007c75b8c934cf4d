//! Durable connection-id storage.
//!
//! The connection id is the only state that survives a restart: the
//! first `status()` call after startup uses it to rediscover an
//! in-flight session the gateway may still be tracking.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::Result;

/// File name under the state directory holding the connection id.
const CONNECTION_ID_FILE: &str = "connection_id";

/// File-backed storage for the active connection id.
#[derive(Debug, Clone)]
pub struct ConnectionIdStore {
    path: PathBuf,
}

impl ConnectionIdStore {
    /// Store rooted at `state_dir`; the directory is created lazily on
    /// the first save.
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            path: state_dir.into().join(CONNECTION_ID_FILE),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `id`, replacing any previous value.
    pub fn save(&self, id: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, id)?;
        Ok(())
    }

    /// Load the persisted id, or `None` if nothing was saved.
    pub fn load(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => {
                let id = raw.trim();
                if id.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(id.to_string()))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the persisted id; absent is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
