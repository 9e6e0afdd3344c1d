//! Capability-scoped photo storage.
//!
//! Uploaded photos are written under a single directory opened once at
//! startup. Writes land in a staging file first and are renamed into place
//! so readers never observe a partially written image.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;
use uuid::Uuid;

use crate::domain::TraceId;
use crate::domain::ports::{PhotoStore, PhotoStoreError};

/// Photo store rooted at an upload directory.
#[derive(Clone)]
pub struct PhotoDirectory {
    dir: Arc<Dir>,
}

impl PhotoDirectory {
    /// Open `path`, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns the I/O error raised while creating or opening the directory.
    pub fn open(path: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self { dir: Arc::new(dir) })
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
}

fn write_replacing(dir: &Dir, file_name: &str, bytes: &[u8]) -> io::Result<()> {
    let staging = format!(".upload-{}", Uuid::new_v4().simple());
    if let Err(error) = dir.write(&staging, bytes) {
        let _cleanup = dir.remove_file(&staging);
        return Err(error);
    }
    dir.rename(&staging, dir, file_name).inspect_err(|_| {
        let _cleanup = dir.remove_file(&staging);
    })
}

#[async_trait]
impl PhotoStore for PhotoDirectory {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> Result<(), PhotoStoreError> {
        if !is_plain_file_name(file_name) {
            return Err(PhotoStoreError::io(format!(
                "refusing to write outside the upload directory: {file_name}"
            )));
        }
        let dir = Arc::clone(&self.dir);
        let name = file_name.to_owned();
        let contents = bytes.to_vec();
        let size = contents.len();
        TraceId::spawn_blocking(move || write_replacing(&dir, &name, &contents))
            .await
            .map_err(|err| PhotoStoreError::io(err.to_string()))?
            .map_err(|err| PhotoStoreError::io(err.to_string()))?;
        debug!(file_name, size, "photo stored");
        Ok(())
    }
}
