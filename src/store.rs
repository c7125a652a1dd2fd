//! On-disk home of the node list.
//!
//! Writes go to a sibling temp file which is fsynced and then renamed over
//! the target, so the target is always either the previous complete
//! snapshot or the new one. The two halves are exposed separately as
//! [`Store::stage`] and [`Store::commit`].

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::codec::SnapshotCodec;
use crate::error::PersistError;
use crate::types::AddressSet;

#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    codec: SnapshotCodec,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>, codec: SnapshotCodec) -> Self {
        Self {
            path: path.into(),
            codec,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where [`Store::stage`] puts the next snapshot before it is committed.
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(OsString::new);
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Atomically replaces the snapshot file with `nodes`.
    pub fn write(&self, nodes: &AddressSet) -> Result<(), PersistError> {
        let staged = self.stage(nodes)?;
        self.commit(&staged)?;
        debug!("Saved {} nodes to {}", nodes.len(), self.path.display());
        Ok(())
    }

    /// Encodes `nodes` into the temp file and syncs it to stable storage.
    /// The target file is not touched.
    pub fn stage(&self, nodes: &AddressSet) -> Result<PathBuf, PersistError> {
        let tmp = self.temp_path();
        let bytes = self.codec.encode(nodes);

        let result = (|| -> std::io::Result<()> {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()
        })();

        if let Err(e) = result {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(tmp)
    }

    /// Renames a staged file over the target and syncs the directory entry.
    pub fn commit(&self, staged: &Path) -> Result<(), PersistError> {
        if let Err(e) = fs::rename(staged, &self.path) {
            let _ = fs::remove_file(staged);
            return Err(e.into());
        }

        #[cfg(unix)]
        {
            let dir = match self.path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
                warn!("Unable to sync directory {}: {}", dir.display(), e);
            }
        }

        Ok(())
    }

    pub fn read(&self) -> Result<AddressSet, PersistError> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PersistError::NotFound(self.path.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        self.codec.decode(&bytes)
    }
}
