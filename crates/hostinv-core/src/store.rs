//! Local persistence of the artifact and fingerprint
//!
//! Both files are replaced atomically: content goes to a temporary file in the
//! same directory, is synced, then renamed over the target. A crash leaves
//! either the old or the new file, never a truncated one.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use hostinv_inventory::InventoryDocument;
use tempfile::NamedTempFile;
use tracing::{debug, instrument, warn};

use crate::change::Fingerprint;
use crate::config::StorageConfig;
use crate::error::StoreError;

/// Artifact and fingerprint files under one storage directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    artifact: PathBuf,
    fingerprint: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>, artifact: &str, fingerprint: &str) -> Self {
        let dir = dir.into();
        Self {
            artifact: dir.join(artifact),
            fingerprint: dir.join(fingerprint),
            dir,
        }
    }

    /// Create a store from configuration
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.dir, &config.artifact, &config.fingerprint)
    }

    /// Path of the document artifact
    pub fn artifact_path(&self) -> &Path {
        &self.artifact
    }

    /// Path of the fingerprint file
    pub fn fingerprint_path(&self) -> &Path {
        &self.fingerprint
    }

    /// Write the document as pretty JSON, replacing any previous artifact
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    /// Returns an error if serialization fails or the file cannot be written.
    #[instrument(skip(self, doc), fields(path = %self.artifact.display()))]
    pub fn store(&self, doc: &InventoryDocument) -> Result<u64, StoreError> {
        let json = doc.to_pretty_json()?;
        self.write_atomic(&self.artifact, json.as_bytes())?;
        debug!(bytes = json.len(), "artifact written");
        Ok(json.len() as u64)
    }

    /// Record the fingerprint of the last delivered document
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    #[instrument(skip(self), fields(path = %self.fingerprint.display()))]
    pub fn store_fingerprint(&self, fingerprint: &Fingerprint) -> Result<(), StoreError> {
        self.write_atomic(&self.fingerprint, fingerprint.as_str().as_bytes())?;
        debug!(fingerprint = fingerprint.short(), "fingerprint written");
        Ok(())
    }

    /// Fingerprint of the last delivered document, if any
    ///
    /// A missing file means first run. An unreadable or malformed fingerprint
    /// is treated the same way so the next run delivers.
    ///
    /// # Errors
    /// Returns an error only for I/O failures other than a missing file.
    pub fn load_fingerprint(&self) -> Result<Option<Fingerprint>, StoreError> {
        let content = match fs::read_to_string(&self.fingerprint) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.fingerprint.clone(),
                    source,
                });
            }
        };

        let fingerprint = Fingerprint::parse(&content);
        if fingerprint.is_none() {
            warn!(path = %self.fingerprint.display(), "ignoring malformed fingerprint");
        }
        Ok(fingerprint)
    }

    fn write_atomic(&self, target: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let io_err = |source: io::Error| StoreError::Io {
            path: target.to_path_buf(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let mut temp = NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        temp.write_all(bytes).map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;
        temp.persist(target).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hostinv_exec::{Probe, ScriptedRunner};
    use hostinv_inventory::{AssemblerOptions, InventoryAssembler};

    use super::*;

    async fn document() -> InventoryDocument {
        let runner = ScriptedRunner::new().with_output("hostname", "web01");
        InventoryAssembler::new(Probe::new(Arc::new(runner)), AssemblerOptions::default())
            .assemble()
            .await
    }

    fn store_in(dir: &Path) -> ArtifactStore {
        ArtifactStore::new(dir.join("state"), "inventory.json", ".inventory.hash")
    }

    #[test]
    fn test_missing_fingerprint_is_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());

        assert_eq!(store.load_fingerprint().unwrap(), None);
    }

    #[test]
    fn test_fingerprint_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let fingerprint = Fingerprint::parse(&"0f".repeat(32)).unwrap();

        store.store_fingerprint(&fingerprint).unwrap();

        assert_eq!(store.load_fingerprint().unwrap(), Some(fingerprint));
    }

    #[test]
    fn test_malformed_fingerprint_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        fs::create_dir_all(dir.path().join("state")).unwrap();
        fs::write(store.fingerprint_path(), "not a digest").unwrap();

        assert_eq!(store.load_fingerprint().unwrap(), None);
    }

    #[tokio::test]
    async fn test_store_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let doc = document().await;

        store.store(&doc).unwrap();
        let first = fs::read_to_string(store.artifact_path()).unwrap();
        let bytes = store.store(&doc).unwrap();
        let second = fs::read_to_string(store.artifact_path()).unwrap();

        assert_eq!(first, second);
        assert_eq!(bytes, second.len() as u64);
        let parsed: InventoryDocument = serde_json::from_str(&second).unwrap();
        assert_eq!(parsed, doc);
        let leftovers = fs::read_dir(dir.path().join("state")).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn test_unwritable_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();
        let store = ArtifactStore::new(blocker.join("state"), "inventory.json", ".inventory.hash");

        let result = store.store(&document().await);

        assert!(matches!(result, Err(StoreError::Io { .. })));
    }
}
