//! Market-state snapshot persistence.
//!
//! One JSON document per venue, written atomically via a temporary file,
//! with a sha-256 digest stored in a sidecar. The digest is verified on
//! load when the sidecar is present; the snapshot document itself carries
//! no wrapper so its bytes stay exactly the published format.

use crate::domain::Snapshot;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Failure to persist or load a market-state snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure.
    #[error("snapshot io error: {0}")]
    Io(#[from] io::Error),
    /// The document could not be encoded or decoded.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// The stored digest does not match the document.
    #[error("snapshot digest mismatch: expected {expected}, computed {actual}")]
    DigestMismatch {
        expected: String,
        actual: String,
    },
    /// No snapshot has been stored yet.
    #[error("no snapshot found at {}", path.display())]
    NotFound { path: PathBuf },
}

/// Stores and loads the venue snapshot document.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Creates a store writing to the given document path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The snapshot document path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn digest_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot".to_owned());
        name.push_str(".sha256");
        self.path.with_file_name(name)
    }

    /// Serializes and persists a snapshot, replacing any previous one.
    pub fn store(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let document = serde_json::to_vec_pretty(snapshot)?;
        let digest = hex_digest(&document);

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, &document)?;
        fs::rename(&staging, &self.path)?;
        fs::write(self.digest_path(), &digest)?;

        debug!(
            path = %self.path.display(),
            bytes = document.len(),
            instruments = snapshot.instruments.len(),
            "stored market-state snapshot"
        );
        Ok(())
    }

    /// Loads the persisted snapshot, verifying the sidecar digest when one
    /// exists.
    pub fn load(&self) -> Result<Snapshot, StoreError> {
        let document = match fs::read(&self.path) {
            Ok(document) => document,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(error) => return Err(error.into()),
        };

        match fs::read_to_string(self.digest_path()) {
            Ok(expected) => {
                let expected = expected.trim().to_owned();
                let actual = hex_digest(&document);
                if expected != actual {
                    return Err(StoreError::DigestMismatch { expected, actual });
                }
            }
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                warn!(
                    path = %self.path.display(),
                    "snapshot digest sidecar missing, skipping integrity check"
                );
            }
            Err(error) => return Err(error.into()),
        }

        Ok(serde_json::from_slice(&document)?)
    }
}

fn hex_digest(document: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document);
    let digest = hasher.finalize();
    let mut text = String::with_capacity(digest.len() * 2);
    for byte in digest {
        text.push_str(&format!("{byte:02x}"));
    }
    text
}
