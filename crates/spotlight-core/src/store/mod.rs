//! Content-deduplicating image store.
//!
//! The output directory is the only persisted state. At open it is scanned and
//! every recognized image is indexed by SHA-256; afterwards the registry only
//! grows. A digest hit is confirmed with a full byte comparison before content
//! is reported as existing, so two entries never hold identical bytes.
//!
//! The lookup and the write happen under one lock, so two tasks racing with
//! the same new image cannot both miss the lookup and write it twice.

mod naming;
mod scan;

pub use scan::has_image_extension;

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::checksum;
use crate::descriptor::ImageDescriptor;
use crate::error::StoreError;

/// Extension of persisted images (matched case-insensitively when scanning).
pub const IMAGE_EXTENSION: &str = "jpg";

/// One file in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the file content.
    pub digest: String,
}

/// Result of `DedupStore::insert_if_new`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Identical content was already stored at this path; nothing written.
    Existing(PathBuf),
    /// Content was new and has been written to this path.
    Inserted(PathBuf),
}

impl InsertOutcome {
    pub fn already_existed(&self) -> bool {
        matches!(self, InsertOutcome::Existing(_))
    }

    pub fn path(&self) -> &Path {
        match self {
            InsertOutcome::Existing(p) | InsertOutcome::Inserted(p) => p,
        }
    }
}

#[derive(Debug, Default)]
struct Registry {
    entries: Vec<StoredImage>,
    by_digest: HashMap<String, Vec<usize>>,
}

impl Registry {
    /// Path of a stored file whose bytes equal `bytes`, if any.
    fn find_identical(&self, digest: &str, bytes: &[u8]) -> Result<Option<PathBuf>, StoreError> {
        let Some(indices) = self.by_digest.get(digest) else {
            return Ok(None);
        };
        for &i in indices {
            let path = &self.entries[i].path;
            match fs::read(path) {
                Ok(existing) if existing == bytes => return Ok(Some(path.clone())),
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::warn!(path = %path.display(), "indexed image vanished from disk");
                }
                Err(source) => {
                    return Err(StoreError::Read {
                        path: path.clone(),
                        source,
                    })
                }
            }
        }
        Ok(None)
    }

    fn push(&mut self, image: StoredImage) {
        self.by_digest
            .entry(image.digest.clone())
            .or_default()
            .push(self.entries.len());
        self.entries.push(image);
    }
}

/// Registry of stored image content, shared by all fetch tasks.
#[derive(Debug)]
pub struct DedupStore {
    dir: PathBuf,
    registry: Mutex<Registry>,
}

impl DedupStore {
    /// Opens (creating if needed) `dir` and indexes the images already in it.
    ///
    /// Files whose bytes duplicate an earlier file (in name order) are left on
    /// disk but not indexed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Scan {
            path: dir.clone(),
            source,
        })?;
        Self::index(dir)
    }

    /// Like `open`, but returns `None` instead of creating a missing `dir`.
    pub fn open_existing(dir: impl Into<PathBuf>) -> Result<Option<Self>, StoreError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Ok(None);
        }
        Self::index(dir).map(Some)
    }

    fn index(dir: PathBuf) -> Result<Self, StoreError> {
        let mut registry = Registry::default();
        for path in scan::list_images(&dir)? {
            let bytes = fs::read(&path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            let digest = checksum::sha256_bytes(&bytes);
            if let Some(first) = registry.find_identical(&digest, &bytes)? {
                tracing::warn!(
                    path = %path.display(),
                    kept = %first.display(),
                    "duplicate image already on disk; not indexed"
                );
                continue;
            }
            registry.push(StoredImage { path, digest });
        }
        tracing::debug!(dir = %dir.display(), known = registry.entries.len(), "image store opened");

        Ok(Self {
            dir,
            registry: Mutex::new(registry),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the registry in insertion order.
    pub fn entries(&self) -> Vec<StoredImage> {
        self.lock().entries.clone()
    }

    /// Stores `bytes` under the descriptor's title unless identical content is
    /// already known.
    ///
    /// New content goes to the first free `<title>[n].jpg`. If the write
    /// fails, the partial file is removed and nothing is recorded.
    pub fn insert_if_new(
        &self,
        descriptor: &ImageDescriptor,
        bytes: &[u8],
    ) -> Result<InsertOutcome, StoreError> {
        let digest = checksum::sha256_bytes(bytes);
        let mut registry = self.lock();

        if let Some(existing) = registry.find_identical(&digest, bytes)? {
            return Ok(InsertOutcome::Existing(existing));
        }

        let stem = naming::stem_for(descriptor);
        let (mut file, path) = naming::create_unique(&self.dir, &stem)
            .map_err(|(path, source)| StoreError::Write { path, source })?;
        if let Err(source) = file.write_all(bytes).and_then(|()| file.sync_all()) {
            drop(file);
            let _ = fs::remove_file(&path);
            return Err(StoreError::Write { path, source });
        }

        registry.push(StoredImage {
            path: path.clone(),
            digest,
        });
        Ok(InsertOutcome::Inserted(path))
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        // A panic mid-insert leaves at worst an unrecorded file; the registry itself stays consistent.
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
