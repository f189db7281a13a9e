//! JSON-backed known-face store.
//!
//! On disk the store is a single object with two parallel arrays:
//!
//! ```json
//! { "known_encodings": [[0.1, ...], ...], "known_names": ["Alice", ...] }
//! ```
//!
//! The file is rewritten wholesale on every append; the store is meant to
//! hold tens to low hundreds of entries and has exactly one in-process
//! owner, so there is no incremental update path and no locking.

use crate::types::{Embedding, KnownFaceEntry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The file exists but is not a valid store. An absent file is NOT
    /// corrupt; it is the first-run state.
    #[error("store file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("failed to read store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to persist store to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("face name must not be empty")]
    EmptyName,
    #[error("embedding has {got} dimensions, store expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Serialized file layout. Both keys are required; `serde` rejects a file
/// missing either one.
#[derive(Serialize, Deserialize)]
struct StoreFile {
    known_encodings: Vec<Vec<f32>>,
    known_names: Vec<String>,
}

/// Durable registry of named face embeddings.
#[derive(Debug)]
pub struct KnownFaceStore {
    path: PathBuf,
    entries: Vec<KnownFaceEntry>,
    /// Embedding dimensionality, seeded by the first entry seen.
    dim: Option<usize>,
}

impl KnownFaceStore {
    /// Load the store from `path`.
    ///
    /// An absent file yields an empty store. A present file that fails to
    /// parse, is missing a key, has mismatched array lengths, or mixes
    /// embedding dimensionalities fails with [`StoreError::Corrupt`] and
    /// leaves nothing constructed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no known-face file; starting empty");
                return Ok(Self { path, entries: Vec::new(), dim: None });
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let file: StoreFile = serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        if file.known_encodings.len() != file.known_names.len() {
            return Err(StoreError::Corrupt {
                path,
                reason: format!(
                    "{} encodings but {} names",
                    file.known_encodings.len(),
                    file.known_names.len()
                ),
            });
        }

        let mut dim = None;
        for (i, enc) in file.known_encodings.iter().enumerate() {
            match dim {
                None => dim = Some(enc.len()),
                Some(d) if d != enc.len() => {
                    return Err(StoreError::Corrupt {
                        path,
                        reason: format!(
                            "entry {i} has {} dimensions, expected {d}",
                            enc.len()
                        ),
                    });
                }
                Some(_) => {}
            }
        }

        let entries = file
            .known_names
            .into_iter()
            .zip(file.known_encodings)
            .map(|(name, values)| KnownFaceEntry { name, embedding: Embedding::new(values) })
            .collect::<Vec<_>>();

        tracing::info!(path = %path.display(), entries = entries.len(), "loaded known faces");

        Ok(Self { path, entries, dim })
    }

    /// Serialize the full store to its path, creating parent directories.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|source| StoreError::Persist {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }

        let file = StoreFile {
            known_encodings: self
                .entries
                .iter()
                .map(|e| e.embedding.values.clone())
                .collect(),
            known_names: self.entries.iter().map(|e| e.name.clone()).collect(),
        };

        let json = serde_json::to_string(&file).map_err(|e| StoreError::Persist {
            path: self.path.clone(),
            source: std::io::Error::other(e),
        })?;

        std::fs::write(&self.path, json).map_err(|source| StoreError::Persist {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "store saved");
        Ok(())
    }

    /// Append one entry and rewrite the file.
    ///
    /// The only mutation path: no update-in-place, no delete. If the save
    /// fails the in-memory store keeps the new entry, so persisted state
    /// may lag memory; the [`StoreError::Persist`] return tells the caller
    /// exactly that.
    pub fn append(&mut self, name: &str, embedding: Embedding) -> Result<(), StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::EmptyName);
        }
        match self.dim {
            None => self.dim = Some(embedding.len()),
            Some(expected) if expected != embedding.len() => {
                return Err(StoreError::DimensionMismatch { expected, got: embedding.len() });
            }
            Some(_) => {}
        }

        self.entries.push(KnownFaceEntry { name: name.to_string(), embedding });
        self.save()?;

        tracing::info!(name, entries = self.entries.len(), "enrolled face");
        Ok(())
    }

    /// Current entries in insertion order, read-only.
    pub fn entries(&self) -> &[KnownFaceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("known_faces.json")
    }

    #[test]
    fn test_load_absent_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = KnownFaceStore::load(store_path(&dir)).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_then_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);

        let mut store = KnownFaceStore::load(&path).unwrap();
        store.append("Alice", Embedding::new(vec![0.1, 0.2])).unwrap();
        store.append("Bob", Embedding::new(vec![0.3, 0.4])).unwrap();

        let reloaded = KnownFaceStore::load(&path).unwrap();
        assert_eq!(reloaded.entries(), store.entries());
        assert_eq!(reloaded.entries()[0].name, "Alice");
        assert_eq!(reloaded.entries()[1].name, "Bob");
    }

    #[test]
    fn test_append_grows_by_one_at_end() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = KnownFaceStore::load(store_path(&dir)).unwrap();
        store.append("Alice", Embedding::new(vec![1.0])).unwrap();
        let before = store.len();

        store.append("Bob", Embedding::new(vec![2.0])).unwrap();
        assert_eq!(store.len(), before + 1);
        assert_eq!(store.entries().last().unwrap().name, "Bob");
    }

    #[test]
    fn test_append_rejects_empty_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = KnownFaceStore::load(store_path(&dir)).unwrap();
        let err = store.append("  ", Embedding::new(vec![1.0])).unwrap_err();
        assert!(matches!(err, StoreError::EmptyName));
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_rejects_dimension_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = KnownFaceStore::load(store_path(&dir)).unwrap();
        store.append("Alice", Embedding::new(vec![1.0, 2.0])).unwrap();

        let err = store.append("Bob", Embedding::new(vec![1.0])).unwrap_err();
        assert!(matches!(err, StoreError::DimensionMismatch { expected: 2, got: 1 }));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        std::fs::write(&path, "{not json").unwrap();

        let err = KnownFaceStore::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_load_rejects_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        std::fs::write(&path, r#"{"known_names": ["Alice"]}"#).unwrap();

        let err = KnownFaceStore::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_load_rejects_mismatched_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        std::fs::write(
            &path,
            r#"{"known_encodings": [[1.0], [2.0]], "known_names": ["Alice"]}"#,
        )
        .unwrap();

        let err = KnownFaceStore::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_load_rejects_mixed_dimensionality() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_path(&dir);
        std::fs::write(
            &path,
            r#"{"known_encodings": [[1.0, 2.0], [3.0]], "known_names": ["Alice", "Bob"]}"#,
        )
        .unwrap();

        let err = KnownFaceStore::load(&path).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/known_faces.json");

        let mut store = KnownFaceStore::load(&path).unwrap();
        store.append("Alice", Embedding::new(vec![1.0])).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_fails_on_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        // The parent "file.json" is a file, so creating it as a directory fails.
        let blocker = dir.path().join("file.json");
        std::fs::write(&blocker, "x").unwrap();

        let mut store = KnownFaceStore::load(blocker.join("store.json")).unwrap();
        let err = store.append("Alice", Embedding::new(vec![1.0])).unwrap_err();
        assert!(matches!(err, StoreError::Persist { .. }));
        // In-memory append already happened; persisted state diverges.
        assert_eq!(store.len(), 1);
    }
}
