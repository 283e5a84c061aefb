use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::BlobError;
use crate::traits::{BlobMeta, BlobStore};

/// FileStore is a BlobStore implementation backed by the local filesystem.
///
/// Keys map to paths under `base_dir`:
///   key "blogs/abc/cover.png" → `{base_dir}/blogs/abc/cover.png`
///
/// Parent directories are created automatically on `put`.
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    /// Create a new FileStore rooted at `base_dir`.
    /// The directory is created if it doesn't exist.
    pub fn open(base_dir: &Path) -> Result<Self, BlobError> {
        fs::create_dir_all(base_dir).map_err(|e| BlobError::Io(e.to_string()))?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    /// Resolve a key to a filesystem path. Keys must be relative, with
    /// plain path components only — no `..`, no leading separator.
    fn resolve(&self, key: &str) -> Result<PathBuf, BlobError> {
        if key.is_empty() || key.starts_with('/') || key.starts_with('\\') {
            return Err(BlobError::InvalidKey(key.to_string()));
        }

        let rel = Path::new(key);
        for component in rel.components() {
            match component {
                Component::Normal(_) => {}
                _ => return Err(BlobError::InvalidKey(key.to_string())),
            }
        }

        Ok(self.base_dir.join(rel))
    }

    fn collect(&self, dir: &Path, out: &mut Vec<BlobMeta>) -> Result<(), BlobError> {
        let entries = fs::read_dir(dir).map_err(|e| BlobError::Io(e.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|e| BlobError::Io(e.to_string()))?;
            let path = entry.path();
            if path.is_dir() {
                self.collect(&path, out)?;
            } else if path.is_file() {
                let meta = entry.metadata().map_err(|e| BlobError::Io(e.to_string()))?;
                let key = path
                    .strip_prefix(&self.base_dir)
                    .map_err(|e| BlobError::Io(e.to_string()))?
                    .to_string_lossy()
                    .replace('\\', "/");
                out.push(BlobMeta {
                    key,
                    size: meta.len(),
                });
            }
        }
        Ok(())
    }
}

impl BlobStore for FileStore {
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| BlobError::Io(e.to_string()))?;
        }
        fs::write(&path, data).map_err(|e| BlobError::Io(e.to_string()))
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError> {
        let path = self.resolve(key)?;
        if !path.is_file() {
            return Ok(None);
        }
        let data = fs::read(&path).map_err(|e| BlobError::Io(e.to_string()))?;
        Ok(Some(data))
    }

    fn delete(&self, key: &str) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        if path.is_file() {
            fs::remove_file(&path).map_err(|e| BlobError::Io(e.to_string()))?;
        }
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool, BlobError> {
        Ok(self.resolve(key)?.is_file())
    }

    fn list(&self, prefix: &str) -> Result<Vec<BlobMeta>, BlobError> {
        let mut out = Vec::new();
        if self.base_dir.is_dir() {
            self.collect(&self.base_dir.clone(), &mut out)?;
        }
        out.retain(|m| m.key.starts_with(prefix));
        out.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(out)
    }
}
