use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{VfsError, VfsResult};
use crate::local::LocalFsBackend;
use crate::memory::InMemoryBackend;
use crate::path::VfsPath;
use crate::traits::StorageBackend;

/// A backend together with the base path a store lives under.
#[derive(Clone)]
pub struct StoreRoot {
    pub backend: Arc<dyn StorageBackend>,
    pub path: VfsPath,
}

impl StoreRoot {
    /// Bind `path` on `backend`.
    pub fn new(backend: Arc<dyn StorageBackend>, path: VfsPath) -> Self {
        Self { backend, path }
    }

    /// The root of a sub-directory.
    pub fn join(&self, relative: &str) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            path: self.path.join(relative),
        }
    }
}

impl fmt::Debug for StoreRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreRoot")
            .field("scheme", &self.backend.scheme())
            .field("path", &self.path)
            .finish()
    }
}

impl fmt::Display for StoreRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.backend.scheme(), self.path)
    }
}

/// Resolves location strings to storage backends.
///
/// Supported forms:
///
/// - `memfs://<path>` -- the context's shared in-memory backend. Every
///   `memfs` location built from the same context sees the same files.
/// - `file://<dir>` -- a [`LocalFsBackend`] rooted at `<dir>`.
/// - a bare filesystem path -- same as `file://`.
pub struct VfsContext {
    memfs: Arc<InMemoryBackend>,
}

impl VfsContext {
    /// Create a context with a fresh in-memory backend.
    pub fn new() -> Self {
        Self {
            memfs: Arc::new(InMemoryBackend::new()),
        }
    }

    /// The shared in-memory backend behind `memfs://` locations.
    pub fn memfs(&self) -> Arc<InMemoryBackend> {
        Arc::clone(&self.memfs)
    }

    /// Resolve a location string.
    pub fn build_path(&self, location: &str) -> VfsResult<StoreRoot> {
        let location = location.trim();
        if location.is_empty() {
            return Err(VfsError::InvalidLocation {
                location: location.to_string(),
                reason: "location is empty".into(),
            });
        }

        match location.split_once("://") {
            Some(("memfs", rest)) => {
                let backend: Arc<dyn StorageBackend> = self.memfs.clone();
                Ok(StoreRoot::new(backend, VfsPath::new(rest)))
            }
            Some(("file", rest)) => Self::local_root(location, rest),
            Some((scheme, _)) => Err(VfsError::UnsupportedScheme(scheme.to_string())),
            None => Self::local_root(location, location),
        }
    }

    fn local_root(location: &str, dir: &str) -> VfsResult<StoreRoot> {
        if dir.is_empty() {
            return Err(VfsError::InvalidLocation {
                location: location.to_string(),
                reason: "missing directory".into(),
            });
        }
        let backend: Arc<dyn StorageBackend> = Arc::new(LocalFsBackend::new(PathBuf::from(dir)));
        Ok(StoreRoot::new(backend, VfsPath::root()))
    }
}

impl Default for VfsContext {
    fn default() -> Self {
        Self::new()
    }
}
