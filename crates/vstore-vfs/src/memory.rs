use std::collections::BTreeMap;
use std::sync::RwLock;

use tracing::debug;
use vstore_types::Context;

use crate::acl::Acl;
use crate::error::{VfsError, VfsResult};
use crate::path::VfsPath;
use crate::traits::StorageBackend;

#[derive(Clone, Debug)]
struct MemFile {
    data: Vec<u8>,
    acl: Option<Acl>,
}

/// In-memory, `BTreeMap`-based storage backend.
///
/// Intended for tests and embedding. Files are held behind a `RwLock`;
/// directories exist implicitly while they contain at least one file.
/// Every mutation happens under the write lock, which makes `create_file`
/// trivially atomic.
pub struct InMemoryBackend {
    files: RwLock<BTreeMap<VfsPath, MemFile>>,
}

impl InMemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of files currently stored.
    pub fn len(&self) -> VfsResult<usize> {
        let files = self.files.read().map_err(|_| VfsError::LockPoisoned)?;
        Ok(files.len())
    }

    /// Returns `true` if no files are stored.
    pub fn is_empty(&self) -> VfsResult<bool> {
        Ok(self.len()? == 0)
    }

    /// The ACL recorded when `path` was last written.
    pub fn acl(&self, path: &VfsPath) -> VfsResult<Option<Acl>> {
        let files = self.files.read().map_err(|_| VfsError::LockPoisoned)?;
        files
            .get(path)
            .map(|file| file.acl.clone())
            .ok_or_else(|| VfsError::NotFound { path: path.clone() })
    }

    /// All stored paths, sorted.
    pub fn paths(&self) -> VfsResult<Vec<VfsPath>> {
        let files = self.files.read().map_err(|_| VfsError::LockPoisoned)?;
        Ok(files.keys().cloned().collect())
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for InMemoryBackend {
    fn scheme(&self) -> &'static str {
        "memfs"
    }

    fn read_file(&self, ctx: &Context, path: &VfsPath) -> VfsResult<Vec<u8>> {
        ctx.check()?;
        let files = self.files.read().map_err(|_| VfsError::LockPoisoned)?;
        files
            .get(path)
            .map(|file| file.data.clone())
            .ok_or_else(|| VfsError::NotFound { path: path.clone() })
    }

    fn create_file(
        &self,
        ctx: &Context,
        path: &VfsPath,
        data: &[u8],
        acl: Option<&Acl>,
    ) -> VfsResult<()> {
        ctx.check()?;
        let mut files = self.files.write().map_err(|_| VfsError::LockPoisoned)?;
        if files.contains_key(path) {
            return Err(VfsError::AlreadyExists { path: path.clone() });
        }
        files.insert(
            path.clone(),
            MemFile {
                data: data.to_vec(),
                acl: acl.cloned(),
            },
        );
        debug!(%path, len = data.len(), "memfs create");
        Ok(())
    }

    fn write_file(
        &self,
        ctx: &Context,
        path: &VfsPath,
        data: &[u8],
        acl: Option<&Acl>,
    ) -> VfsResult<()> {
        ctx.check()?;
        let mut files = self.files.write().map_err(|_| VfsError::LockPoisoned)?;
        files.insert(
            path.clone(),
            MemFile {
                data: data.to_vec(),
                acl: acl.cloned(),
            },
        );
        debug!(%path, len = data.len(), "memfs write");
        Ok(())
    }

    fn remove(&self, ctx: &Context, path: &VfsPath) -> VfsResult<()> {
        ctx.check()?;
        let mut files = self.files.write().map_err(|_| VfsError::LockPoisoned)?;
        match files.remove(path) {
            Some(_) => Ok(()),
            None => Err(VfsError::NotFound { path: path.clone() }),
        }
    }

    fn list_child_names(&self, ctx: &Context, path: &VfsPath) -> VfsResult<Vec<String>> {
        ctx.check()?;
        let files = self.files.read().map_err(|_| VfsError::LockPoisoned)?;
        let mut dir_exists = false;
        let mut names = Vec::new();
        for file_path in files.keys() {
            if file_path == path || !file_path.starts_with(path) {
                continue;
            }
            dir_exists = true;
            if path.is_parent_of(file_path) {
                if let Some(name) = file_path.file_name() {
                    names.push(name.to_string());
                }
            }
        }
        if !dir_exists {
            return Err(VfsError::NotFound { path: path.clone() });
        }
        Ok(names)
    }

    fn exists(&self, ctx: &Context, path: &VfsPath) -> VfsResult<bool> {
        ctx.check()?;
        let files = self.files.read().map_err(|_| VfsError::LockPoisoned)?;
        Ok(files.contains_key(path))
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("file_count", &self.len().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn ctx() -> Context {
        Context::background()
    }

    // -----------------------------------------------------------------------
    // Read / write
    // -----------------------------------------------------------------------

    #[test]
    fn create_and_read() {
        let fs = InMemoryBackend::new();
        let p = VfsPath::new("/widgets/a");
        fs.create_file(&ctx(), &p, b"hello", None).unwrap();
        assert_eq!(fs.read_file(&ctx(), &p).unwrap(), b"hello");
    }

    #[test]
    fn read_missing_is_not_found() {
        let fs = InMemoryBackend::new();
        let err = fs.read_file(&ctx(), &VfsPath::new("/nope")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn create_existing_fails_and_keeps_contents() {
        let fs = InMemoryBackend::new();
        let p = VfsPath::new("/a");
        fs.create_file(&ctx(), &p, b"first", None).unwrap();
        let err = fs.create_file(&ctx(), &p, b"second", None).unwrap_err();
        assert!(err.is_already_exists());
        assert_eq!(fs.read_file(&ctx(), &p).unwrap(), b"first");
    }

    #[test]
    fn write_replaces() {
        let fs = InMemoryBackend::new();
        let p = VfsPath::new("/a");
        fs.write_file(&ctx(), &p, b"one", None).unwrap();
        fs.write_file(&ctx(), &p, b"two", None).unwrap();
        assert_eq!(fs.read_file(&ctx(), &p).unwrap(), b"two");
        assert_eq!(fs.len().unwrap(), 1);
    }

    #[test]
    fn acl_is_recorded() {
        let fs = InMemoryBackend::new();
        let p = VfsPath::new("/a");
        let acl = Acl::Canned("private".into());
        fs.create_file(&ctx(), &p, b"x", Some(&acl)).unwrap();
        assert_eq!(fs.acl(&p).unwrap(), Some(acl));
    }

    // -----------------------------------------------------------------------
    // Remove / exists
    // -----------------------------------------------------------------------

    #[test]
    fn remove_present_then_missing() {
        let fs = InMemoryBackend::new();
        let p = VfsPath::new("/a");
        fs.create_file(&ctx(), &p, b"x", None).unwrap();
        assert!(fs.exists(&ctx(), &p).unwrap());
        fs.remove(&ctx(), &p).unwrap();
        assert!(!fs.exists(&ctx(), &p).unwrap());
        assert!(fs.remove(&ctx(), &p).unwrap_err().is_not_found());
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    #[test]
    fn list_direct_children_only() {
        let fs = InMemoryBackend::new();
        for p in ["/w/a", "/w/b", "/w/sub/c", "/other/d"] {
            fs.create_file(&ctx(), &VfsPath::new(p), b"x", None).unwrap();
        }
        let mut names = fs.list_child_names(&ctx(), &VfsPath::new("/w")).unwrap();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn list_missing_dir_is_not_found() {
        let fs = InMemoryBackend::new();
        let err = fs.list_child_names(&ctx(), &VfsPath::new("/w")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn list_dir_with_only_subdirs_is_empty() {
        let fs = InMemoryBackend::new();
        fs.create_file(&ctx(), &VfsPath::new("/w/sub/c"), b"x", None).unwrap();
        let names = fs.list_child_names(&ctx(), &VfsPath::new("/w")).unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn list_does_not_match_sibling_prefix() {
        let fs = InMemoryBackend::new();
        fs.create_file(&ctx(), &VfsPath::new("/wx/a"), b"x", None).unwrap();
        assert!(fs
            .list_child_names(&ctx(), &VfsPath::new("/w"))
            .unwrap_err()
            .is_not_found());
    }

    // -----------------------------------------------------------------------
    // Cancellation
    // -----------------------------------------------------------------------

    #[test]
    fn cancelled_context_blocks_writes() {
        let fs = InMemoryBackend::new();
        let ctx = Context::background();
        ctx.cancel();
        let err = fs
            .create_file(&ctx, &VfsPath::new("/a"), b"x", None)
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(fs.is_empty().unwrap());
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_create_has_single_winner() {
        let fs = Arc::new(InMemoryBackend::new());
        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let fs = Arc::clone(&fs);
                thread::spawn(move || {
                    fs.create_file(&Context::background(), &VfsPath::new("/race"), &[i], None)
                })
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(VfsError::is_already_exists));
    }

    #[test]
    fn poisoned_lock_is_reported_by_inspection_helpers() {
        let fs = Arc::new(InMemoryBackend::new());
        fs.create_file(&ctx(), &VfsPath::new("/a"), b"x", None).unwrap();

        let poisoner = Arc::clone(&fs);
        let _ = thread::spawn(move || {
            let _guard = poisoner.files.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(fs.len(), Err(VfsError::LockPoisoned)));
        assert!(matches!(fs.is_empty(), Err(VfsError::LockPoisoned)));
        assert!(matches!(fs.paths(), Err(VfsError::LockPoisoned)));
        assert!(matches!(
            fs.read_file(&ctx(), &VfsPath::new("/a")),
            Err(VfsError::LockPoisoned)
        ));
    }

    #[test]
    fn debug_format() {
        let fs = InMemoryBackend::new();
        let debug = format!("{fs:?}");
        assert!(debug.contains("InMemoryBackend"));
        assert!(debug.contains("file_count"));
    }
}
