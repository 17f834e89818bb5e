use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;
use vstore_types::Context;

use crate::acl::Acl;
use crate::error::{VfsError, VfsResult};
use crate::path::VfsPath;
use crate::traits::StorageBackend;

/// Prefix of the staging files written next to their final destination.
/// Listings skip anything carrying it, so no stored file name may start with it.
pub const TEMP_PREFIX: &str = ".vstore-tmp-";

/// Storage backend over a directory on the local filesystem.
///
/// A [`VfsPath`] `/a/b` maps to `<root>/a/b`. Every write is staged in a
/// temporary file in the destination directory, flushed to disk, and then
/// moved into place:
///
/// - `create_file` uses a no-clobber rename, so the existence check and the
///   write are a single atomic step and a concurrent creator loses cleanly.
/// - `write_file` uses a plain rename, so readers see the old or the new
///   document, never a truncated one.
///
/// Parent directories are created on demand. [`Acl::FileMode`] is applied to
/// the staged file on Unix; canned ACLs have no local meaning and are ignored.
#[derive(Clone, Debug)]
pub struct LocalFsBackend {
    root: PathBuf,
}

impl LocalFsBackend {
    /// Create a backend rooted at `root`. The directory does not need to
    /// exist yet; it is created by the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The filesystem location of `path`.
    pub fn resolve(&self, path: &VfsPath) -> PathBuf {
        let mut full = self.root.clone();
        for component in path.components() {
            full.push(component);
        }
        full
    }

    /// Stage `data` in a temp file beside `target`, ready to be persisted.
    fn stage(
        &self,
        path: &VfsPath,
        target: &Path,
        data: &[u8],
        acl: Option<&Acl>,
    ) -> VfsResult<NamedTempFile> {
        let dir = target.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir).map_err(|e| VfsError::from_io(path, e))?;

        let mut staged = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .tempfile_in(dir)
            .map_err(|e| VfsError::from_io(path, e))?;
        staged
            .write_all(data)
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| VfsError::from_io(path, e))?;

        match acl {
            Some(Acl::FileMode(mode)) => {
                apply_mode(staged.path(), *mode).map_err(|e| VfsError::from_io(path, e))?
            }
            Some(other) => debug!(%path, acl = %other, "ignoring ACL on local filesystem"),
            None => {}
        }
        Ok(staged)
    }

    /// Move a staged file into place unless `ctx` was cancelled meanwhile.
    fn commit(
        &self,
        ctx: &Context,
        path: &VfsPath,
        target: &Path,
        staged: NamedTempFile,
        mode: Persist,
    ) -> VfsResult<()> {
        // Last chance to back out: dropping `staged` removes the temp file.
        ctx.check()?;
        let persisted = match mode {
            Persist::NoClobber => staged.persist_noclobber(target),
            Persist::Replace => staged.persist(target),
        };
        persisted
            .map(drop)
            .map_err(|e| VfsError::from_io(path, e.error))
    }
}

#[derive(Clone, Copy, Debug)]
enum Persist {
    NoClobber,
    Replace,
}

#[cfg(unix)]
fn apply_mode(file: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(file, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn apply_mode(_file: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

impl StorageBackend for LocalFsBackend {
    fn scheme(&self) -> &'static str {
        "file"
    }

    fn read_file(&self, ctx: &Context, path: &VfsPath) -> VfsResult<Vec<u8>> {
        ctx.check()?;
        fs::read(self.resolve(path)).map_err(|e| VfsError::from_io(path, e))
    }

    fn create_file(
        &self,
        ctx: &Context,
        path: &VfsPath,
        data: &[u8],
        acl: Option<&Acl>,
    ) -> VfsResult<()> {
        ctx.check()?;
        let target = self.resolve(path);
        let staged = self.stage(path, &target, data, acl)?;
        self.commit(ctx, path, &target, staged, Persist::NoClobber)?;
        debug!(%path, len = data.len(), "file create");
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
        let target = self.resolve(path);
        let staged = self.stage(path, &target, data, acl)?;
        self.commit(ctx, path, &target, staged, Persist::Replace)?;
        debug!(%path, len = data.len(), "file write");
        Ok(())
    }

    fn remove(&self, ctx: &Context, path: &VfsPath) -> VfsResult<()> {
        ctx.check()?;
        fs::remove_file(self.resolve(path)).map_err(|e| VfsError::from_io(path, e))
    }

    fn list_child_names(&self, ctx: &Context, path: &VfsPath) -> VfsResult<Vec<String>> {
        ctx.check()?;
        let entries = fs::read_dir(self.resolve(path)).map_err(|e| VfsError::from_io(path, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| VfsError::from_io(path, e))?;
            let file_type = entry.file_type().map_err(|e| VfsError::from_io(path, e))?;
            if !file_type.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if name.starts_with(TEMP_PREFIX) => {}
                Ok(name) => names.push(name),
                Err(raw) => {
                    return Err(VfsError::Io {
                        path: path.clone(),
                        source: io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!("file name {raw:?} is not valid UTF-8"),
                        ),
                    })
                }
            }
        }
        Ok(names)
    }

    fn exists(&self, ctx: &Context, path: &VfsPath) -> VfsResult<bool> {
        ctx.check()?;
        match fs::metadata(self.resolve(path)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) => match VfsError::from_io(path, e) {
                VfsError::NotFound { .. } => Ok(false),
                other => Err(other),
            },
        }
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

    fn temp_backend() -> (tempfile::TempDir, LocalFsBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalFsBackend::new(dir.path().join("state"));
        (dir, backend)
    }

    #[test]
    fn create_writes_under_root() {
        let (_dir, fs) = temp_backend();
        let p = VfsPath::new("/widgets/a");
        fs.create_file(&ctx(), &p, b"doc", None).unwrap();

        let on_disk = std::fs::read(fs.root().join("widgets").join("a")).unwrap();
        assert_eq!(on_disk, b"doc");
        assert_eq!(fs.read_file(&ctx(), &p).unwrap(), b"doc");
    }

    #[test]
    fn create_existing_fails_and_keeps_contents() {
        let (_dir, fs) = temp_backend();
        let p = VfsPath::new("/a");
        fs.create_file(&ctx(), &p, b"first", None).unwrap();
        let err = fs.create_file(&ctx(), &p, b"second", None).unwrap_err();
        assert!(err.is_already_exists(), "got {err}");
        assert_eq!(fs.read_file(&ctx(), &p).unwrap(), b"first");
    }

    #[test]
    fn failed_create_leaves_no_staging_file() {
        let (_dir, fs) = temp_backend();
        let p = VfsPath::new("/w/a");
        fs.create_file(&ctx(), &p, b"first", None).unwrap();
        let _ = fs.create_file(&ctx(), &p, b"second", None);

        let entries: Vec<_> = std::fs::read_dir(fs.root().join("w"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn write_replaces() {
        let (_dir, fs) = temp_backend();
        let p = VfsPath::new("/a");
        fs.write_file(&ctx(), &p, b"one", None).unwrap();
        fs.write_file(&ctx(), &p, b"two", None).unwrap();
        assert_eq!(fs.read_file(&ctx(), &p).unwrap(), b"two");
    }

    #[test]
    fn read_and_remove_missing_are_not_found() {
        let (_dir, fs) = temp_backend();
        let p = VfsPath::new("/missing");
        assert!(fs.read_file(&ctx(), &p).unwrap_err().is_not_found());
        assert!(fs.remove(&ctx(), &p).unwrap_err().is_not_found());
        assert!(!fs.exists(&ctx(), &p).unwrap());
    }

    #[test]
    fn list_skips_dirs_and_staging_files() {
        let (_dir, fs) = temp_backend();
        fs.create_file(&ctx(), &VfsPath::new("/w/b"), b"x", None).unwrap();
        fs.create_file(&ctx(), &VfsPath::new("/w/a"), b"x", None).unwrap();
        fs.create_file(&ctx(), &VfsPath::new("/w/sub/c"), b"x", None).unwrap();
        std::fs::write(fs.root().join("w").join(".vstore-tmp-abc"), b"partial").unwrap();

        let mut names = fs.list_child_names(&ctx(), &VfsPath::new("/w")).unwrap();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn list_missing_dir_is_not_found() {
        let (_dir, fs) = temp_backend();
        let err = fs.list_child_names(&ctx(), &VfsPath::new("/w")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[cfg(unix)]
    #[test]
    fn file_mode_acl_is_applied() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, fs) = temp_backend();
        let p = VfsPath::new("/secret");
        fs.create_file(&ctx(), &p, b"x", Some(&Acl::FileMode(0o600))).unwrap();
        let mode = std::fs::metadata(fs.resolve(&p)).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn cancelled_context_writes_nothing() {
        let (_dir, fs) = temp_backend();
        let ctx = Context::background();
        ctx.cancel();
        let err = fs.write_file(&ctx, &VfsPath::new("/a"), b"x", None).unwrap_err();
        assert!(err.is_cancelled());
        assert!(!fs.root().exists());
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn cancel_after_staging_discards_the_staged_file() {
        let (_dir, fs) = temp_backend();
        let p = VfsPath::new("/w/a");
        let target = fs.resolve(&p);

        for mode in [Persist::NoClobber, Persist::Replace] {
            let ctx = Context::background();
            let staged = fs.stage(&p, &target, b"doc", None).unwrap();
            assert_eq!(dir_entries(&fs.root().join("w")).len(), 1);

            ctx.cancel();
            let err = fs.commit(&ctx, &p, &target, staged, mode).unwrap_err();
            assert!(err.is_cancelled(), "got {err}");
            assert!(!target.exists());
            assert!(dir_entries(&fs.root().join("w")).is_empty());
        }
    }

    #[test]
    fn cancel_after_staging_keeps_previous_contents() {
        let (_dir, fs) = temp_backend();
        let p = VfsPath::new("/a");
        fs.write_file(&ctx(), &p, b"old", None).unwrap();

        let cancelled = Context::background();
        let target = fs.resolve(&p);
        let staged = fs.stage(&p, &target, b"new", None).unwrap();
        cancelled.cancel();
        assert!(fs
            .commit(&cancelled, &p, &target, staged, Persist::Replace)
            .unwrap_err()
            .is_cancelled());
        assert_eq!(fs.read_file(&ctx(), &p).unwrap(), b"old");
        assert_eq!(dir_entries(fs.root()), vec!["a"]);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_file_name_fails_listing() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let (_dir, fs) = temp_backend();
        fs.create_file(&ctx(), &VfsPath::new("/w/a"), b"x", None).unwrap();
        std::fs::write(fs.root().join("w").join(OsStr::from_bytes(b"bad\xff")), b"x").unwrap();

        let err = fs.list_child_names(&ctx(), &VfsPath::new("/w")).unwrap_err();
        assert!(matches!(err, VfsError::Io { .. }), "got {err}");
    }

    #[test]
    fn concurrent_create_has_single_winner() {
        let (_dir, fs) = temp_backend();
        let fs = Arc::new(fs);
        let p = VfsPath::new("/race/doc");

        let handles: Vec<_> = (0..8u8)
            .map(|i| {
                let fs = Arc::clone(&fs);
                let p = p.clone();
                thread::spawn(move || {
                    let body = vec![i; 4096];
                    fs.create_file(&Context::background(), &p, &body, None)
                        .map(|_| body)
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(winners.len(), 1);
        for r in &results {
            if let Err(e) = r {
                assert!(e.is_already_exists(), "unexpected error: {e}");
            }
        }
        // The surviving document is complete and belongs to the winner.
        assert_eq!(&fs.read_file(&ctx(), &p).unwrap(), winners[0]);
    }
}
