use vstore_types::Context;

use crate::acl::Acl;
use crate::error::{VfsError, VfsResult};
use crate::path::VfsPath;

/// Hierarchical, path-addressed byte storage.
///
/// All implementations must satisfy these invariants:
/// - Absence is reported as [`VfsError::NotFound`].
/// - `create_file` is atomic with respect to other creators of the same path:
///   exactly one succeeds, the rest fail with [`VfsError::AlreadyExists`].
/// - A reader sees either the previous contents or the new contents of a
///   file, never a mix and never a truncated file.
/// - Each call checks `ctx` before starting I/O and fails with
///   [`VfsError::Cancelled`] once the context is done.
/// - The backend never interprets file contents.
pub trait StorageBackend: Send + Sync {
    /// Short scheme name for the backend (`memfs`, `file`, ...).
    fn scheme(&self) -> &'static str;

    /// Read a whole file.
    fn read_file(&self, ctx: &Context, path: &VfsPath) -> VfsResult<Vec<u8>>;

    /// Create a file that must not already exist.
    fn create_file(
        &self,
        ctx: &Context,
        path: &VfsPath,
        data: &[u8],
        acl: Option<&Acl>,
    ) -> VfsResult<()>;

    /// Create or replace a file.
    fn write_file(
        &self,
        ctx: &Context,
        path: &VfsPath,
        data: &[u8],
        acl: Option<&Acl>,
    ) -> VfsResult<()>;

    /// Remove a file. Fails with [`VfsError::NotFound`] if it is absent.
    fn remove(&self, ctx: &Context, path: &VfsPath) -> VfsResult<()>;

    /// Names of the files directly under the directory `path`.
    ///
    /// Subdirectories are not included. The order is unspecified. Fails with
    /// [`VfsError::NotFound`] if the directory does not exist.
    fn list_child_names(&self, ctx: &Context, path: &VfsPath) -> VfsResult<Vec<String>>;

    /// Check whether a file exists.
    ///
    /// Default implementation reads the file. Backends may override with a
    /// cheaper metadata lookup.
    fn exists(&self, ctx: &Context, path: &VfsPath) -> VfsResult<bool> {
        match self.read_file(ctx, path) {
            Ok(_) => Ok(true),
            Err(VfsError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
