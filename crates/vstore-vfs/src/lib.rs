//! Path-addressed byte storage for vstore.
//!
//! This crate is the lowest layer of the store: a hierarchical namespace of
//! opaque byte files. Backends never interpret file contents; the object
//! store above them owns the document format.
//!
//! # Backends
//!
//! All backends implement the [`StorageBackend`] trait:
//!
//! - [`InMemoryBackend`] -- `BTreeMap`-based store for tests and embedding
//! - [`LocalFsBackend`] -- files under a root directory on local disk
//!
//! [`VfsContext`] turns a location string (`memfs://...`, `file://...`, or a
//! plain directory) into a backend plus a base [`VfsPath`].
//!
//! # Design Rules
//!
//! 1. Absence is signalled with [`VfsError::NotFound`], never with empty data.
//! 2. `create_file` is atomic: exactly one concurrent creator wins, the
//!    others get [`VfsError::AlreadyExists`].
//! 3. Readers never observe a partially written file.
//! 4. Every operation checks its [`vstore_types::Context`] before doing I/O.
//! 5. All I/O errors are propagated with the path they concern.

pub mod acl;
pub mod context;
pub mod error;
pub mod local;
pub mod memory;
pub mod path;
pub mod traits;

pub use acl::Acl;
pub use context::{StoreRoot, VfsContext};
pub use error::{VfsError, VfsResult};
pub use local::{LocalFsBackend, TEMP_PREFIX};
pub use memory::InMemoryBackend;
pub use path::VfsPath;
pub use traits::StorageBackend;
