//! Generic versioned object store for vstore.
//!
//! A [`ClientBase`] stores one kind of [`Resource`](vstore_types::Resource)
//! as a flat directory of encoded documents on a
//! [`StorageBackend`](vstore_vfs::StorageBackend): one file per resource,
//! named after the resource. There are no index files; listing is directory
//! enumeration.
//!
//! # Failure semantics
//!
//! | Operation | Not found                   | Already exists        |
//! |-----------|-----------------------------|-----------------------|
//! | `find`    | `Ok(None)`                  |                       |
//! | `list`    | `ListedButNotFound`         |                       |
//! | `create`  |                             | `AlreadyExists`       |
//! | `update`  | `PreconditionFailed`        |                       |
//! | `delete`  | `Ok(())`                    |                       |
//!
//! Backend faults are always wrapped in [`StoreError::Io`] with the kind and
//! path. Nothing is retried.

pub mod base;
pub mod config;
pub mod error;
pub mod names;
pub mod typed;

pub use base::{ClientBase, Validator};
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult, ValidationError};
pub use names::validate_name;
pub use typed::{validate_widget, Clientset, TypedClient, MAX_WIDGET_REPLICAS};
