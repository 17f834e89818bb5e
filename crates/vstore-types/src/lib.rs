//! Foundation types for vstore.
//!
//! This crate provides the resource model shared by every other vstore crate.
//! A resource is a typed, named document: the store derives its storage path
//! from the resource's kind and name, and the codec stamps each document with
//! its kind and schema version so it can be read back without a type hint.
//!
//! # Key Types
//!
//! - [`Resource`] -- Trait implemented by every storable kind
//! - [`ObjectMeta`] -- Name, creation timestamp, labels and annotations
//! - [`TypeMeta`] -- The `apiVersion`/`kind` header embedded in documents
//! - [`SchemaVersion`] -- On-disk document format version
//! - [`Context`] -- Cancellation flag and deadline threaded through operations
//! - [`Widget`], [`ConfigSet`] -- Built-in resource kinds

pub mod context;
pub mod error;
pub mod kinds;
pub mod meta;
pub mod resource;
pub mod version;

pub use context::Context;
pub use error::{ContextError, TypeError};
pub use kinds::{ConfigSet, Widget, WidgetSpec};
pub use meta::{ObjectMeta, TypeMeta};
pub use resource::Resource;
pub use version::{SchemaVersion, API_GROUP};
