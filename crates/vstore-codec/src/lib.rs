//! Versioned document codec for vstore.
//!
//! Documents are JSON objects that describe themselves: every document
//! starts with an `apiVersion` (`vstore.dev/<version>`) and a `kind`, followed
//! by the resource fields. Decoding reads that header to find out which kind
//! and schema version it is looking at, so callers never pass a version hint.
//!
//! - [`Scheme`] -- registry of kinds, their in-memory (hub) version, and the
//!   conversions to and from older versions
//! - [`CodecFactory`] -- picks a serializer by media type, builds
//!   [`Encoder`]s, and decodes documents
//! - [`Encoder`] -- writes every document at one fixed schema version

pub mod error;
pub mod factory;
pub mod scheme;

pub use error::{CodecError, CodecResult};
pub use factory::{CodecFactory, Encoder, SerializerInfo, MEDIA_TYPE_JSON};
pub use scheme::{ConvertFn, KindRegistration, Scheme, VersionConversion};
