use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::meta::ObjectMeta;

/// A storable, named, versioned document type.
///
/// Implementors serialize to their in-memory (hub) schema version; the codec
/// is responsible for converting to and from older on-disk versions and for
/// adding the `apiVersion`/`kind` header.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The kind tag written into every document of this type.
    const KIND: &'static str;

    /// Shared object metadata.
    fn metadata(&self) -> &ObjectMeta;

    /// Mutable access to the shared object metadata.
    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    /// The resource name.
    fn name(&self) -> &str {
        &self.metadata().name
    }
}
