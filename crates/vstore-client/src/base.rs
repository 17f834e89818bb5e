use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use vstore_acl::{AclResolver, Owner, StrategyResolver};
use vstore_codec::{CodecFactory, Encoder};
use vstore_types::{Context, Resource, SchemaVersion};
use vstore_vfs::{StorageBackend, VfsError, VfsPath};

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult, ValidationError};
use crate::names::validate_name;

/// Checks a resource before it is written.
pub type Validator<T> = Arc<dyn Fn(&T) -> Result<(), ValidationError> + Send + Sync>;

/// Kind-agnostic CRUD over one directory of a [`StorageBackend`].
///
/// Each resource is stored as one encoded document at `<base_path>/<name>`.
/// The handle holds no resource state: its kind, base path, and encoder are
/// fixed at construction, and it can be shared between threads freely.
///
/// The store does no locking of its own. `create` relies on the backend's
/// exclusive create, so of two concurrent creators exactly one wins; `update`
/// probes for the old document first and races with a concurrent `delete`.
pub struct ClientBase<T: Resource> {
    kind: String,
    backend: Arc<dyn StorageBackend>,
    base_path: VfsPath,
    factory: CodecFactory,
    encoder: Encoder,
    acl: Arc<dyn AclResolver>,
    validator: Option<Validator<T>>,
    _resource: PhantomData<fn() -> T>,
}

impl<T: Resource> ClientBase<T> {
    /// Build a handle with the built-in codec registry.
    ///
    /// Fails with [`StoreError::Configuration`] if `config.media_type` has
    /// no serializer or `version` is not a registered version of `T`.
    pub fn new(
        kind: impl Into<String>,
        backend: Arc<dyn StorageBackend>,
        base_path: VfsPath,
        version: SchemaVersion,
        config: &StoreConfig,
    ) -> StoreResult<Self> {
        Self::with_factory(kind, backend, base_path, version, config, CodecFactory::default())
    }

    /// Build a handle that encodes and decodes through `factory`.
    pub fn with_factory(
        kind: impl Into<String>,
        backend: Arc<dyn StorageBackend>,
        base_path: VfsPath,
        version: SchemaVersion,
        config: &StoreConfig,
        factory: CodecFactory,
    ) -> StoreResult<Self> {
        let kind = kind.into();
        let mut serializer = factory
            .serializer_for_media_type(&config.media_type)
            .ok_or_else(|| {
                StoreError::Configuration(format!(
                    "no serializer for media type {:?} (supported: {})",
                    config.media_type,
                    factory.supported_media_types().join(", ")
                ))
            })?;
        if config.pretty {
            serializer = serializer.pretty();
        }
        if !factory.scheme().recognizes(T::KIND, &version) {
            return Err(StoreError::Configuration(format!(
                "{} has no registered schema version {version}",
                T::KIND
            )));
        }
        let encoder = factory.encoder_for_version(serializer, version);

        Ok(Self {
            kind,
            backend,
            base_path,
            factory,
            encoder,
            acl: Arc::new(StrategyResolver::with_default_strategies()),
            validator: None,
            _resource: PhantomData,
        })
    }

    /// Run `validator` on every create and update before anything is written.
    pub fn with_validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&T) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Replace the default ACL resolver.
    pub fn with_acl_resolver(mut self, acl: Arc<dyn AclResolver>) -> Self {
        self.acl = acl;
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn base_path(&self) -> &VfsPath {
        &self.base_path
    }

    /// The schema version every write is encoded at.
    pub fn version(&self) -> &SchemaVersion {
        self.encoder.version()
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Where the resource called `name` is stored.
    pub fn path_for(&self, name: &str) -> StoreResult<VfsPath> {
        validate_name(name)?;
        Ok(self.base_path.join(name))
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Read one resource. A missing resource is `Ok(None)`, not an error.
    pub fn find(&self, ctx: &Context, name: &str) -> StoreResult<Option<T>> {
        let path = self.path_for(name)?;
        let data = match self.backend.read_file(ctx, &path) {
            Ok(data) => data,
            Err(VfsError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.kind, &path, e)),
        };
        let (object, version) =
            self.factory
                .decode::<T>(&data)
                .map_err(|source| StoreError::Decode {
                    kind: self.kind.clone(),
                    path: path.clone(),
                    source,
                })?;
        debug!(kind = %self.kind, %path, %version, "read resource");
        Ok(Some(object))
    }

    /// Names of every stored resource, sorted ascending.
    ///
    /// A base directory that does not exist yet holds no resources.
    pub fn list_names(&self, ctx: &Context) -> StoreResult<Vec<String>> {
        let mut names = match self.backend.list_child_names(ctx, &self.base_path) {
            Ok(names) => names,
            Err(VfsError::NotFound { .. }) => Vec::new(),
            Err(e) => return Err(StoreError::io(&self.kind, &self.base_path, e)),
        };
        names.sort();
        Ok(names)
    }

    /// Read every stored resource into `out`, in ascending name order.
    ///
    /// Listing and reading are separate steps. If a listed resource is gone
    /// by the time it is read, the call fails with
    /// [`StoreError::ListedButNotFound`]; `out` may already hold the
    /// resources read before it.
    pub fn list_into<C: Extend<T>>(&self, ctx: &Context, out: &mut C) -> StoreResult<()> {
        for name in self.list_names(ctx)? {
            match self.find(ctx, &name)? {
                Some(object) => out.extend(Some(object)),
                None => {
                    return Err(StoreError::ListedButNotFound {
                        kind: self.kind.clone(),
                        name,
                    })
                }
            }
        }
        Ok(())
    }

    /// Read every stored resource, in ascending name order.
    pub fn list(&self, ctx: &Context) -> StoreResult<Vec<T>> {
        let mut items = Vec::new();
        self.list_into(ctx, &mut items)?;
        Ok(items)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Store a new resource. Fails with [`StoreError::AlreadyExists`] if one
    /// with the same name is already stored, leaving it untouched.
    ///
    /// Returns the resource as stored, with its creation timestamp set.
    pub fn create(&self, ctx: &Context, owner: &Owner, resource: &T) -> StoreResult<T> {
        let (path, stored, data) = self.prepare(resource)?;
        let acl = self
            .acl
            .resolve(ctx, self.backend.scheme(), &path, owner)
            .map_err(|e| StoreError::acl(&path, e))?;

        match self.backend.create_file(ctx, &path, &data, acl.as_ref()) {
            Ok(()) => {
                debug!(kind = %self.kind, %path, version = %self.version(), "created resource");
                Ok(stored)
            }
            Err(VfsError::AlreadyExists { .. }) => {
                warn!(kind = %self.kind, %path, "create found an existing resource");
                Err(StoreError::AlreadyExists { path })
            }
            Err(e) => Err(StoreError::io(&self.kind, &path, e)),
        }
    }

    /// Replace a stored resource. Fails with
    /// [`StoreError::PreconditionFailed`] if none exists, writing nothing.
    ///
    /// A resource stored without a creation timestamp gets one now.
    pub fn update(&self, ctx: &Context, owner: &Owner, resource: &T) -> StoreResult<T> {
        let (path, stored, data) = self.prepare(resource)?;

        let exists = self
            .backend
            .exists(ctx, &path)
            .map_err(|e| StoreError::io(&self.kind, &path, e))?;
        if !exists {
            return Err(StoreError::PreconditionFailed { path });
        }

        let acl = self
            .acl
            .resolve(ctx, self.backend.scheme(), &path, owner)
            .map_err(|e| StoreError::acl(&path, e))?;
        self.backend
            .write_file(ctx, &path, &data, acl.as_ref())
            .map_err(|e| StoreError::io(&self.kind, &path, e))?;
        debug!(kind = %self.kind, %path, version = %self.version(), "updated resource");
        Ok(stored)
    }

    /// Remove a resource. Removing one that is not stored succeeds.
    pub fn delete(&self, ctx: &Context, name: &str) -> StoreResult<()> {
        let path = self.path_for(name)?;
        match self.backend.remove(ctx, &path) {
            Ok(()) => {
                debug!(kind = %self.kind, %path, "deleted resource");
                Ok(())
            }
            Err(VfsError::NotFound { .. }) => {
                debug!(kind = %self.kind, %path, "delete of absent resource");
                Ok(())
            }
            Err(e) => Err(StoreError::io(&self.kind, &path, e)),
        }
    }

    /// Validate, timestamp, and encode a resource for writing.
    fn prepare(&self, resource: &T) -> StoreResult<(VfsPath, T, Vec<u8>)> {
        let name = resource.name();
        let path = self.path_for(name)?;

        if let Some(validator) = &self.validator {
            validator(resource).map_err(|source| StoreError::Validation {
                kind: self.kind.clone(),
                name: name.to_string(),
                source,
            })?;
        }

        let mut stored = resource.clone();
        stored.metadata_mut().stamp_creation(Utc::now());

        let data = self
            .encoder
            .encode(&stored)
            .map_err(|source| StoreError::Encode {
                kind: self.kind.clone(),
                name: name.to_string(),
                source,
            })?;
        Ok((path, stored, data))
    }
}

impl<T: Resource> Clone for ClientBase<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            backend: Arc::clone(&self.backend),
            base_path: self.base_path.clone(),
            factory: self.factory.clone(),
            encoder: self.encoder.clone(),
            acl: Arc::clone(&self.acl),
            validator: self.validator.clone(),
            _resource: PhantomData,
        }
    }
}

impl<T: Resource> fmt::Debug for ClientBase<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBase")
            .field("kind", &self.kind)
            .field("scheme", &self.backend.scheme())
            .field("base_path", &self.base_path)
            .field("version", self.encoder.version())
            .field("validator", &self.validator.is_some())
            .finish()
    }
}
