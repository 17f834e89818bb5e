//! Per-kind facades over [`ClientBase`].

use std::sync::Arc;

use vstore_acl::Owner;
use vstore_types::{ConfigSet, Context, Resource, SchemaVersion, Widget};
use vstore_vfs::{StorageBackend, VfsPath};

use crate::base::ClientBase;
use crate::config::StoreConfig;
use crate::error::{StoreResult, ValidationError};

/// Most replicas a [`Widget`] may ask for.
pub const MAX_WIDGET_REPLICAS: u32 = 1000;

/// A [`ClientBase`] bound to the owner that writes through it.
#[derive(Clone, Debug)]
pub struct TypedClient<T: Resource> {
    base: ClientBase<T>,
    owner: Owner,
}

impl<T: Resource> TypedClient<T> {
    pub fn new(base: ClientBase<T>, owner: Owner) -> Self {
        Self { base, owner }
    }

    /// The underlying generic store.
    pub fn base(&self) -> &ClientBase<T> {
        &self.base
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn get(&self, ctx: &Context, name: &str) -> StoreResult<Option<T>> {
        self.base.find(ctx, name)
    }

    pub fn list(&self, ctx: &Context) -> StoreResult<Vec<T>> {
        self.base.list(ctx)
    }

    pub fn list_names(&self, ctx: &Context) -> StoreResult<Vec<String>> {
        self.base.list_names(ctx)
    }

    pub fn create(&self, ctx: &Context, resource: &T) -> StoreResult<T> {
        self.base.create(ctx, &self.owner, resource)
    }

    pub fn update(&self, ctx: &Context, resource: &T) -> StoreResult<T> {
        self.base.update(ctx, &self.owner, resource)
    }

    pub fn delete(&self, ctx: &Context, name: &str) -> StoreResult<()> {
        self.base.delete(ctx, name)
    }
}

/// Reject widgets that cannot be deployed.
pub fn validate_widget(widget: &Widget) -> Result<(), ValidationError> {
    if widget.spec.image.trim().is_empty() {
        return Err(ValidationError::new("spec.image must not be empty"));
    }
    if widget.spec.replicas > MAX_WIDGET_REPLICAS {
        return Err(ValidationError::new(format!(
            "spec.replicas must be at most {MAX_WIDGET_REPLICAS}, got {}",
            widget.spec.replicas
        )));
    }
    Ok(())
}

/// Clients for every built-in kind under one state root.
///
/// Each kind gets its own directory: widgets live in `<root>/widgets`,
/// config sets in `<root>/configsets`.
#[derive(Clone, Debug)]
pub struct Clientset {
    widgets: TypedClient<Widget>,
    config_sets: TypedClient<ConfigSet>,
}

impl Clientset {
    /// Build clients writing the current schema version on behalf of a
    /// default owner.
    pub fn new(backend: Arc<dyn StorageBackend>, root: VfsPath, config: &StoreConfig) -> StoreResult<Self> {
        Self::with_owner(backend, root, config, Owner::default())
    }

    pub fn with_owner(
        backend: Arc<dyn StorageBackend>,
        root: VfsPath,
        config: &StoreConfig,
        owner: Owner,
    ) -> StoreResult<Self> {
        let widgets = ClientBase::new(
            "Widget",
            Arc::clone(&backend),
            root.join("widgets"),
            SchemaVersion::V1ALPHA2,
            config,
        )?
        .with_validator(validate_widget);
        let config_sets = ClientBase::new(
            "ConfigSet",
            backend,
            root.join("configsets"),
            SchemaVersion::V1ALPHA2,
            config,
        )?;

        Ok(Self {
            widgets: TypedClient::new(widgets, owner.clone()),
            config_sets: TypedClient::new(config_sets, owner),
        })
    }

    pub fn widgets(&self) -> &TypedClient<Widget> {
        &self.widgets
    }

    pub fn config_sets(&self) -> &TypedClient<ConfigSet> {
        &self.config_sets
    }
}
