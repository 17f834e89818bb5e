use tracing::debug;
use vstore_types::Context;
use vstore_vfs::{Acl, VfsPath};

use crate::error::AclResult;
use crate::owner::Owner;
use crate::strategies::{CannedAclStrategy, FileModeStrategy};

// ---------------------------------------------------------------------------
// AclResolver trait
// ---------------------------------------------------------------------------

/// Computes the ACL to attach to a write.
///
/// `scheme` is the backend's [`scheme`](vstore_vfs::StorageBackend::scheme),
/// so one resolver can serve stores on different backends. Returning
/// `Ok(None)` means "write with the backend's default permissions".
pub trait AclResolver: Send + Sync {
    fn resolve(
        &self,
        ctx: &Context,
        scheme: &str,
        path: &VfsPath,
        owner: &Owner,
    ) -> AclResult<Option<Acl>>;
}

/// A resolver that never attaches an ACL.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAcl;

impl AclResolver for NoAcl {
    fn resolve(&self, ctx: &Context, _: &str, _: &VfsPath, _: &Owner) -> AclResult<Option<Acl>> {
        ctx.check()?;
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// AclStrategy trait
// ---------------------------------------------------------------------------

/// One link in a [`StrategyResolver`] chain.
///
/// A strategy returns `Ok(None)` when it has no opinion about a write, which
/// passes the decision to the next strategy.
pub trait AclStrategy: Send + Sync {
    /// Human-readable name of this strategy, used in logs and errors.
    fn name(&self) -> &str;

    fn acl_for(&self, scheme: &str, path: &VfsPath, owner: &Owner) -> AclResult<Option<Acl>>;
}

// ---------------------------------------------------------------------------
// StrategyResolver
// ---------------------------------------------------------------------------

/// An ordered chain of strategies.
///
/// Strategies are consulted in insertion order. The first `Some` wins; the
/// first error aborts resolution. If no strategy has an opinion the result
/// is `None`.
#[derive(Default)]
pub struct StrategyResolver {
    strategies: Vec<Box<dyn AclStrategy>>,
}

impl StrategyResolver {
    /// An empty chain. Resolves everything to `None` until strategies are
    /// added.
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    /// The standard chain: [`FileModeStrategy`] then [`CannedAclStrategy`].
    pub fn with_default_strategies() -> Self {
        let mut resolver = Self::new();
        resolver.add_strategy(Box::new(FileModeStrategy::default()));
        resolver.add_strategy(Box::new(CannedAclStrategy::default()));
        resolver
    }

    /// Append a strategy to the end of the chain.
    pub fn add_strategy(&mut self, strategy: Box<dyn AclStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }
}

impl std::fmt::Debug for StrategyResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.strategies.iter().map(|s| s.name()))
            .finish()
    }
}

impl AclResolver for StrategyResolver {
    fn resolve(
        &self,
        ctx: &Context,
        scheme: &str,
        path: &VfsPath,
        owner: &Owner,
    ) -> AclResult<Option<Acl>> {
        ctx.check()?;
        for strategy in &self.strategies {
            if let Some(acl) = strategy.acl_for(scheme, path, owner)? {
                debug!(strategy = strategy.name(), %path, %acl, "resolved acl");
                return Ok(Some(acl));
            }
        }
        Ok(None)
    }
}
