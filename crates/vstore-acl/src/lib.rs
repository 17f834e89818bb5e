//! Access-control resolution for vstore.
//!
//! Every write to the store carries an ACL computed from three inputs: the
//! backend scheme, the destination path, and the [`Owner`] on whose behalf
//! the write happens. Resolution runs before each write and is fail-closed:
//! if the resolver errors, nothing is written.
//!
//! The standard resolver is a [`StrategyResolver`]: an ordered chain of
//! [`AclStrategy`] implementations where the first one with an opinion
//! decides.

pub mod error;
pub mod owner;
pub mod resolver;
pub mod strategies;

pub use error::{AclError, AclResult};
pub use owner::{Owner, CANNED_ACL_ANNOTATION};
pub use resolver::{AclResolver, AclStrategy, NoAcl, StrategyResolver};
pub use strategies::{CannedAclStrategy, FileModeStrategy, KNOWN_CANNED_ACLS};
pub use vstore_vfs::Acl;
