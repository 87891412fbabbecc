//! An in-memory model of a version-control repository's element-identity
//! layer: revisions, branches, elements addressed by a stable identifier
//! (EID) rather than by path, and the moves, copies, and nested branches
//! built on top of that identity.
//!
//! This crate models identity and structure only. It does not persist
//! anything beyond the text codec in [`codec`], does not authorize
//! access, does not transport anything over a network, does not detect
//! concurrent-edit conflicts, and does not diff or merge beyond the
//! subtree copy/branch operations in [`subtree`]. Those concerns belong
//! to callers; see [`AuthzPredicate`] and [`ContentStore`] for the
//! shape this crate expects a caller's collaborators to take.

pub mod branch;
pub mod codec;
pub mod content;
pub mod eid;
pub mod error;
pub mod map;
pub mod node;
pub mod repository;
pub mod revision;
pub mod subtree;

pub use branch::{BranchId, BranchInstance};
pub use content::{ElementContent, NodeKind};
pub use eid::{Eid, Revnum, NO_EID};
pub use error::{EbbError, Result};
pub use node::ElementNode;
pub use repository::{ElRev, Repository};
pub use revision::RevisionRoot;
pub use subtree::Subtree;

/// A caller-supplied visibility filter: does `root_rrpath` permit seeing
/// `rrpath`? This crate exposes EIDs and repository-root-relative paths
/// suitable for such filtering but never constructs or calls an
/// implementation of this trait itself — authorization is a consumer
/// concern, not a structural one.
pub trait AuthzPredicate {
    fn permits(&self, root_rrpath: &str, rrpath: &str) -> bool;
}

/// A caller-supplied mapping from `(rev, rrpath)` to the content bytes
/// an [`ElementContent::Reference`] points at. This crate holds
/// references opaquely and never dereferences them through this trait
/// itself.
pub trait ContentStore {
    type Error;
    fn read(&self, rev: Revnum, rrpath: &str) -> std::result::Result<Vec<u8>, Self::Error>;
}
