//! A repository: the ordered list of revision roots, indexed by
//! revision number.

use crate::branch::BranchId;
use crate::eid::{Eid, Revnum, NO_EID};
use crate::error::{EbbError, Result};
use crate::revision::RevisionRoot;

/// An El-Rev Identifier: a revision number plus a `(branch, eid)` pair
/// locating one element within that revision's root branch tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElRev {
    pub rev: Revnum,
    pub branch: BranchId,
    pub eid: Eid,
}

/// The ordered sequence of revision roots. Revision 0 is always the
/// bootstrap snapshot; later revisions are appended by the caller as
/// they are committed.
#[derive(Debug, Clone)]
pub struct Repository {
    revisions: Vec<RevisionRoot>,
}

impl Repository {
    /// A fresh repository containing only the bootstrap revision 0.
    pub fn new() -> Self {
        Repository {
            revisions: vec![RevisionRoot::bootstrap()],
        }
    }

    /// Append a new revision root, returning its revision number.
    pub fn push_revision(&mut self, root: RevisionRoot) -> Revnum {
        self.revisions.push(root);
        (self.revisions.len() - 1) as Revnum
    }

    pub fn revision(&self, rev: Revnum) -> Result<&RevisionRoot> {
        self.index_of(rev).map(|i| &self.revisions[i])
    }

    pub fn revision_mut(&mut self, rev: Revnum) -> Result<&mut RevisionRoot> {
        let i = self.index_of(rev)?;
        Ok(&mut self.revisions[i])
    }

    pub fn youngest_revision(&self) -> Revnum {
        (self.revisions.len() - 1) as Revnum
    }

    fn index_of(&self, rev: Revnum) -> Result<usize> {
        if rev < 0 || rev as usize >= self.revisions.len() {
            return Err(EbbError::NoSuchRevision(rev));
        }
        Ok(rev as usize)
    }

    /// Resolve an absolute repository-root-relative path at `rev` to an
    /// El-Rev Identifier, descending into whatever (possibly nested)
    /// branch actually contains it.
    pub fn find_el_rev_by_path_rev(&self, rrpath: &str, rev: Revnum) -> Result<ElRev> {
        let root = self.revision(rev)?;
        let (branch, eid) = root
            .find_nested_branch_element_by_rrpath(root.root_branch, rrpath)
            .unwrap_or((root.root_branch, NO_EID));
        Ok(ElRev { rev, branch, eid })
    }
}

impl Default for Repository {
    fn default() -> Self {
        Repository::new()
    }
}
