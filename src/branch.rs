//! A single branch: an element map, a root EID, and optional outer
//! (parent-branch) linkage.

use std::collections::HashMap;

use crate::eid::Eid;
use crate::node::ElementNode;
use crate::revision::RevisionRoot;

/// An index into a `RevisionRoot`'s flat list of branch instance slots.
///
/// Branches reference each other only through this handle — never
/// through a direct Rust reference — which is how this model avoids a
/// true ownership cycle between an outer branch and the inner branches
/// mounted on it (spec §9).
pub type BranchId = usize;

/// One branch: a tree of elements identified by EID, plus a pointer to
/// where (if anywhere) this branch is mounted in an outer branch.
#[derive(Debug, Clone)]
pub struct BranchInstance {
    pub root_eid: Eid,
    /// `(outer_branch, outer_eid)`, or `None` for the revision's
    /// top-level branch. The two travel together as a single `Option`
    /// pair (rather than an EID field that is independently `NO_EID`)
    /// so "no outer branch" cannot be represented inconsistently.
    pub outer: Option<(BranchId, Eid)>,
    pub(crate) e_map: HashMap<Eid, ElementNode>,
}

impl BranchInstance {
    pub(crate) fn new(root_eid: Eid, outer: Option<(BranchId, Eid)>) -> Self {
        BranchInstance {
            root_eid,
            outer,
            e_map: HashMap::new(),
        }
    }

    /// Is this the revision's top-level branch (no outer branch)?
    pub fn is_top_level(&self) -> bool {
        self.outer.is_none()
    }

    /// Number of elements currently mapped (including orphans not yet
    /// purged).
    pub fn len(&self) -> usize {
        self.e_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.e_map.is_empty()
    }
}

impl RevisionRoot {
    /// Create a new, empty branch instance nested inside `outer_branch`
    /// at `outer_eid`, and register it in this revision's branch list.
    ///
    /// The outer branch must have (or will have) a node at `outer_eid`
    /// with absent content, marking it as this branch's mount point.
    pub fn add_new_branch_instance(
        &mut self,
        outer_branch: BranchId,
        outer_eid: Eid,
        root_eid: Eid,
    ) -> BranchId {
        let branch = BranchInstance::new(root_eid, Some((outer_branch, outer_eid)));
        self.branches.push(Some(branch));
        self.branches.len() - 1
    }

    /// The branch-instance identifier (BID) of `b`: `^` for the
    /// top-level branch, or `^` followed by a dot-prefixed chain of
    /// outer EIDs from the root branch down to `b`'s immediate outer
    /// branch (spec §4.7/§4.8), e.g. `^.5.12`.
    pub fn branch_instance_id(&self, b: BranchId) -> String {
        let mut outer_eids = Vec::new();
        let mut cur = b;
        while let Some((outer_branch, outer_eid)) = self.branch_instance(cur).outer {
            outer_eids.push(outer_eid);
            cur = outer_branch;
        }
        outer_eids.reverse();
        let mut id = String::from("^");
        for eid in outer_eids {
            id.push('.');
            id.push_str(&eid.to_string());
        }
        id
    }

    /// All live branches in this revision whose `outer` points directly
    /// at `branch` (regardless of which EID they are mounted at).
    pub fn get_all_sub_branches(&self, branch: BranchId) -> Vec<BranchId> {
        self.branch_instances()
            .filter(|(_, b)| matches!(b.outer, Some((outer, _)) if outer == branch))
            .map(|(id, _)| id)
            .collect()
    }

    /// The immediate sub-branch of `branch` mounted at `eid`, if any.
    pub fn get_subbranch_at_eid(&self, branch: BranchId, eid: Eid) -> Option<BranchId> {
        self.get_all_sub_branches(branch)
            .into_iter()
            .find(|&sub| self.branch_instance(sub).outer == Some((branch, eid)))
    }

    /// The sub-branches of `branch` whose mount point lies at or below
    /// `eid`'s subtree (i.e. at `eid` itself or a descendant of it).
    pub fn get_subbranches(&self, branch: BranchId, eid: Eid) -> Vec<BranchId> {
        let top_rrpath = match self.rrpath_by_eid(branch, eid) {
            Some(p) => p,
            None => return Vec::new(),
        };
        self.get_all_sub_branches(branch)
            .into_iter()
            .filter(|&sub| {
                let (_, mount_eid) = self.branch_instance(sub).outer.expect("sub-branch has an outer");
                match self.rrpath_by_eid(branch, mount_eid) {
                    Some(sub_rrpath) => is_rrpath_at_or_below(&top_rrpath, &sub_rrpath),
                    None => false,
                }
            })
            .collect()
    }

    /// Remove `branch` and every branch nested (transitively) inside
    /// it from this revision, post-order (children before parents).
    ///
    /// Deleted branch ids are tombstoned, not reused or renumbered —
    /// every other live `BranchId` keeps the same meaning afterwards.
    pub fn delete_branch_instance_recursive(&mut self, branch: BranchId) {
        for sub in self.get_all_sub_branches(branch) {
            self.delete_branch_instance_recursive(sub);
        }
        self.branches[branch] = None;
    }
}

fn is_rrpath_at_or_below(ancestor: &str, candidate: &str) -> bool {
    if ancestor.is_empty() {
        return true;
    }
    candidate == ancestor || candidate.starts_with(&format!("{ancestor}/"))
}
