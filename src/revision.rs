//! A revision's EID allocator and the list of branch instances it owns.

use crate::branch::{BranchId, BranchInstance};
use crate::content::ElementContent;
use crate::eid::{eid_is_allocated, Eid, Revnum, NO_EID};
use crate::node::ElementNode;

/// One revision's worth of branch instances, sharing one EID allocator.
///
/// `branches` holds a slot per `BranchId` ever handed out in this
/// revision. A slot is `None` once its branch instance has been deleted
/// (`delete_branch_instance_recursive`) — slots are tombstoned rather
/// than removed, so a `BranchId` is a stable handle for the lifetime of
/// the revision root, the same way this model's mount-point-based
/// linkage is meant to work (spec §9, Design Notes "Cyclic references":
/// "use an index/handle into the revision root's list").
#[derive(Debug, Clone)]
pub struct RevisionRoot {
    pub rev: Revnum,
    pub first_eid: Eid,
    next_eid: Eid,
    pub root_branch: BranchId,
    pub(crate) branches: Vec<Option<BranchInstance>>,
}

impl RevisionRoot {
    /// Create a new revision root with a single, empty top-level branch.
    pub fn new(rev: Revnum, first_eid: Eid) -> Self {
        let mut rr = RevisionRoot {
            rev,
            first_eid,
            next_eid: first_eid,
            root_branch: 0,
            branches: Vec::new(),
        };
        let eid = rr.allocate_new_eid();
        rr.branches.push(Some(BranchInstance::new(eid, None)));
        rr.root_branch = 0;
        rr
    }

    /// Build the default bootstrap revision 0: one branch, one root
    /// element `e0`, content a self-reference `{rev: 0, relpath: ""}`.
    pub fn bootstrap() -> Self {
        let mut rr = RevisionRoot::new(0, 0);
        let root = rr.root_branch;
        rr.update(
            root,
            0,
            NO_EID,
            "",
            ElementContent::Reference {
                rev: 0,
                relpath: String::new(),
            },
        );
        rr
    }

    /// Construct a revision root with no branches yet, its EID
    /// allocator parked at `first_eid`. Used by the text codec, which
    /// learns `next_eid` from the family header and creates branches
    /// one at a time as it reads the branch blocks that follow.
    pub(crate) fn new_empty(rev: Revnum, first_eid: Eid) -> Self {
        RevisionRoot {
            rev,
            first_eid,
            next_eid: first_eid,
            root_branch: 0,
            branches: Vec::new(),
        }
    }

    /// Register the revision's top-level branch (no outer branch).
    /// Must be called before any nested branch instance is added.
    pub(crate) fn add_top_level_branch(&mut self, root_eid: Eid) -> BranchId {
        self.branches.push(Some(BranchInstance::new(root_eid, None)));
        let id = self.branches.len() - 1;
        self.root_branch = id;
        id
    }

    /// The next EID this allocator will hand out.
    pub fn next_eid(&self) -> Eid {
        self.next_eid
    }

    /// Allocate a fresh EID. Allocations are never reused within a
    /// revision root (spec §4.1).
    pub fn allocate_new_eid(&mut self) -> Eid {
        let eid = self.next_eid;
        self.next_eid += 1;
        eid
    }

    /// Raise `next_eid` to exactly `next_eid`, without allocating any
    /// EID in between. Used by the parser, which learns the allocator's
    /// bounds from the family header before any element is created.
    pub(crate) fn set_next_eid(&mut self, next_eid: Eid) {
        self.next_eid = next_eid;
    }

    pub(crate) fn eid_allocated(&self, eid: Eid) -> bool {
        eid_is_allocated(self.first_eid, self.next_eid, eid)
    }

    /// Borrow the branch instance at `b`.
    ///
    /// Panics if `b` is out of range or refers to a deleted branch —
    /// both are programmer errors, since `BranchId`s are only ever
    /// obtained from this revision root's own operations.
    pub fn branch_instance(&self, b: BranchId) -> &BranchInstance {
        self.branches[b]
            .as_ref()
            .unwrap_or_else(|| panic!("branch {b} has been deleted"))
    }

    pub(crate) fn branch_instance_mut(&mut self, b: BranchId) -> &mut BranchInstance {
        self.branches[b]
            .as_mut()
            .unwrap_or_else(|| panic!("branch {b} has been deleted"))
    }

    /// All live branch instances in this revision, including the
    /// top-level branch and every nested branch.
    pub fn branch_instances(&self) -> impl Iterator<Item = (BranchId, &BranchInstance)> {
        self.branches
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|b| (id, b)))
    }

    pub(crate) fn validate_node(&self, b: BranchId, eid: Eid, node: &ElementNode) {
        let root_eid = self.branch_instance(b).root_eid;
        if eid == root_eid {
            debug_assert_eq!(
                node.parent_eid, NO_EID,
                "branch root element must have parent {}",
                NO_EID
            );
            debug_assert!(node.name.is_empty(), "branch root element must have no name");
        } else {
            debug_assert_ne!(node.parent_eid, eid, "element cannot be its own parent");
            debug_assert!(
                self.eid_allocated(node.parent_eid),
                "element's parent eid {} is not allocated",
                node.parent_eid
            );
            debug_assert!(!node.name.is_empty(), "non-root element must have a name");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_new_eid_is_monotone_and_unique() {
        let mut rr = RevisionRoot::new(1, 0);
        let a = rr.allocate_new_eid();
        let b = rr.allocate_new_eid();
        let c = rr.allocate_new_eid();
        assert_eq!([a, b, c], [1, 2, 3]);
        assert_eq!(rr.next_eid(), 4);
    }

    #[test]
    fn negative_first_eid_floor_is_tolerated() {
        let rr = RevisionRoot::new(5, -3);
        assert_eq!(rr.first_eid, -3);
        assert!(rr.eid_allocated(-3));
        assert!(!rr.eid_allocated(-4));
    }

    #[test]
    fn bootstrap_matches_default_r0_shape() {
        let rr = RevisionRoot::bootstrap();
        assert_eq!(rr.rev, 0);
        assert_eq!(rr.first_eid, 0);
        assert_eq!(rr.next_eid(), 1);
        assert_eq!(rr.branch_instances().count(), 1);
        let root = rr.branch_instance(rr.root_branch);
        assert!(root.is_top_level());
        assert_eq!(root.root_eid, 0);
    }
}
