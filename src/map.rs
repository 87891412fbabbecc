//! Mutations and lookups on a branch's element map: get/update/delete,
//! orphan purging, and path↔EID resolution.

use std::collections::HashMap;

use crate::branch::BranchId;
use crate::content::ElementContent;
use crate::eid::{Eid, NO_EID};
use crate::node::ElementNode;
use crate::revision::RevisionRoot;

impl RevisionRoot {
    /// Fetch the node at `eid` in branch `b`, if present. `eid` must be
    /// allocated in this revision root (checked).
    pub fn get(&self, b: BranchId, eid: Eid) -> Option<&ElementNode> {
        assert!(self.eid_allocated(eid), "eid {eid} is not allocated");
        let node = self.branch_instance(b).e_map.get(&eid);
        if let Some(node) = node {
            self.validate_node(b, eid, node);
        }
        node
    }

    /// Set element `eid`'s node to a regular, content-bearing node.
    ///
    /// `eid` must be allocated. If `eid` is the branch root, `parent_eid`
    /// must be `NO_EID` and `name` must be empty; otherwise `parent_eid`
    /// must be a different, allocated EID and `name` must be non-empty.
    pub fn update(
        &mut self,
        b: BranchId,
        eid: Eid,
        parent_eid: Eid,
        name: impl Into<String>,
        content: ElementContent,
    ) {
        let name = name.into();
        self.check_map_node_shape(b, eid, parent_eid, &name);
        let node = ElementNode::new(parent_eid, name, content);
        self.branch_instance_mut(b).e_map.insert(eid, node);
    }

    /// Set element `eid`'s node to a subbranch-root mount point (content
    /// absent). `eid` can never be the branch root (a subbranch root is,
    /// by definition, mounted inside some other element).
    pub fn update_as_subbranch_root(
        &mut self,
        b: BranchId,
        eid: Eid,
        parent_eid: Eid,
        name: impl Into<String>,
    ) {
        let name = name.into();
        assert_ne!(
            eid,
            self.branch_instance(b).root_eid,
            "the branch root element cannot be a subbranch mount point"
        );
        self.check_map_node_shape(b, eid, parent_eid, &name);
        let node = ElementNode::new_subbranch_root(parent_eid, name);
        self.branch_instance_mut(b).e_map.insert(eid, node);
    }

    /// Remove element `eid`'s node. A subsequent `get` returns `None`.
    pub fn delete(&mut self, b: BranchId, eid: Eid) {
        assert!(self.eid_allocated(eid), "eid {eid} is not allocated");
        self.branch_instance_mut(b).e_map.remove(&eid);
    }

    /// Iteratively remove every non-root node whose parent EID is not
    /// present in the map, until the map stops changing. Convergence is
    /// guaranteed: each pass either removes at least one element or the
    /// map is already fully rooted, and the map is finite.
    pub fn purge_orphans(&mut self, b: BranchId) {
        let root_eid = self.branch_instance(b).root_eid;
        purge_map_orphans(&mut self.branch_instance_mut(b).e_map, root_eid);
    }

    /// The path from the branch root down to `eid`, joined with `/`.
    /// Returns `None` if the parent chain is broken (an orphan not yet
    /// purged). The branch root's own path is `""`.
    pub fn path_by_eid(&self, b: BranchId, eid: Eid) -> Option<String> {
        assert!(self.eid_allocated(eid), "eid {eid} is not allocated");
        let root_eid = self.branch_instance(b).root_eid;
        let mut segments = Vec::new();
        let mut cur = eid;
        while cur != root_eid {
            let node = self.branch_instance(b).e_map.get(&cur)?;
            segments.push(node.name.clone());
            cur = node.parent_eid;
        }
        segments.reverse();
        Some(segments.join("/"))
    }

    /// The repository-root-relative path of `eid`: this branch's own
    /// root rrpath, joined with `path_by_eid`.
    pub fn rrpath_by_eid(&self, b: BranchId, eid: Eid) -> Option<String> {
        let path = self.path_by_eid(b, eid)?;
        Some(join_relpath(&self.root_rrpath(b), &path))
    }

    /// This branch's own root rrpath: the outer branch's rrpath of the
    /// mount-point EID, or `""` for the top-level branch.
    pub fn root_rrpath(&self, b: BranchId) -> String {
        match self.branch_instance(b).outer {
            Some((outer_branch, outer_eid)) => self
                .rrpath_by_eid(outer_branch, outer_eid)
                .expect("a branch's mount point must resolve to a path in its outer branch"),
            None => String::new(),
        }
    }

    /// Linear search for the EID whose `path_by_eid` equals `path`.
    /// Returns `NO_EID` if none matches.
    pub fn eid_by_path(&self, b: BranchId, path: &str) -> Eid {
        let eids: Vec<Eid> = self.branch_instance(b).e_map.keys().copied().collect();
        for eid in eids {
            if self.path_by_eid(b, eid).as_deref() == Some(path) {
                return eid;
            }
        }
        if path.is_empty() {
            return self.branch_instance(b).root_eid;
        }
        NO_EID
    }

    /// `eid_by_path`, but `rrpath` is first stripped of this branch's
    /// root rrpath. Returns `NO_EID` if `rrpath` is not inside this
    /// branch.
    pub fn eid_by_rrpath(&self, b: BranchId, rrpath: &str) -> Eid {
        match strip_relpath_ancestor(&self.root_rrpath(b), rrpath) {
            Some(path) => self.eid_by_path(b, path),
            None => NO_EID,
        }
    }

    /// Starting at `root_branch`, descend into whichever (possibly
    /// nested) sub-branch actually contains `rrpath`, and resolve the
    /// EID there. Returns the innermost branch containing `rrpath` and
    /// the EID at that exact location (`NO_EID` if the location is
    /// inside the branch tree but maps to no element).
    pub fn find_nested_branch_element_by_rrpath(
        &self,
        root_branch: BranchId,
        rrpath: &str,
    ) -> Option<(BranchId, Eid)> {
        let branch_root_path = self.root_rrpath(root_branch);
        strip_relpath_ancestor(&branch_root_path, rrpath)?;

        for sub in self.get_all_sub_branches(root_branch) {
            if let Some(found) = self.find_nested_branch_element_by_rrpath(sub, rrpath) {
                return Some(found);
            }
        }

        Some((root_branch, self.eid_by_rrpath(root_branch, rrpath)))
    }

    fn check_map_node_shape(&self, b: BranchId, eid: Eid, parent_eid: Eid, name: &str) {
        assert!(self.eid_allocated(eid), "eid {eid} is not allocated");
        if eid == self.branch_instance(b).root_eid {
            assert_eq!(parent_eid, NO_EID, "branch root element must have parent {NO_EID}");
            assert!(name.is_empty(), "branch root element must have an empty name");
        } else {
            assert_ne!(parent_eid, eid, "element {eid} cannot be its own parent");
            assert!(
                self.eid_allocated(parent_eid),
                "parent eid {parent_eid} is not allocated"
            );
            assert!(!name.is_empty(), "non-root element {eid} must have a name");
        }
    }
}

/// Iteratively remove every node from `map` whose parent chain does not
/// bottom out at `root_eid`, until the map stops changing. Operates on
/// a bare map rather than a live branch, so it can be reused while
/// building a detached subtree before it is ever installed in a branch.
pub(crate) fn purge_map_orphans(map: &mut HashMap<Eid, ElementNode>, root_eid: Eid) {
    loop {
        let orphans: Vec<Eid> = map
            .iter()
            .filter(|&(&eid, node)| eid != root_eid && !map.contains_key(&node.parent_eid))
            .map(|(&eid, _)| eid)
            .collect();
        if orphans.is_empty() {
            break;
        }
        for eid in orphans {
            map.remove(&eid);
        }
    }
}

/// Join two already-normalized relpaths with `/`, treating an empty
/// either side as absent.
pub(crate) fn join_relpath(base: &str, suffix: &str) -> String {
    if base.is_empty() {
        suffix.to_string()
    } else if suffix.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{suffix}")
    }
}

/// If `path` is `ancestor` or a descendant of it, return the remainder
/// relpath (possibly empty). Otherwise `None`.
pub(crate) fn strip_relpath_ancestor<'a>(ancestor: &str, path: &'a str) -> Option<&'a str> {
    if ancestor.is_empty() {
        return Some(path);
    }
    if path == ancestor {
        return Some("");
    }
    path.strip_prefix(ancestor)
        .and_then(|rest| rest.strip_prefix('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::NodeKind;

    fn bootstrap_with_a() -> (RevisionRoot, BranchId) {
        let mut rr = RevisionRoot::bootstrap();
        let root = rr.root_branch;
        let e1 = rr.allocate_new_eid();
        rr.update(root, e1, 0, "a", ElementContent::Inline(NodeKind::File));
        (rr, root)
    }

    #[test]
    fn allocate_and_add_scenario() {
        let (rr, root) = bootstrap_with_a();
        assert_eq!(rr.path_by_eid(root, 1), Some("a".to_string()));
        assert_eq!(rr.eid_by_path(root, "a"), 1);
        assert_eq!(rr.eid_by_path(root, "b"), NO_EID);
    }

    #[test]
    fn orphan_purge_scenario() {
        let mut rr = RevisionRoot::bootstrap();
        let root = rr.root_branch;
        let e1 = rr.allocate_new_eid();
        rr.update(root, e1, 0, "d", ElementContent::Inline(NodeKind::Directory));
        let e2 = rr.allocate_new_eid();
        rr.update(root, e2, e1, "f", ElementContent::Inline(NodeKind::File));

        rr.delete(root, e1);
        rr.purge_orphans(root);

        assert!(rr.get(root, e1).is_none());
        assert!(rr.get(root, e2).is_none());
        assert!(rr.get(root, 0).is_some());
    }

    #[test]
    fn purge_orphans_is_idempotent() {
        let mut rr = RevisionRoot::bootstrap();
        let root = rr.root_branch;
        let e1 = rr.allocate_new_eid();
        rr.update(root, e1, 0, "d", ElementContent::Inline(NodeKind::Directory));
        let e2 = rr.allocate_new_eid();
        rr.update(root, e2, e1, "f", ElementContent::Inline(NodeKind::File));
        rr.delete(root, e1);

        rr.purge_orphans(root);
        let len_after_first = rr.branch_instance(root).len();
        rr.purge_orphans(root);
        assert_eq!(rr.branch_instance(root).len(), len_after_first);
    }

    #[test]
    fn eid_by_rrpath_strips_nested_branch_root() {
        let mut rr = RevisionRoot::bootstrap();
        let root = rr.root_branch;
        let e1 = rr.allocate_new_eid();
        rr.update(root, e1, 0, "sub", ElementContent::Inline(NodeKind::Directory));
        assert_eq!(rr.root_rrpath(root), "");
        assert_eq!(rr.rrpath_by_eid(root, e1), Some("sub".to_string()));
        assert_eq!(rr.eid_by_rrpath(root, "sub"), e1);
        assert_eq!(rr.eid_by_rrpath(root, "other"), NO_EID);
    }
}
