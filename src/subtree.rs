//! Subtree extraction and application: the operations that move an
//! element and everything beneath it, whether within one branch, into a
//! new nested branch, or as a plain copy.

use std::collections::HashMap;

use crate::branch::BranchId;
use crate::eid::{Eid, NO_EID};
use crate::error::{EbbError, Result};
use crate::map::purge_map_orphans;
use crate::node::ElementNode;
use crate::revision::RevisionRoot;

/// A detached copy of part of a branch: its own element map (rooted at
/// `root_eid`) plus, recursively, any nested branches mounted inside it.
///
/// `subbranches` is keyed by the EID *within this subtree* at which
/// each nested branch is mounted, mirroring how the branch's own e_map
/// addresses it.
#[derive(Debug, Clone)]
pub struct Subtree {
    pub root_eid: Eid,
    pub(crate) e_map: HashMap<Eid, ElementNode>,
    pub subbranches: HashMap<Eid, Subtree>,
}

impl Subtree {
    pub fn get(&self, eid: Eid) -> Option<&ElementNode> {
        self.e_map.get(&eid)
    }

    pub fn is_empty(&self) -> bool {
        self.e_map.len() <= 1 && self.subbranches.is_empty()
    }
}

impl RevisionRoot {
    /// Extract the subtree rooted at `eid` in `branch`: a full copy of
    /// the branch's element map (unfiltered — orphan pruning happens
    /// later, on application) plus every nested branch mounted at or
    /// below `eid`.
    pub fn get_subtree(&self, branch: BranchId, eid: Eid) -> Subtree {
        let b = self.branch_instance(branch);
        let e_map = b.e_map.clone();
        let subbranches = self
            .get_subbranches(branch, eid)
            .into_iter()
            .map(|sub| {
                let sub_root = self.branch_instance(sub).root_eid;
                let mount_eid = self
                    .branch_instance(sub)
                    .outer
                    .expect("sub-branch has an outer")
                    .1;
                (mount_eid, self.get_subtree(sub, sub_root))
            })
            .collect();
        Subtree {
            root_eid: eid,
            e_map,
            subbranches,
        }
    }

    /// Install `subtree` as a brand-new element in `to_branch`, named
    /// `new_name` under `new_parent_eid`, allocating a fresh EID for
    /// every element in the subtree (the copy-semantics case).
    ///
    /// `to_eid` pins the root element's own EID instead of allocating
    /// one, when the caller already knows what it must be. Rejects a
    /// subtree that itself contains nested branches: adding (as opposed
    /// to branching) a subtree across a branch boundary is not
    /// supported, matching the source model's restriction.
    pub fn add_subtree(
        &mut self,
        to_branch: BranchId,
        to_eid: Option<Eid>,
        new_parent_eid: Eid,
        new_name: &str,
        subtree: &Subtree,
    ) -> Result<Eid> {
        if !subtree.subbranches.is_empty() {
            return Err(EbbError::BranchingNestedSubtree);
        }
        let root_eid = to_eid.unwrap_or_else(|| self.allocate_new_eid());
        let root_node = subtree
            .e_map
            .get(&subtree.root_eid)
            .expect("subtree root element must be present in its own map");
        match &root_node.content {
            Some(content) => self.update(to_branch, root_eid, new_parent_eid, new_name, content.clone()),
            None => self.update_as_subbranch_root(to_branch, root_eid, new_parent_eid, new_name),
        }
        self.add_subtree_children(to_branch, subtree, subtree.root_eid, root_eid)?;
        Ok(root_eid)
    }

    fn add_subtree_children(
        &mut self,
        to_branch: BranchId,
        subtree: &Subtree,
        old_parent: Eid,
        new_parent: Eid,
    ) -> Result<()> {
        let children: Vec<(Eid, &ElementNode)> = subtree
            .e_map
            .iter()
            .filter(|(&eid, node)| eid != subtree.root_eid && node.parent_eid == old_parent)
            .map(|(&eid, node)| (eid, node))
            .collect();
        for (old_eid, node) in children {
            let new_eid = self.allocate_new_eid();
            match &node.content {
                Some(content) => {
                    self.update(to_branch, new_eid, new_parent, node.name.clone(), content.clone())
                }
                None => self.update_as_subbranch_root(to_branch, new_eid, new_parent, node.name.clone()),
            }
            self.add_subtree_children(to_branch, subtree, old_eid, new_eid)?;
        }
        Ok(())
    }

    /// Install `subtree` into `to_branch`, preserving every original
    /// EID (the branch/move-tracking case, as opposed to `add_subtree`'s
    /// fresh-EID copy semantics). Orphans inside the subtree's own map
    /// are purged first; nested branches are recreated by `branch_subtree`.
    pub fn instantiate_subtree(
        &mut self,
        to_branch: BranchId,
        new_parent_eid: Eid,
        new_name: &str,
        subtree: &Subtree,
    ) {
        let mut e_map = subtree.e_map.clone();
        purge_map_orphans(&mut e_map, subtree.root_eid);

        let root_node = e_map
            .get(&subtree.root_eid)
            .expect("subtree root element survives its own purge");
        match &root_node.content {
            Some(content) => self.update(
                to_branch,
                subtree.root_eid,
                new_parent_eid,
                new_name,
                content.clone(),
            ),
            None => {
                self.update_as_subbranch_root(to_branch, subtree.root_eid, new_parent_eid, new_name)
            }
        }
        for (&eid, node) in &e_map {
            if eid == subtree.root_eid {
                continue;
            }
            match &node.content {
                Some(content) => {
                    self.update(to_branch, eid, node.parent_eid, node.name.clone(), content.clone())
                }
                None => self.update_as_subbranch_root(to_branch, eid, node.parent_eid, node.name.clone()),
            }
        }

        for (&mount_eid, sub) in &subtree.subbranches {
            if e_map.contains_key(&mount_eid) {
                self.branch_subtree(sub, to_branch, mount_eid);
            }
        }
    }

    /// Recreate `subtree` as a new, independent branch instance mounted
    /// in `to_outer_branch` at `to_outer_eid`, preserving EIDs throughout.
    pub fn branch_subtree(
        &mut self,
        subtree: &Subtree,
        to_outer_branch: BranchId,
        to_outer_eid: Eid,
    ) -> BranchId {
        let new_branch = self.add_new_branch_instance(to_outer_branch, to_outer_eid, subtree.root_eid);
        self.instantiate_subtree(new_branch, NO_EID, "", subtree);
        new_branch
    }

    /// Branch the element at `from_eid` in `from_branch` (and everything
    /// beneath it) into a brand-new nested branch, mounted inside
    /// `to_outer_branch` at a freshly allocated EID under
    /// `to_outer_parent_eid`, named `new_name`.
    ///
    /// `from_eid` must currently resolve to a path (an orphan cannot be
    /// branched).
    pub fn branch(
        &mut self,
        from_branch: BranchId,
        from_eid: Eid,
        to_outer_branch: BranchId,
        to_outer_parent_eid: Eid,
        new_name: &str,
    ) -> Result<BranchId> {
        if self.path_by_eid(from_branch, from_eid).is_none() {
            return Err(EbbError::Branching {
                branch_id: self.branch_instance_id(from_branch),
                eid: from_eid,
            });
        }
        let subtree = self.get_subtree(from_branch, from_eid);
        let new_outer_eid = self.allocate_new_eid();
        self.update_as_subbranch_root(to_outer_branch, new_outer_eid, to_outer_parent_eid, new_name);
        Ok(self.branch_subtree(&subtree, to_outer_branch, new_outer_eid))
    }

    /// Branch the element at `from_eid` in `from_branch` directly into
    /// an existing branch `to_branch`, under `to_parent_eid` named
    /// `new_name`, without creating a new nested branch instance.
    pub fn branch_into(
        &mut self,
        from_branch: BranchId,
        from_eid: Eid,
        to_branch: BranchId,
        to_parent_eid: Eid,
        new_name: &str,
    ) -> Result<()> {
        if self.path_by_eid(from_branch, from_eid).is_none() {
            return Err(EbbError::Branching {
                branch_id: self.branch_instance_id(from_branch),
                eid: from_eid,
            });
        }
        let subtree = self.get_subtree(from_branch, from_eid);
        self.instantiate_subtree(to_branch, to_parent_eid, new_name, &subtree);
        Ok(())
    }

    /// Copy the element at `from_eid` in `from_branch` (and everything
    /// beneath it, excluding nested branches) into `to_branch` under
    /// `to_parent_eid` named `to_name`, allocating fresh EIDs throughout.
    pub fn copy_subtree(
        &mut self,
        from_branch: BranchId,
        from_eid: Eid,
        to_branch: BranchId,
        to_parent_eid: Eid,
        to_name: &str,
    ) -> Result<Eid> {
        let subtree = self.get_subtree(from_branch, from_eid);
        self.add_subtree(to_branch, None, to_parent_eid, to_name, &subtree)
    }

    /// Purge orphans from `branch`, then recurse into every sub-branch
    /// whose mount point survived the purge; sub-branches whose mount
    /// point did not survive are deleted outright, descendants included.
    pub fn purge_recursive(&mut self, branch: BranchId) {
        self.purge_orphans(branch);
        for sub in self.get_all_sub_branches(branch) {
            let (_, outer_eid) = self.branch_instance(sub).outer.expect("sub-branch has an outer");
            if self.get(branch, outer_eid).is_some() {
                self.purge_recursive(sub);
            } else {
                self.delete_branch_instance_recursive(sub);
            }
        }
    }
}
