use ebb::content::{ElementContent, NodeKind};
use ebb::eid::NO_EID;
use ebb::revision::RevisionRoot;

#[test]
fn bootstrap() {
    let rr = RevisionRoot::bootstrap();
    let root = rr.root_branch;
    assert_eq!(rr.branch_instance_id(root), "^");
    assert_eq!(rr.branch_instances().count(), 1);

    let node = rr.get(root, 0).unwrap();
    assert_eq!(node.name, "");
    assert_eq!(
        node.content,
        Some(ElementContent::Reference { rev: 0, relpath: String::new() })
    );
}

#[test]
fn allocate_and_add() {
    let mut rr = RevisionRoot::bootstrap();
    let root = rr.root_branch;

    let e1 = rr.allocate_new_eid();
    assert_eq!(e1, 1);
    rr.update(root, e1, 0, "a", ElementContent::Inline(NodeKind::File));

    assert_eq!(rr.path_by_eid(root, e1), Some("a".to_string()));
    assert_eq!(rr.eid_by_path(root, "a"), e1);
    assert_eq!(rr.eid_by_path(root, "b"), NO_EID);
}

#[test]
fn orphan_purge() {
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
fn branch_subtree() {
    let mut rr = RevisionRoot::bootstrap();
    let root = rr.root_branch;

    let e1 = rr.allocate_new_eid();
    rr.update(root, e1, 0, "d", ElementContent::Inline(NodeKind::Directory));
    let e2 = rr.allocate_new_eid();
    rr.update(root, e2, e1, "f", ElementContent::Inline(NodeKind::File));

    let nested = rr.branch(root, e1, root, 0, "d2").unwrap();

    let mount_eid = rr.eid_by_path(root, "d2");
    assert_ne!(mount_eid, NO_EID);
    assert!(rr.get(root, mount_eid).unwrap().is_subbranch_root());

    assert_eq!(rr.branch_instance(nested).root_eid, e1);
    assert_eq!(rr.path_by_eid(nested, e1), Some("".to_string()));
    assert_eq!(rr.path_by_eid(nested, e2), Some("f".to_string()));
}

#[test]
fn copy_subtree_fresh_eids() {
    let mut rr = RevisionRoot::bootstrap();
    let root = rr.root_branch;

    let e1 = rr.allocate_new_eid();
    rr.update(root, e1, 0, "d", ElementContent::Inline(NodeKind::Directory));
    let e2 = rr.allocate_new_eid();
    rr.update(root, e2, e1, "f", ElementContent::Inline(NodeKind::File));

    rr.copy_subtree(root, e1, root, 0, "d2").unwrap();

    assert_eq!(rr.eid_by_path(root, "d2/f") != NO_EID, true);
    assert_ne!(rr.eid_by_path(root, "d2"), e1);
    assert_ne!(rr.eid_by_path(root, "d2/f"), e2);

    // Originals are untouched.
    assert_eq!(rr.path_by_eid(root, e1), Some("d".to_string()));
    assert_eq!(rr.path_by_eid(root, e2), Some("d/f".to_string()));
}

#[test]
fn round_trip_after_branch() {
    use ebb::codec::{parse_revision, serialize_revision};

    let mut rr = RevisionRoot::bootstrap();
    let root = rr.root_branch;

    let e1 = rr.allocate_new_eid();
    rr.update(root, e1, 0, "d", ElementContent::Inline(NodeKind::Directory));
    let e2 = rr.allocate_new_eid();
    rr.update(root, e2, e1, "f", ElementContent::Inline(NodeKind::File));
    rr.branch(root, e1, root, 0, "d2").unwrap();

    let text = serialize_revision(&mut rr);
    let parsed = parse_revision(&text).unwrap();

    assert_eq!(parsed.branch_instances().count(), rr.branch_instances().count());
    for (id, branch) in rr.branch_instances() {
        assert_eq!(parsed.branch_instance_id(id), rr.branch_instance_id(id));
        assert_eq!(parsed.branch_instance(id).root_eid, branch.root_eid);
    }
}
