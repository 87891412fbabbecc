use criterion::{criterion_group, criterion_main, Criterion};
use ebb::codec::{parse_revision, serialize_revision};
use ebb::content::{ElementContent, NodeKind};
use ebb::revision::RevisionRoot;

/// A revision with a handful of directories, files, and one nested
/// branch, large enough to exercise both the parser's two-pass content
/// resolution and the serializer's per-branch orphan purge.
fn sample_revision() -> RevisionRoot {
    let mut rr = RevisionRoot::bootstrap();
    let root = rr.root_branch;

    let mut dirs = Vec::new();
    for i in 0..8 {
        let dir = rr.allocate_new_eid();
        rr.update(root, dir, 0, format!("dir{i}"), ElementContent::Inline(NodeKind::Directory));
        for j in 0..4 {
            let file = rr.allocate_new_eid();
            rr.update(
                root,
                file,
                dir,
                format!("file{j}"),
                ElementContent::Inline(NodeKind::File),
            );
        }
        dirs.push(dir);
    }
    rr.branch(root, dirs[0], root, 0, "dir0-branch").unwrap();
    rr
}

fn codec_benchmarks(c: &mut Criterion) {
    let mut revision = sample_revision();
    let text = serialize_revision(&mut revision);

    c.bench_function("parse_revision_40_elements_2_branches", |b| {
        b.iter(|| parse_revision(&text).unwrap());
    });

    c.bench_function("serialize_revision_40_elements_2_branches", |b| {
        let mut rr = parse_revision(&text).unwrap();
        b.iter(|| serialize_revision(&mut rr));
    });

    c.bench_function("roundtrip_revision_40_elements_2_branches", |b| {
        b.iter(|| {
            let mut rr = parse_revision(&text).unwrap();
            serialize_revision(&mut rr)
        });
    });
}

criterion_group!(benches, codec_benchmarks);
criterion_main!(benches);
