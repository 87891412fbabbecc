//! The line-oriented text wire format: one canonical, bit-exact
//! serialization of a revision root, and the parser that reads it back.
//!
//! ```text
//! r<REV>:
//! family: eids <FIRST_EID> <NEXT_EID> b-instances <N>
//! b<BID> root-eid <ROOT_EID> at <RRPATH>
//! e<EID>: <KIND> <PARENT_EID> <NAME>
//! ...
//! ```

use std::collections::HashMap;

use crate::branch::BranchId;
use crate::content::{ElementContent, NodeKind};
use crate::eid::{Eid, Revnum, NO_EID};
use crate::error::{EbbError, Result};
use crate::revision::RevisionRoot;

const DOT: &str = ".";
const NULL_NAME: &str = "(null)";

/// Serialize `rr` to the canonical text format. Runs `purge_orphans` on
/// every branch first, per the format's contract that only reachable
/// elements are ever written out.
pub fn serialize_revision(rr: &mut RevisionRoot) -> String {
    let branch_ids: Vec<BranchId> = rr.branch_instances().map(|(id, _)| id).collect();
    for &b in &branch_ids {
        rr.purge_orphans(b);
    }

    let mut out = String::new();
    out.push_str(&format!("r{}:\n", rr.rev));
    out.push_str(&format!(
        "family: eids {} {} b-instances {}\n",
        rr.first_eid,
        rr.next_eid(),
        branch_ids.len()
    ));

    for b in branch_ids {
        let bid = rr.branch_instance_id(b);
        let root_eid = rr.branch_instance(b).root_eid;
        let rrpath = rr.root_rrpath(b);
        out.push_str(&format!(
            "b{} root-eid {} at {}\n",
            bid,
            root_eid,
            rrpath_field(&rrpath)
        ));

        for eid in rr.first_eid..rr.next_eid() {
            out.push_str(&element_line(rr, b, eid));
        }
    }
    out
}

fn element_line(rr: &RevisionRoot, b: BranchId, eid: Eid) -> String {
    match rr.get(b, eid) {
        None => format!("e{eid}: none {NO_EID} {NULL_NAME}\n"),
        Some(node) => {
            let kind = if node.content.is_some() { "normal" } else { "subbranch" };
            let name = name_field(&node.name);
            format!("e{eid}: {kind} {parent} {name}\n", parent = node.parent_eid)
        }
    }
}

fn rrpath_field(rrpath: &str) -> &str {
    if rrpath.is_empty() {
        DOT
    } else {
        rrpath
    }
}

fn name_field(name: &str) -> &str {
    if name.is_empty() {
        DOT
    } else {
        name
    }
}

/// Parse the canonical text format back into a `RevisionRoot`.
///
/// Element content is deferred: every `normal` element is first created
/// with a placeholder content, then — once every branch's structural
/// skeleton (parent/name links) is in place — revisited in a second
/// pass and given its real content, a reference to `(this revision,
/// rrpath_by_eid)`. `subbranch` elements never need this second pass;
/// their content is absent by construction.
pub fn parse_revision(input: &str) -> Result<RevisionRoot> {
    let mut lines = Lines::new(input);

    let rev = parse_header_line(&mut lines)?;
    let (first_eid, next_eid, n_branches) = parse_family_line(&mut lines)?;

    let mut rr = RevisionRoot::new_empty(rev, first_eid);
    rr.set_next_eid(next_eid);

    let mut bid_to_branch: HashMap<String, BranchId> = HashMap::new();
    let mut normal_elements: Vec<(BranchId, Eid)> = Vec::new();

    for _ in 0..n_branches {
        let (line_no, bid_str, root_eid, rrpath) = parse_branch_line(&mut lines)?;
        let branch = if bid_str == "^" {
            rr.add_top_level_branch(root_eid)
        } else {
            let (outer_bid, outer_eid) = split_bid(&bid_str, line_no)?;
            let outer_branch = *bid_to_branch
                .get(&outer_bid)
                .ok_or_else(|| parse_err(line_no, format!("unknown outer branch '{outer_bid}'")))?;
            rr.add_new_branch_instance(outer_branch, outer_eid, root_eid)
        };
        bid_to_branch.insert(bid_str, branch);
        let _ = rrpath;

        for eid in first_eid..next_eid {
            let (line_no, line_eid, kind, parent_eid, name) = parse_element_line(&mut lines)?;
            if line_eid != eid {
                return Err(parse_err(
                    line_no,
                    format!("expected element line for e{eid}, found e{line_eid}"),
                ));
            }
            match kind.as_str() {
                "none" => {}
                "subbranch" => {
                    rr.update_as_subbranch_root(branch, eid, parent_eid, name);
                }
                "normal" => {
                    // Placeholder content, replaced in the second pass below.
                    rr.update(branch, eid, parent_eid, name, ElementContent::Inline(NodeKind::File));
                    normal_elements.push((branch, eid));
                }
                other => {
                    return Err(parse_err(line_no, format!("unknown element kind '{other}'")));
                }
            }
        }
    }

    for (branch, eid) in normal_elements {
        let node = rr.get(branch, eid).expect("just parsed");
        let parent_eid = node.parent_eid;
        let name = node.name.clone();
        let relpath = rr
            .rrpath_by_eid(branch, eid)
            .expect("a just-parsed normal element resolves to a path");
        rr.update(
            branch,
            eid,
            parent_eid,
            name,
            ElementContent::Reference { rev, relpath },
        );
    }

    Ok(rr)
}

/// Split a nested BID (`^.e1.e2...en`) into the BID string of its
/// immediate outer branch and the outer EID within that branch.
fn split_bid(bid: &str, line_no: usize) -> Result<(String, Eid)> {
    let rest = bid
        .strip_prefix('^')
        .ok_or_else(|| parse_err(line_no, format!("branch id '{bid}' must start with '^'")))?;
    let segments: Vec<&str> = rest.split('.').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Err(parse_err(line_no, format!("branch id '{bid}' is not nested")));
    }
    let outer_eid: Eid = segments[segments.len() - 1]
        .parse()
        .map_err(|_| parse_err(line_no, format!("bad outer eid in branch id '{bid}'")))?;
    let outer_bid = if segments.len() == 1 {
        "^".to_string()
    } else {
        format!("^.{}", segments[..segments.len() - 1].join("."))
    };
    Ok((outer_bid, outer_eid))
}

fn parse_header_line(lines: &mut Lines) -> Result<Revnum> {
    let (line_no, line) = lines.next_nonblank()?;
    let rest = line
        .strip_prefix('r')
        .and_then(|s| s.strip_suffix(':'))
        .ok_or_else(|| parse_err(line_no, "expected revision header 'r<REV>:'"))?;
    rest.parse()
        .map_err(|_| parse_err(line_no, format!("bad revision number '{rest}'")))
}

fn parse_family_line(lines: &mut Lines) -> Result<(Eid, Eid, usize)> {
    let (line_no, line) = lines.next_nonblank()?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        ["family:", "eids", first, next, "b-instances", n] => {
            let first_eid = first
                .parse()
                .map_err(|_| parse_err(line_no, format!("bad first eid '{first}'")))?;
            let next_eid = next
                .parse()
                .map_err(|_| parse_err(line_no, format!("bad next eid '{next}'")))?;
            let n_branches: usize = n
                .parse()
                .map_err(|_| parse_err(line_no, format!("bad branch count '{n}'")))?;
            Ok((first_eid, next_eid, n_branches))
        }
        _ => Err(parse_err(line_no, "malformed family line")),
    }
}

fn parse_branch_line(lines: &mut Lines) -> Result<(usize, String, Eid, String)> {
    let (line_no, line) = lines.next_nonblank()?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        [bid, "root-eid", root_eid, "at", rrpath] => {
            let bid = bid
                .strip_prefix('b')
                .ok_or_else(|| parse_err(line_no, "expected branch line to start with 'b'"))?
                .to_string();
            let root_eid: Eid = root_eid
                .parse()
                .map_err(|_| parse_err(line_no, format!("bad root eid '{root_eid}'")))?;
            let rrpath = if *rrpath == DOT { String::new() } else { rrpath.to_string() };
            Ok((line_no, bid, root_eid, rrpath))
        }
        _ => Err(parse_err(line_no, "malformed branch line")),
    }
}

fn parse_element_line(lines: &mut Lines) -> Result<(usize, Eid, String, Eid, String)> {
    let (line_no, line) = lines.next_nonblank()?;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    match tokens.as_slice() {
        [eid_tok, kind, parent, name] => {
            let eid_str = eid_tok
                .strip_prefix('e')
                .and_then(|s| s.strip_suffix(':'))
                .ok_or_else(|| parse_err(line_no, "expected element line to start with 'e<EID>:'"))?;
            let eid: Eid = eid_str
                .parse()
                .map_err(|_| parse_err(line_no, format!("bad element eid '{eid_str}'")))?;
            let parent_eid: Eid = parent
                .parse()
                .map_err(|_| parse_err(line_no, format!("bad parent eid '{parent}'")))?;
            let name = if *name == DOT {
                String::new()
            } else if *name == NULL_NAME {
                String::new()
            } else {
                name.to_string()
            };
            Ok((line_no, eid, kind.to_string(), parent_eid, name))
        }
        _ => Err(parse_err(line_no, "malformed element line")),
    }
}

fn parse_err(line: usize, reason: impl Into<String>) -> EbbError {
    EbbError::Parse {
        line,
        reason: reason.into(),
    }
}

struct Lines<'a> {
    remaining: std::str::Lines<'a>,
    line_no: usize,
}

impl<'a> Lines<'a> {
    fn new(input: &'a str) -> Self {
        Lines {
            remaining: input.lines(),
            line_no: 0,
        }
    }

    fn next_nonblank(&mut self) -> Result<(usize, &'a str)> {
        loop {
            self.line_no += 1;
            match self.remaining.next() {
                None => return Err(parse_err(self.line_no, "unexpected end of input")),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok((self.line_no, line)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOTSTRAP: &str = "r0:\nfamily: eids 0 1 b-instances 1\nb^ root-eid 0 at .\ne0: normal -1 .\n";

    #[test]
    fn serialize_of_bootstrap_matches_canonical_string() {
        let mut rr = RevisionRoot::bootstrap();
        assert_eq!(serialize_revision(&mut rr), BOOTSTRAP);
    }

    #[test]
    fn parse_of_bootstrap_string_round_trips() {
        let mut rr = parse_revision(BOOTSTRAP).unwrap();
        assert_eq!(rr.rev, 0);
        assert_eq!(rr.first_eid, 0);
        assert_eq!(rr.next_eid(), 1);
        let root = rr.root_branch;
        let node = rr.get(root, 0).unwrap();
        assert_eq!(node.name, "");
        assert_eq!(
            node.content,
            Some(ElementContent::Reference { rev: 0, relpath: String::new() })
        );
        assert_eq!(serialize_revision(&mut rr), BOOTSTRAP);
    }

    #[test]
    fn round_trip_preserves_a_branched_tree() {
        let mut rr = RevisionRoot::bootstrap();
        let root = rr.root_branch;
        let dir = rr.allocate_new_eid();
        rr.update(root, dir, 0, "d", ElementContent::Inline(NodeKind::Directory));
        let file = rr.allocate_new_eid();
        rr.update(root, file, dir, "f", ElementContent::Inline(NodeKind::File));
        rr.branch(root, dir, root, 0, "d2").unwrap();

        let text = serialize_revision(&mut rr);
        let mut parsed = parse_revision(&text).unwrap();
        assert_eq!(parsed.branch_instances().count(), 2);
        assert_eq!(parsed.path_by_eid(parsed.root_branch, file), Some("d/f".to_string()));
        assert_eq!(serialize_revision(&mut parsed), text);
    }

    #[test]
    fn parse_rejects_truncated_input() {
        let err = parse_revision("r0:\n").unwrap_err();
        assert!(matches!(err, EbbError::Parse { .. }));
    }

    #[test]
    fn parse_rejects_mismatched_eid_order() {
        let bad = "r0:\nfamily: eids 0 2 b-instances 1\nb^ root-eid 0 at .\ne1: normal -1 .\ne0: normal -1 .\n";
        let err = parse_revision(bad).unwrap_err();
        assert!(matches!(err, EbbError::Parse { .. }));
    }
}
