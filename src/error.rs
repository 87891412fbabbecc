use crate::eid::{Eid, Revnum};

/// Errors produced by branch and repository operations.
///
/// Only the recoverable error kinds get a variant here. Invariant
/// violations (malformed EIDs, null content reaching a content-bearing
/// path, root/non-root naming violations) are programmer errors and are
/// raised as panics at the call site instead — see the individual
/// functions in `branch`/`map` for the `assert!`/`debug_assert!` calls.
#[derive(Debug, thiserror::Error)]
pub enum EbbError {
    #[error("cannot branch from e{eid} in branch {branch_id}: element does not exist")]
    Branching { branch_id: String, eid: Eid },

    #[error("adding or copying a subtree containing subbranches is not supported")]
    BranchingNestedSubtree,

    #[error("no such revision {0}")]
    NoSuchRevision(Revnum),

    #[error("parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, EbbError>;
