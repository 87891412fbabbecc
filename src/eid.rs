//! Element identifiers and revision numbers.

/// An element identifier: a signed integer, stable within the allocator
/// of the revision root that issued it. `NO_EID` ("none / root-parent /
/// unset") is reserved and is never allocated.
pub type Eid = i64;

/// Reserved EID meaning "none" — used for a root element's parent, and
/// for "not found" return values.
pub const NO_EID: Eid = -1;

/// A revision number, indexing a `Repository`'s sequence of revision
/// roots from zero.
pub type Revnum = i64;

/// Is `eid` allocated in a revision root with the given EID floor/ceiling?
///
/// `first_eid <= eid < next_eid`. This is a free function (rather than a
/// method on `RevisionRoot`) because both `RevisionRoot` and `Subtree`
/// construction code need it without borrowing a whole revision root.
#[inline]
pub fn eid_is_allocated(first_eid: Eid, next_eid: Eid, eid: Eid) -> bool {
    eid >= first_eid && eid < next_eid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_range_is_half_open() {
        assert!(!eid_is_allocated(0, 5, -1));
        assert!(eid_is_allocated(0, 5, 0));
        assert!(eid_is_allocated(0, 5, 4));
        assert!(!eid_is_allocated(0, 5, 5));
    }

    #[test]
    fn negative_first_eid_is_tolerated() {
        assert!(eid_is_allocated(-3, 2, -3));
        assert!(eid_is_allocated(-3, 2, -1));
        assert!(!eid_is_allocated(-3, 2, 2));
    }
}
