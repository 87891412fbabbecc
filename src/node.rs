//! A single entry in a branch's element map.

use crate::content::ElementContent;
use crate::eid::Eid;

/// An element map entry: `(parent_eid, name, content)`.
///
/// `content == None` marks this element as the mount point of a nested
/// branch instance (spec §3) rather than as a regular content-bearing
/// element. Every site that reads `content` matches both cases
/// explicitly; there is no code path that treats `None` as "don't know
/// yet" or similar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    pub parent_eid: Eid,
    pub name: String,
    pub content: Option<ElementContent>,
}

impl ElementNode {
    pub fn new(parent_eid: Eid, name: impl Into<String>, content: ElementContent) -> Self {
        Self {
            parent_eid,
            name: name.into(),
            content: Some(content),
        }
    }

    /// Construct a subbranch-root mount node (content absent).
    pub fn new_subbranch_root(parent_eid: Eid, name: impl Into<String>) -> Self {
        Self {
            parent_eid,
            name: name.into(),
            content: None,
        }
    }

    /// Is this node the mount point of a nested branch?
    pub fn is_subbranch_root(&self) -> bool {
        self.content.is_none()
    }
}
