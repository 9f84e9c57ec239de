//! Sipa DOM - Document Object Model
//!
//! Arena-based DOM tree used as the headless render target of the
//! component engine. Nodes are addressed by [`NodeId`] instead of pointers,
//! so whole subtrees can be copied between a detached [`Fragment`] and the
//! live [`Document`] without reference juggling.

mod node;
mod tree;
mod document;
mod fragment;
mod serialize;

pub use node::{Attribute, ElementData, Node, NodeData};
pub use tree::{Children, DomTree};
pub use document::Document;
pub use fragment::Fragment;
pub use serialize::{escape_attribute, escape_text, inner_html, outer_html};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }

    /// Raw arena index
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// DOM errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0:?} does not exist in this tree")]
    UnknownNode(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("node {0:?} has no parent")]
    Detached(NodeId),

    #[error("cannot insert node {child:?} into its own subtree at {parent:?}")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}
