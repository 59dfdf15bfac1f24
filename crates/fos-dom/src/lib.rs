//! fOS DOM - Document Object Model
//!
//! Arena-based DOM tree plus the pieces a lazy-activation layer needs from
//! its host: ordered attributes, class token lists, attribute selectors,
//! element geometry, a feature probe and a rect-driven IntersectionObserver.

mod attributes;
mod classlist;
mod document;
mod features;
mod geometry;
mod node;
mod observer;
mod selector;
mod tree;

pub use attributes::{Attr, NamedNodeMap};
pub use classlist::DOMTokenList;
pub use document::Document;
pub use features::Features;
pub use geometry::{DOMRect, MarginLength, RootMargin};
pub use node::{ElementData, ErrorHandler, Node, NodeData};
pub use observer::{IntersectionObserver, IntersectionObserverEntry, IntersectionObserverOptions};
pub use selector::{NodeList, Selector, SimpleSelector};
pub use tree::{Children, Descendants, DomTree};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root (document) node ID
    pub const ROOT: NodeId = NodeId(0);
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Build an ID from a raw arena index
    pub const fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }

    /// Check that this is not the `NONE` sentinel
    #[inline]
    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// DOM errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomError {
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid root margin: {0}")]
    InvalidRootMargin(String),

    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),
}
