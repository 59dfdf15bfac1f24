//! Element selection
//!
//! Turns the loader's target into the concrete, ordered set of elements it
//! manages.

use fos_dom::{Document, NodeId, NodeList, Selector, SimpleSelector};

use crate::{LOADED_ATTR, MARKER_ATTR};

/// What a loader should manage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Target {
    /// Every eligible element in the document
    #[default]
    Document,
    /// Eligible descendants of a container element
    Element(NodeId),
    /// A caller-supplied collection, taken as-is
    Nodes(NodeList),
}

impl From<NodeId> for Target {
    fn from(id: NodeId) -> Self {
        Target::Element(id)
    }
}

impl From<NodeList> for Target {
    fn from(nodes: NodeList) -> Self {
        Target::Nodes(nodes)
    }
}

impl From<Vec<NodeId>> for Target {
    fn from(nodes: Vec<NodeId>) -> Self {
        Target::Nodes(NodeList::from_vec(nodes))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("Lazy-load target {0} is not an element")]
    NotAnElement(NodeId),

    #[error("No lazy-load elements found")]
    Empty,
}

/// `[lazy-load]:not([lazy-load-loaded])`
pub fn eligible_selector() -> Selector {
    Selector::compound(vec![
        SimpleSelector::Attribute { name: MARKER_ATTR.to_string(), value: None },
        SimpleSelector::Not(Box::new(SimpleSelector::Attribute {
            name: LOADED_ATTR.to_string(),
            value: None,
        })),
    ])
}

/// Resolve a target into the elements to manage, in document order.
pub fn resolve(document: &Document, target: &Target) -> Result<NodeList, ResolveError> {
    let elements = match target {
        Target::Document => document.query_selector_all(&eligible_selector()),
        Target::Element(id) => {
            if !document.tree().is_element(*id) {
                return Err(ResolveError::NotAnElement(*id));
            }
            document.tree().query_selector_all(*id, &eligible_selector())
        }
        Target::Nodes(nodes) => nodes.clone(),
    };

    if elements.is_empty() {
        return Err(ResolveError::Empty);
    }
    Ok(elements)
}
