//! DOM Node
//!
//! Nodes live in the `DomTree` arena and link to each other through
//! `NodeId`s instead of pointers.

use std::fmt;

use crate::{DOMTokenList, NamedNodeMap, NodeId};

/// One-shot handler run when a resource referenced by an element fails to load.
///
/// The handler receives the element it was installed on.
pub type ErrorHandler = Box<dyn FnOnce(&mut ElementData)>;

/// DOM Node - Core structure
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE if root or detached)
    pub parent: NodeId,
    /// First child
    pub first_child: NodeId,
    /// Last child (for O(1) append)
    pub last_child: NodeId,
    /// Previous sibling
    pub prev_sibling: NodeId,
    /// Next sibling
    pub next_sibling: NodeId,
    /// Node-specific data
    pub data: NodeData,
}

impl Node {
    fn with_data(data: NodeData) -> Self {
        Self {
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            data,
        }
    }

    /// Create a new element node
    pub fn element(tag: &str) -> Self {
        Self::with_data(NodeData::Element(ElementData::new(tag)))
    }

    /// Create a new text node
    pub fn text(content: String) -> Self {
        Self::with_data(NodeData::Text(content))
    }

    /// Create a new comment node
    pub fn comment(content: String) -> Self {
        Self::with_data(NodeData::Comment(content))
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::with_data(NodeData::Document)
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get mutable element data
    #[inline]
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Document root
    Document,
    /// Element
    Element(ElementData),
    /// Text content
    Text(String),
    /// Comment
    Comment(String),
}

/// Element-specific data
pub struct ElementData {
    /// Lowercased tag name
    pub tag: String,
    /// Attributes in insertion order
    pub attrs: NamedNodeMap,
    onerror: Option<ErrorHandler>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: NamedNodeMap::new(),
            onerror: None,
        }
    }

    /// Get an attribute value
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get_attribute(name)
    }

    /// Check if an attribute is present (an empty value still counts)
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.has_attribute(name)
    }

    /// Set an attribute
    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attrs.set_attribute(name, value);
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        self.attrs.remove_named_item(name).map(|a| a.value)
    }

    /// Class tokens derived from the `class` attribute
    pub fn class_list(&self) -> DOMTokenList {
        DOMTokenList::from_string(self.get_attr("class").unwrap_or(""))
    }

    /// Add class tokens, writing the result back to the `class` attribute
    pub fn add_classes(&mut self, tokens: &[&str]) {
        let mut list = self.class_list();
        list.add(tokens);
        self.set_attr("class", &list.value());
    }

    /// Install the resource error handler, replacing any previous one
    pub fn set_onerror(&mut self, handler: ErrorHandler) {
        self.onerror = Some(handler);
    }

    /// Check whether an error handler is installed
    pub fn has_onerror(&self) -> bool {
        self.onerror.is_some()
    }

    /// Run the installed error handler once, clearing the slot first
    pub fn fire_error(&mut self) -> bool {
        match self.onerror.take() {
            Some(handler) => {
                handler(self);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for ElementData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementData")
            .field("tag", &self.tag)
            .field("attrs", &self.attrs)
            .field("onerror", &self.onerror.is_some())
            .finish()
    }
}
