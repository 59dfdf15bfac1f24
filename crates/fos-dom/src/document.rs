//! Document - High-level document API

use crate::{DomTree, NodeId, NodeList, Selector};

/// HTML Document
#[derive(Debug)]
pub struct Document {
    /// The DOM tree
    pub tree: DomTree,
    /// Document URL
    url: String,
    /// Cached reference to <html> element
    html_element: NodeId,
    /// Cached reference to <head> element
    head_element: NodeId,
    /// Cached reference to <body> element
    body_element: NodeId,
}

impl Document {
    /// Create a new document with html/head/body
    pub fn new(url: &str) -> Self {
        let mut tree = DomTree::new();

        let html = tree.create_element("html");
        let head = tree.create_element("head");
        let body = tree.create_element("body");

        tree.append_child(tree.root(), html);
        tree.append_child(html, head);
        tree.append_child(html, body);

        Self {
            tree,
            url: url.to_string(),
            html_element: html,
            head_element: head,
            body_element: body,
        }
    }

    /// Create an empty document (no structure)
    pub fn empty(url: &str) -> Self {
        Self {
            tree: DomTree::new(),
            url: url.to_string(),
            html_element: NodeId::NONE,
            head_element: NodeId::NONE,
            body_element: NodeId::NONE,
        }
    }

    /// Locate html/head/body after the tree was filled in externally
    pub fn finalize(&mut self) {
        let find = |tree: &DomTree, parent: NodeId, tag: &str| {
            tree.children(parent)
                .find(|(_, node)| node.as_element().is_some_and(|e| e.tag == tag))
                .map(|(id, _)| id)
                .unwrap_or(NodeId::NONE)
        };
        self.html_element = find(&self.tree, self.tree.root(), "html");
        self.head_element = find(&self.tree, self.html_element, "head");
        self.body_element = find(&self.tree, self.html_element, "body");
    }

    /// Get document URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get <html> element
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    /// Get <head> element
    pub fn head(&self) -> NodeId {
        self.head_element
    }

    /// Get <body> element
    pub fn body(&self) -> NodeId {
        self.body_element
    }

    /// Get element by ID
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .descendants(self.tree.root())
            .find(|&node| self.tree.get_attribute(node, "id") == Some(id))
    }

    /// Query the whole document
    pub fn query_selector_all(&self, selector: &Selector) -> NodeList {
        self.tree.query_selector_all(self.tree.root(), selector)
    }

    /// First match in the whole document
    pub fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        self.tree.query_selector(self.tree.root(), selector)
    }

    /// Access the DOM tree
    pub fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// Access the DOM tree mutably
    pub fn tree_mut(&mut self) -> &mut DomTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}
