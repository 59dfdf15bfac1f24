//! DOM Tree (arena-based allocation)

use crate::{DOMTokenList, DomError, ElementData, ErrorHandler, Node, NodeId, NodeList, Selector};

/// Arena-based DOM tree for memory efficiency
///
/// Slot 0 always holds the document node.
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self { nodes: vec![Node::document()] }
    }

    /// Document node
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0 as usize)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0 as usize)
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree holds nothing besides the document node
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(Node::element(tag))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(Node::text(text.to_string()))
    }

    /// Create a detached comment node
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(Node::comment(text.to_string()))
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    ///
    /// Appending a node under itself or one of its descendants is refused,
    /// leaving the tree unchanged.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.get(parent).is_none() || self.get(child).is_none() {
            return;
        }
        if self.is_inclusive_ancestor(child, parent) {
            tracing::warn!("Refusing to append {} under its own descendant {}", child, parent);
            return;
        }
        self.detach(child);

        let last = self.nodes[parent.0 as usize].last_child;
        {
            let node = &mut self.nodes[child.0 as usize];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.0 as usize].next_sibling = child;
        } else {
            self.nodes[parent.0 as usize].first_child = child;
        }
        self.nodes[parent.0 as usize].last_child = child;
    }

    /// Whether `ancestor` is `node` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = node;
        while let Some(n) = self.get(current) {
            if current == ancestor {
                return true;
            }
            current = n.parent;
        }
        false
    }

    /// Unlink a node from its parent and siblings
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else { return };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.0 as usize].next_sibling = next;
        } else {
            self.nodes[parent.0 as usize].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.0 as usize].prev_sibling = prev;
        } else {
            self.nodes[parent.0 as usize].last_child = prev;
        }

        let node = &mut self.nodes[id.0 as usize];
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
    }

    /// Iterate direct children
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children { tree: self, next }
    }

    /// Iterate descendants of `id` in document order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Descendants { tree: self, root: id, next }
    }

    /// Check if the node is an element
    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(Node::is_element)
    }

    /// Element data of a node
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    /// Mutable element data of a node
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(Node::as_element_mut)
    }

    fn expect_element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        self.element_mut(id).ok_or(DomError::NotAnElement(id))
    }

    /// Get an attribute value
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.get_attr(name))
    }

    /// Check attribute presence
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_attr(name))
    }

    /// Set an attribute
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.expect_element_mut(id)?.set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute, returning its old value
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.element_mut(id).and_then(|e| e.remove_attr(name))
    }

    /// Attribute names in insertion order
    pub fn attribute_names(&self, id: NodeId) -> Vec<&str> {
        self.element(id)
            .map(|e| e.attrs.get_attribute_names())
            .unwrap_or_default()
    }

    /// Class tokens of an element
    pub fn class_list(&self, id: NodeId) -> DOMTokenList {
        self.element(id).map(ElementData::class_list).unwrap_or_default()
    }

    /// Add class tokens to an element
    pub fn add_class(&mut self, id: NodeId, tokens: &[&str]) -> Result<(), DomError> {
        self.expect_element_mut(id)?.add_classes(tokens);
        Ok(())
    }

    /// Install a resource error handler on an element
    pub fn set_onerror(&mut self, id: NodeId, handler: ErrorHandler) -> Result<(), DomError> {
        self.expect_element_mut(id)?.set_onerror(handler);
        Ok(())
    }

    /// Report a failed resource fetch for an element.
    ///
    /// Runs the installed handler once and returns whether one ran.
    pub fn dispatch_resource_error(&mut self, id: NodeId) -> bool {
        let fired = self.element_mut(id).is_some_and(ElementData::fire_error);
        if fired {
            tracing::debug!("Resource error handled on {}", id);
        }
        fired
    }

    /// All descendants of `root` matching `selector`, in document order
    pub fn query_selector_all(&self, root: NodeId, selector: &Selector) -> NodeList {
        NodeList::from_vec(
            self.descendants(root)
                .filter(|&id| self.element(id).is_some_and(|e| selector.matches(e)))
                .collect(),
        )
    }

    /// First descendant of `root` matching `selector`
    pub fn query_selector(&self, root: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(root)
            .find(|&id| self.element(id).is_some_and(|e| selector.matches(e)))
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Pre-order iterator over a subtree, excluding its root
pub struct Descendants<'a> {
    tree: &'a DomTree,
    root: NodeId,
    next: NodeId,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next;
        let node = self.tree.get(current)?;

        self.next = if node.first_child.is_valid() {
            node.first_child
        } else {
            let mut cursor = current;
            loop {
                if cursor == self.root {
                    break NodeId::NONE;
                }
                let Some(n) = self.tree.get(cursor) else { break NodeId::NONE };
                if n.next_sibling.is_valid() {
                    break n.next_sibling;
                }
                cursor = n.parent;
            }
        };
        Some(current)
    }
}
