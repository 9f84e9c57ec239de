//! DOM Tree (arena-based allocation)
//!
//! Detached nodes stay in the arena until the tree is dropped; a node is
//! "in the document" when walking `parent` links reaches the root.

use crate::{DomError, Node, NodeData, NodeId};

/// Arena-based DOM tree for memory efficiency
#[derive(Debug, Clone)]
pub struct DomTree {
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new tree holding only the root node
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::document()],
        }
    }

    /// Root node
    #[inline]
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

    /// Number of nodes in the arena (attached or not)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(Node::element(name))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.push(Node::text(content))
    }

    /// Create a detached comment
    pub fn create_comment(&mut self, content: &str) -> NodeId {
        self.push(Node::comment(content))
    }

    /// Create a detached node from raw data
    pub fn create_node(&mut self, data: NodeData) -> NodeId {
        let mut node = Node::document();
        node.data = data;
        self.push(node)
    }

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.get(id).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.get_mut(id).ok_or(DomError::UnknownNode(id))
    }

    /// Parent of a node, if attached
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(|p| p.is_valid())
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Whether the node is reachable from the root
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.is_inclusive_ancestor(NodeId::ROOT, id)
    }

    /// Unlink a node from its parent and siblings. No-op for detached nodes.
    pub fn detach(&mut self, id: NodeId) -> Result<(), DomError> {
        let (parent, prev, next) = {
            let node = self.node(id)?;
            (node.parent, node.prev_sibling, node.next_sibling)
        };
        if !parent.is_valid() {
            return Ok(());
        }

        if prev.is_valid() {
            self.node_mut(prev)?.next_sibling = next;
        } else {
            self.node_mut(parent)?.first_child = next;
        }
        if next.is_valid() {
            self.node_mut(next)?.prev_sibling = prev;
        } else {
            self.node_mut(parent)?.last_child = prev;
        }

        let node = self.node_mut(id)?;
        node.parent = NodeId::NONE;
        node.prev_sibling = NodeId::NONE;
        node.next_sibling = NodeId::NONE;
        Ok(())
    }

    /// Insert `child` into `parent` before `reference` (append when NONE)
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if reference.is_valid() && self.node(reference)?.parent != parent {
            return Err(DomError::Detached(reference));
        }
        self.detach(child)?;

        let prev = if reference.is_valid() {
            self.node(reference)?.prev_sibling
        } else {
            self.node(parent)?.last_child
        };

        {
            let node = self.node_mut(child)?;
            node.parent = parent;
            node.prev_sibling = prev;
            node.next_sibling = reference;
        }
        if prev.is_valid() {
            self.node_mut(prev)?.next_sibling = child;
        } else {
            self.node_mut(parent)?.first_child = child;
        }
        if reference.is_valid() {
            self.node_mut(reference)?.prev_sibling = child;
        } else {
            self.node_mut(parent)?.last_child = child;
        }
        Ok(())
    }

    /// Append a child node
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, NodeId::NONE)
    }

    /// Insert a child node before the current first child
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let first = self.node(parent)?.first_child;
        self.insert_before(parent, child, first)
    }

    /// Put `replacement` where `old` is and detach `old`
    pub fn replace(&mut self, old: NodeId, replacement: NodeId) -> Result<(), DomError> {
        let parent = self.parent(old).ok_or(DomError::Detached(old))?;
        self.insert_before(parent, replacement, old)?;
        self.detach(old)
    }

    /// Iterate over the direct children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children { tree: self, next }
    }

    /// Child ids, collected so the tree can be mutated while walking them
    pub fn child_ids(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id).map(|(child, _)| child).collect()
    }

    /// All descendants in document (pre-)order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_ids(id).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.child_ids(current).into_iter().rev());
        }
        out
    }

    /// Lower-case tag name of an element
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.get(id)?.as_element().map(|e| e.name.as_str())
    }

    /// Attribute of an element
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.get(id)?.as_element()?.get_attr(name)
    }

    /// Set an attribute on an element
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> Result<(), DomError> {
        self.node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))?
            .set_attr(name, value);
        Ok(())
    }

    /// Remove an attribute from an element
    pub fn remove_attr(&mut self, id: NodeId, name: &str) -> Result<Option<String>, DomError> {
        Ok(self
            .node_mut(id)?
            .as_element_mut()
            .ok_or(DomError::NotAnElement(id))?
            .remove_attr(name))
    }

    /// First element child of a node
    pub fn first_element_child(&self, id: NodeId) -> Option<NodeId> {
        self.children(id)
            .find(|(_, node)| node.is_element())
            .map(|(child, _)| child)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.get(d).and_then(|n| n.as_text()))
            .collect()
    }

    /// Deep-copy `node` (and its subtree) out of `source` into this arena.
    /// The copy is returned detached.
    pub fn import(&mut self, source: &DomTree, node: NodeId) -> Result<NodeId, DomError> {
        let data = source.node(node)?.data.clone();
        let copy = self.create_node(data);
        for child in source.child_ids(node) {
            let child_copy = self.import(source, child)?;
            self.append_child(copy, child_copy)?;
        }
        Ok(copy)
    }

    /// Replace `node` with copies of `nodes` taken from `source`, in order.
    /// An empty list simply removes `node`.
    pub fn replace_with_imports(
        &mut self,
        node: NodeId,
        source: &DomTree,
        nodes: &[NodeId],
    ) -> Result<Vec<NodeId>, DomError> {
        let parent = self.parent(node).ok_or(DomError::Detached(node))?;
        let mut inserted = Vec::with_capacity(nodes.len());
        for &source_node in nodes {
            let copy = self.import(source, source_node)?;
            self.insert_before(parent, copy, node)?;
            inserted.push(copy);
        }
        self.detach(node)?;
        Ok(inserted)
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
        if !self.next.is_valid() {
            return None;
        }
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tree: &DomTree, parent: NodeId) -> Vec<String> {
        tree.children(parent)
            .map(|(_, n)| match &n.data {
                NodeData::Element(e) => e.name.clone(),
                NodeData::Text(t) => t.clone(),
                _ => String::new(),
            })
            .collect()
    }

    #[test]
    fn test_append_prepend_insert() {
        let mut tree = DomTree::new();
        let ul = tree.create_element("ul");
        tree.append_child(tree.root(), ul).unwrap();

        let b = tree.create_element("b");
        let a = tree.create_element("a");
        let c = tree.create_element("c");
        tree.append_child(ul, b).unwrap();
        tree.prepend_child(ul, a).unwrap();
        tree.append_child(ul, c).unwrap();

        assert_eq!(names(&tree, ul), vec!["a", "b", "c"]);

        let x = tree.create_element("x");
        tree.insert_before(ul, x, c).unwrap();
        assert_eq!(names(&tree, ul), vec!["a", "b", "x", "c"]);
    }

    #[test]
    fn test_detach_and_replace() {
        let mut tree = DomTree::new();
        let div = tree.create_element("div");
        tree.append_child(tree.root(), div).unwrap();
        let a = tree.create_text("a");
        let b = tree.create_text("b");
        tree.append_child(div, a).unwrap();
        tree.append_child(div, b).unwrap();

        let z = tree.create_text("z");
        tree.replace(a, z).unwrap();
        assert_eq!(names(&tree, div), vec!["z", "b"]);
        assert!(!tree.is_connected(a));

        tree.detach(b).unwrap();
        assert_eq!(names(&tree, div), vec!["z"]);
        assert_eq!(tree.get(div).unwrap().last_child, z);
    }

    #[test]
    fn test_cannot_insert_into_own_subtree() {
        let mut tree = DomTree::new();
        let outer = tree.create_element("div");
        let inner = tree.create_element("span");
        tree.append_child(outer, inner).unwrap();

        assert_eq!(
            tree.append_child(inner, outer),
            Err(DomError::HierarchyRequest { parent: inner, child: outer })
        );
    }

    #[test]
    fn test_descendants_document_order() {
        let mut tree = DomTree::new();
        let a = tree.create_element("a");
        let b = tree.create_element("b");
        let c = tree.create_element("c");
        let d = tree.create_element("d");
        tree.append_child(tree.root(), a).unwrap();
        tree.append_child(a, b).unwrap();
        tree.append_child(b, c).unwrap();
        tree.append_child(a, d).unwrap();

        assert_eq!(tree.descendants(tree.root()), vec![a, b, c, d]);
    }

    #[test]
    fn test_import_copies_subtree() {
        let mut source = DomTree::new();
        let p = source.create_element("p");
        let t = source.create_text("hello");
        source.append_child(p, t).unwrap();
        source.set_attr(p, "class", "intro").unwrap();

        let mut target = DomTree::new();
        let copy = target.import(&source, p).unwrap();
        assert_eq!(target.tag_name(copy), Some("p"));
        assert_eq!(target.attr(copy, "class"), Some("intro"));
        assert_eq!(target.text_content(copy), "hello");
        assert!(!target.is_connected(copy));
    }
}
