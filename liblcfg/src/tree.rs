//! Phase 3: Tree Builder
//!
//! Rebuilds the nested structure from the flat bindings. Every intermediate
//! path component becomes a collection node, every final component a leaf.
//! Whether a collection is a list or a map is not known while building; a
//! single inference pass afterwards decides it from the key of each
//! collection's first child.
//!
//! New children are prepended, so siblings appear in reverse order of first
//! discovery.

use std::collections::VecDeque;
use std::fmt;

use crate::bindings::Bindings;
use crate::path;

/// Structural type of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    String,
    List,
    Map,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::String => "string",
            NodeKind::List => "list",
            NodeKind::Map => "map",
        })
    }
}

/// Kind of a collection node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    List,
    Map,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    Leaf(Vec<u8>),
    Collection {
        kind: CollectionKind,
        children: VecDeque<Node>,
    },
}

/// A node of the configuration tree. Only the root has no key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    key: Option<String>,
    value: NodeValue,
}

/// Result of a typed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// Nothing exists at the path.
    NotFound,
    /// Something exists at the path, but of the given other kind.
    WrongKind(NodeKind),
    Found(&'a Node),
}

impl<'a> Lookup<'a> {
    pub fn found(self) -> Option<&'a Node> {
        match self {
            Lookup::Found(node) => Some(node),
            Lookup::NotFound | Lookup::WrongKind(_) => None,
        }
    }
}

/// Build the tree for `bindings` and infer collection kinds.
///
/// Values are copied; the tree does not borrow from the bindings.
pub fn build_tree(bindings: &Bindings) -> Node {
    let mut root = Node::collection(None);
    for binding in bindings {
        let components: Vec<&str> = path::components(binding.path()).collect();
        root.insert(&components, binding.value());
    }
    root.infer_kinds();
    root
}

impl Node {
    fn collection(key: Option<&str>) -> Self {
        Self {
            key: key.map(String::from),
            value: NodeValue::Collection {
                kind: CollectionKind::Map,
                children: VecDeque::new(),
            },
        }
    }

    fn leaf(key: &str, value: &[u8]) -> Self {
        Self {
            key: Some(key.to_string()),
            value: NodeValue::Leaf(value.to_vec()),
        }
    }

    /// This node's own path component; `None` for the root.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn value(&self) -> &NodeValue {
        &self.value
    }

    pub fn kind(&self) -> NodeKind {
        match &self.value {
            NodeValue::Leaf(_) => NodeKind::String,
            NodeValue::Collection {
                kind: CollectionKind::List,
                ..
            } => NodeKind::List,
            NodeValue::Collection {
                kind: CollectionKind::Map,
                ..
            } => NodeKind::Map,
        }
    }

    /// Leaf bytes, if this is a leaf.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.value {
            NodeValue::Leaf(bytes) => Some(bytes),
            NodeValue::Collection { .. } => None,
        }
    }

    /// Children in their stored (reverse discovery) order. Empty for leaves.
    pub fn children(&self) -> impl Iterator<Item = &Node> {
        let children = match &self.value {
            NodeValue::Collection { children, .. } => Some(children.iter()),
            NodeValue::Leaf(_) => None,
        };
        children.into_iter().flatten()
    }

    /// Direct child with the given key.
    pub fn child(&self, key: &str) -> Option<&Node> {
        self.children().find(|c| c.key() == Some(key))
    }

    /// Node at a dotted path relative to this one. The empty path is `self`.
    pub fn find(&self, path: &str) -> Option<&Node> {
        let mut node = self;
        for key in path::components(path) {
            node = node.child(key)?;
        }
        Some(node)
    }

    /// Typed lookup distinguishing a missing path from a shape mismatch.
    pub fn get(&self, path: &str, kind: NodeKind) -> Lookup<'_> {
        match self.find(path) {
            None => Lookup::NotFound,
            Some(node) if node.kind() != kind => Lookup::WrongKind(node.kind()),
            Some(node) => Lookup::Found(node),
        }
    }

    pub fn get_string(&self, path: &str) -> Lookup<'_> {
        self.get(path, NodeKind::String)
    }

    pub fn get_list(&self, path: &str) -> Lookup<'_> {
        self.get(path, NodeKind::List)
    }

    pub fn get_map(&self, path: &str) -> Lookup<'_> {
        self.get(path, NodeKind::Map)
    }

    /// Insert one binding below this node.
    ///
    /// A leaf is only created if its key is new. If an intermediate component
    /// names an existing leaf the binding is dropped.
    fn insert(&mut self, components: &[&str], value: &[u8]) {
        let Some((last, parents)) = components.split_last() else {
            return;
        };
        let mut node = self;
        for key in parents {
            node = match node.child_collection(key) {
                Some(next) => next,
                None => {
                    log::debug!("dropping value below leaf {:?}", key);
                    return;
                }
            };
        }
        if let NodeValue::Collection { children, .. } = &mut node.value {
            if !children.iter().any(|c| c.key() == Some(*last)) {
                children.push_front(Node::leaf(last, value));
            }
        }
    }

    /// Find or prepend the collection child `key`. `None` if `key` is a leaf.
    fn child_collection(&mut self, key: &str) -> Option<&mut Node> {
        let NodeValue::Collection { children, .. } = &mut self.value else {
            return None;
        };
        let index = match children.iter().position(|c| c.key() == Some(key)) {
            Some(index) => index,
            None => {
                children.push_front(Node::collection(Some(key)));
                0
            }
        };
        let child = &mut children[index];
        if matches!(child.value, NodeValue::Collection { .. }) {
            Some(child)
        } else {
            None
        }
    }

    /// Decide list or map for every collection from its first child's key.
    fn infer_kinds(&mut self) {
        let mut pending: Vec<&mut Node> = vec![self];
        while let Some(node) = pending.pop() {
            if let NodeValue::Collection { kind, children } = &mut node.value {
                let first_is_index = children
                    .front()
                    .and_then(Node::key)
                    .is_some_and(is_index);
                if first_is_index {
                    *kind = CollectionKind::List;
                }
                pending.extend(children.iter_mut());
            }
        }
    }
}

/// Indented dump, one node per line.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pending: Vec<(&Node, usize)> = vec![(self, 0)];
        while let Some((node, depth)) = pending.pop() {
            write!(f, "{:width$}{}", "", node.key().unwrap_or("(none)"), width = depth)?;
            match &node.value {
                NodeValue::Leaf(bytes) => {
                    writeln!(f, " = \"{}\"", String::from_utf8_lossy(bytes))?;
                }
                NodeValue::Collection { children, .. } => {
                    writeln!(f)?;
                    pending.extend(children.iter().rev().map(|child| (child, depth + 2)));
                }
            }
        }
        Ok(())
    }
}

/// Descendants are released from a worklist, not by nested drop calls.
impl Drop for Node {
    fn drop(&mut self) {
        let NodeValue::Collection { children, .. } = &mut self.value else {
            return;
        };
        let mut pending: Vec<Node> = children.drain(..).collect();
        while let Some(mut node) = pending.pop() {
            if let NodeValue::Collection { children, .. } = &mut node.value {
                pending.extend(children.drain(..));
            }
        }
    }
}

/// Whether a key is a list index: non-empty and all decimal digits.
fn is_index(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}
