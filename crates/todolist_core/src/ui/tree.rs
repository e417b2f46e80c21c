//! Arena-backed node tree.
//!
//! # Responsibility
//! - Create element nodes from a tag and an attribute list.
//! - Maintain parent/child links for insertion, reordering and detachment.
//! - Answer class, attribute, form-state and selector queries.
//!
//! # Invariants
//! - `NodeId`s are never reused; detached nodes stay addressable.
//! - Nodes are never freed, so the arena grows for the life of the tree.
//! - A node is never inserted below itself.

use crate::ui::selector::Selector;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type UiResult<T> = Result<T, UiError>;

/// Handle to one node inside a `UiTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// UI tree and template errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    UnknownTemplate(String),
    InvalidSelector(String),
    NodeNotFound(NodeId),
    /// Insertion would make a node its own ancestor.
    HierarchyCycle { parent: NodeId, child: NodeId },
}

impl Display for UiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownTemplate(name) => write!(f, "unknown template: {name}"),
            Self::InvalidSelector(value) => write!(f, "unsupported selector: `{value}`"),
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::HierarchyCycle { parent, child } => {
                write!(f, "cannot insert node {child} below its descendant {parent}")
            }
        }
    }
}

impl Error for UiError {}

#[derive(Debug, Clone, Default)]
struct NodeData {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: BTreeSet<String>,
    text: String,
    value: String,
    checked: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Node hierarchy owned by one document.
#[derive(Debug, Default)]
pub struct UiTree {
    nodes: Vec<NodeData>,
}

impl UiTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached element.
    ///
    /// Attributes with a `None` value are omitted. `class` fills the class set
    /// and `checked` sets the checkbox flag; both are also kept as attributes.
    pub fn create_element(&mut self, tag: &str, attrs: &[(&str, Option<&str>)]) -> NodeId {
        let mut node = NodeData {
            tag: tag.to_ascii_lowercase(),
            ..NodeData::default()
        };
        for (name, value) in attrs {
            let Some(value) = value else {
                continue;
            };
            match *name {
                "class" => node
                    .classes
                    .extend(value.split_whitespace().map(str::to_string)),
                "checked" => node.checked = true,
                "value" => node.value = (*value).to_string(),
                _ => {}
            }
            node.attrs.insert((*name).to_string(), (*value).to_string());
        }

        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    /// Inserts `child` as the last child of `parent`, moving it if attached elsewhere.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> UiResult<()> {
        self.insert_child(parent, child, false)
    }

    /// Inserts `child` as the first child of `parent`, moving it if attached elsewhere.
    pub fn prepend(&mut self, parent: NodeId, child: NodeId) -> UiResult<()> {
        self.insert_child(parent, child, true)
    }

    /// Removes `node` from its parent. Detaching a root is a no-op.
    pub fn detach(&mut self, node: NodeId) -> UiResult<()> {
        let parent = self.node(node)?.parent;
        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|child| *child != node);
            self.node_mut(node)?.parent = None;
        }
        Ok(())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|data| data.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map_or(&[], |data| data.children.as_slice())
    }

    /// Returns `node` followed by its ancestors up to the root.
    pub fn path_to_root(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = self.contains(node).then_some(node);
        while let Some(current) = cursor {
            path.push(current);
            cursor = self.parent(current);
        }
        path
    }

    /// Returns whether `node` is `root` or lives below it.
    pub fn is_attached(&self, node: NodeId, root: NodeId) -> bool {
        self.path_to_root(node).contains(&root)
    }

    /// Descendants of `root` in document order, excluding `root`.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|data| data.tag.as_str())
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(node.0)
            .and_then(|data| data.attrs.get(name))
            .map(String::as_str)
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(node.0)
            .is_some_and(|data| data.classes.contains(class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> UiResult<()> {
        self.node_mut(node)?.classes.insert(class.to_string());
        Ok(())
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> UiResult<()> {
        self.node_mut(node)?.classes.remove(class);
        Ok(())
    }

    /// Adds or removes `class` so that its presence equals `enabled`.
    pub fn set_class(&mut self, node: NodeId, class: &str, enabled: bool) -> UiResult<()> {
        if enabled {
            self.add_class(node, class)
        } else {
            self.remove_class(node, class)
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|data| data.text.as_str())
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) -> UiResult<()> {
        self.node_mut(node)?.text = text.to_string();
        Ok(())
    }

    /// Current form value of an input-like node.
    pub fn value(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node.0).map(|data| data.value.as_str())
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) -> UiResult<()> {
        self.node_mut(node)?.value = value.to_string();
        Ok(())
    }

    pub fn is_checked(&self, node: NodeId) -> bool {
        self.nodes.get(node.0).is_some_and(|data| data.checked)
    }

    pub fn set_checked(&mut self, node: NodeId, checked: bool) -> UiResult<()> {
        self.node_mut(node)?.checked = checked;
        Ok(())
    }

    /// First descendant of `root` (document order) matching `selector`.
    pub fn query_selector(&self, root: NodeId, selector: &str) -> UiResult<Option<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(root)
            .into_iter()
            .find(|node| selector.matches(self, *node)))
    }

    /// All descendants of `root` (document order) matching `selector`.
    pub fn query_selector_all(&self, root: NodeId, selector: &str) -> UiResult<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(root)
            .into_iter()
            .filter(|node| selector.matches(self, *node))
            .collect())
    }

    fn insert_child(&mut self, parent: NodeId, child: NodeId, front: bool) -> UiResult<()> {
        self.node(parent)?;
        self.node(child)?;
        if self.is_attached(parent, child) {
            return Err(UiError::HierarchyCycle { parent, child });
        }

        self.detach(child)?;
        let children = &mut self.node_mut(parent)?.children;
        if front {
            children.insert(0, child);
        } else {
            children.push(child);
        }
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn node(&self, id: NodeId) -> UiResult<&NodeData> {
        self.nodes.get(id.0).ok_or(UiError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> UiResult<&mut NodeData> {
        self.nodes.get_mut(id.0).ok_or(UiError::NodeNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::{UiError, UiTree};

    #[test]
    fn create_element_skips_none_attrs_and_splits_classes() {
        let mut tree = UiTree::new();
        let node = tree.create_element(
            "INPUT",
            &[
                ("class", Some("form-check-input  extra")),
                ("checked", None),
                ("id", Some("todo-1")),
            ],
        );

        assert_eq!(tree.tag(node), Some("input"));
        assert!(tree.has_class(node, "form-check-input"));
        assert!(tree.has_class(node, "extra"));
        assert!(!tree.is_checked(node));
        assert_eq!(tree.attr(node, "checked"), None);
        assert_eq!(tree.attr(node, "id"), Some("todo-1"));
    }

    #[test]
    fn prepend_moves_node_from_previous_parent() {
        let mut tree = UiTree::new();
        let first = tree.create_element("ul", &[]);
        let second = tree.create_element("ul", &[]);
        let a = tree.create_element("li", &[]);
        let b = tree.create_element("li", &[]);

        tree.append(first, a).expect("append a");
        tree.append(second, b).expect("append b");
        tree.prepend(second, a).expect("move a");

        assert!(tree.children(first).is_empty());
        assert_eq!(tree.children(second), &[a, b]);
        assert_eq!(tree.parent(a), Some(second));
    }

    #[test]
    fn rejects_inserting_ancestor_below_descendant() {
        let mut tree = UiTree::new();
        let outer = tree.create_element("div", &[]);
        let inner = tree.create_element("div", &[]);
        tree.append(outer, inner).expect("append");

        let err = tree.append(inner, outer).unwrap_err();
        assert_eq!(
            err,
            UiError::HierarchyCycle {
                parent: inner,
                child: outer
            }
        );
    }

    #[test]
    fn detach_clears_both_links() {
        let mut tree = UiTree::new();
        let list = tree.create_element("ul", &[]);
        let item = tree.create_element("li", &[]);
        tree.append(list, item).expect("append");

        tree.detach(item).expect("detach");
        assert!(tree.children(list).is_empty());
        assert_eq!(tree.parent(item), None);
        assert!(!tree.is_attached(item, list));
    }
}
