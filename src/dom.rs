//! In-memory element tree the page helpers operate on.
//!
//! Nodes live in an arena keyed by [`NodeId`]. Detaching a node keeps it in
//! the arena (it can be re-attached); [`Document::release`] frees a whole
//! subtree for good.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{Result, UiError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    value: String,
    disabled: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Self::default()
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn is(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.iter().any(|c| c == name)
    }

    pub fn add_class(&mut self, name: &str) {
        if !name.is_empty() && !self.has_class(name) {
            self.classes.push(name.to_string());
        }
    }

    pub fn add_classes(&mut self, names: &[&str]) {
        for name in names {
            self.add_class(name);
        }
    }

    /// Replaces the class list with the whitespace-separated names in `list`.
    pub fn set_class_name(&mut self, list: &str) {
        self.classes.clear();
        for name in list.split_whitespace() {
            self.add_class(name);
        }
    }

    pub fn remove_class(&mut self, name: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != name);
        before != self.classes.len()
    }

    pub fn remove_classes(&mut self, names: &[&str]) {
        self.classes.retain(|c| !names.contains(&c.as_str()));
    }

    /// Returns whether the class is present afterwards.
    pub fn toggle_class(&mut self, name: &str) -> bool {
        if self.remove_class(name) {
            false
        } else {
            self.add_class(name);
            true
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, property: &str, value: impl Into<String>) {
        self.styles.insert(property.to_string(), value.into());
    }

    pub fn is_hidden(&self) -> bool {
        self.style("display") == Some("none")
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// The element tree: `html` root with `head` and `body` children.
#[derive(Debug)]
pub struct Document {
    nodes: HashMap<NodeId, Element>,
    next_id: usize,
    root: NodeId,
    head: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
    selected: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: HashMap::new(),
            next_id: 0,
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
            focused: None,
            selected: None,
        };
        doc.root = doc.create_element("html");
        doc.head = doc.create_element("head");
        doc.body = doc.create_element("body");
        // root, head and body are fresh and distinct, neither append can fail
        let (root, head, body) = (doc.root, doc.head, doc.body);
        doc.link(root, head);
        doc.link(root, body);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Element::new(tag));
        id
    }

    pub fn exists(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn element(&self, id: NodeId) -> Result<&Element> {
        self.nodes.get(&id).ok_or(UiError::NoSuchNode(id))
    }

    pub fn element_mut(&mut self, id: NodeId) -> Result<&mut Element> {
        self.nodes.get_mut(&id).ok_or(UiError::NoSuchNode(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|el| el.parent)
    }

    /// Moves `child` (and its subtree) to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.element(parent)?;
        self.element(child)?;
        if self.contains(child, parent) {
            return Err(UiError::Hierarchy { parent, child });
        }
        self.detach(child);
        self.link(parent, child);
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(el) = self.nodes.get_mut(&parent) {
            el.children.push(child);
        }
        if let Some(el) = self.nodes.get_mut(&child) {
            el.parent = Some(parent);
        }
    }

    /// Unhooks `id` from its parent. Returns `false` when it had none.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };
        if let Some(el) = self.nodes.get_mut(&parent) {
            el.children.retain(|c| *c != id);
        }
        if let Some(el) = self.nodes.get_mut(&id) {
            el.parent = None;
        }
        if self.focused.is_some_and(|f| self.contains(id, f)) {
            self.focused = None;
        }
        if self.selected.is_some_and(|s| self.contains(id, s)) {
            self.selected = None;
        }
        true
    }

    /// Detaches `id` and frees it with all its descendants.
    /// Returns every freed id, `id` first.
    pub fn release(&mut self, id: NodeId) -> Vec<NodeId> {
        if !self.exists(id) {
            return Vec::new();
        }
        self.detach(id);
        let mut freed = vec![id];
        freed.extend(self.descendants(id));
        for node in &freed {
            self.nodes.remove(node);
        }
        freed
    }

    /// Whether `id` is reachable from the root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.exists(id) && self.contains(self.root, id)
    }

    /// Inclusive ancestry test: a node contains itself.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return self.exists(current);
            }
            cursor = self.parent(current);
        }
        false
    }

    /// `id` followed by its ancestors up to the topmost one.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cursor = self.exists(id).then_some(id);
        while let Some(current) = cursor {
            chain.push(current);
            cursor = self.parent(current);
        }
        chain
    }

    /// Descendants of `root` in document order, `root` excluded.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.nodes.get(&root) {
            Some(el) => el.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(el) = self.nodes.get(&id) {
                stack.extend(el.children.iter().rev().copied());
            }
        }
        out
    }

    pub fn query_all(&self, root: NodeId, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(&pred))
            .collect()
    }

    pub fn query(&self, root: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.descendants(root)
            .into_iter()
            .find(|id| self.nodes.get(id).is_some_and(&pred))
    }

    /// First element in the whole document carrying `attribute`.
    pub fn query_attribute(&self, attribute: &str) -> Option<NodeId> {
        self.query(self.root, |el| el.has_attribute(attribute))
    }

    /// Nearest inclusive ancestor with the given tag.
    pub fn closest(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.ancestors(id)
            .into_iter()
            .find(|node| self.nodes.get(node).is_some_and(|el| el.is(tag)))
    }

    pub fn focus(&mut self, id: NodeId) -> Result<()> {
        self.element(id)?;
        self.focused = Some(id);
        Ok(())
    }

    pub fn blur(&mut self) -> Option<NodeId> {
        self.focused.take()
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused.filter(|id| self.exists(*id))
    }

    /// Selects the whole value (or text) of `id`.
    pub fn select(&mut self, id: NodeId) -> Result<()> {
        self.element(id)?;
        self.selected = Some(id);
        Ok(())
    }

    pub fn selection(&self) -> Option<&str> {
        let el = self.nodes.get(&self.selected?)?;
        if el.is("input") || el.is("textarea") {
            Some(el.value())
        } else {
            Some(el.text())
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
