//! Event values and the listener registry.

use std::fmt;
use std::rc::Rc;

use crate::dom::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
    DragEnter,
    DragOver,
    DragLeave,
    Drop,
    Blur,
    Input,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        meta: false,
        shift: false,
        alt: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone)]
pub struct Event {
    pub kind: EventKind,
    pub target: NodeId,
    pub related_target: Option<NodeId>,
    pub key: Option<Key>,
    pub modifiers: Modifiers,
    default_prevented: bool,
}

impl Event {
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            related_target: None,
            key: None,
            modifiers: Modifiers::NONE,
            default_prevented: false,
        }
    }

    pub fn key_down(target: NodeId, key: Key, modifiers: Modifiers) -> Self {
        Self {
            key: Some(key),
            modifiers,
            ..Self::new(EventKind::KeyDown, target)
        }
    }

    #[must_use]
    pub fn with_related_target(mut self, related: Option<NodeId>) -> Self {
        self.related_target = related;
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_key(&self, key: Key) -> bool {
        self.key == Some(key)
    }
}

/// Where a listener is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Document,
    Node(NodeId),
}

pub type Handler<C> = Rc<dyn Fn(&mut C, &mut Event)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Entry<C> {
    id: ListenerId,
    target: Target,
    kind: EventKind,
    handler: Handler<C>,
}

pub struct Listeners<C> {
    next_id: u64,
    entries: Vec<Entry<C>>,
}

impl<C> fmt::Debug for Listeners<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("registered", &self.entries.len())
            .finish()
    }
}

impl<C> Default for Listeners<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Listeners<C> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub fn add(
        &mut self,
        target: Target,
        kind: EventKind,
        handler: impl Fn(&mut C, &mut Event) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            target,
            kind,
            handler: Rc::new(handler),
        });
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    /// Drops every listener attached to `node`.
    pub fn remove_node(&mut self, node: NodeId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.target != Target::Node(node));
        before - self.entries.len()
    }

    /// Handlers for `kind` on `target`, in registration order.
    pub fn matching(&self, target: Target, kind: EventKind) -> Vec<Handler<C>> {
        self.entries
            .iter()
            .filter(|e| e.target == target && e.kind == kind)
            .map(|e| Rc::clone(&e.handler))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Listeners registered together and torn down together through
/// `Page::shutdown`.
#[must_use = "dropping a Subscription leaves its listeners registered"]
#[derive(Debug, Default)]
pub struct Subscription {
    ids: Vec<ListenerId>,
}

impl Subscription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: ListenerId) {
        self.ids.push(id);
    }

    pub fn merge(&mut self, other: Subscription) {
        self.ids.extend(other.ids);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub(crate) fn into_ids(self) -> Vec<ListenerId> {
        self.ids
    }
}
