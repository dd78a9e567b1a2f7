//! The page context: element tree, timers, listeners and preference store.

use std::time::Duration;

use tracing::{debug, info};

use crate::config::{KeyValueStore, MemoryStore};
use crate::dom::{Document, NodeId};
use crate::events::{Event, EventKind, Key, ListenerId, Listeners, Modifiers, Subscription, Target};
use crate::modules::{dragdrop, menu, shortcuts, styles, theme, validation};
use crate::timers::{self, Scheduler, TimerQueue};

pub struct Page {
    pub document: Document,
    timers: TimerQueue<Page>,
    listeners: Listeners<Page>,
    store: Box<dyn KeyValueStore>,
    styles_installed: bool,
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("document", &self.document.len())
            .field("timers", &self.timers)
            .field("listeners", &self.listeners)
            .finish()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(Box::new(MemoryStore::default()))
    }
}

impl Scheduler for Page {
    fn timers(&mut self) -> &mut TimerQueue<Self> {
        &mut self.timers
    }
}

impl Page {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            document: Document::new(),
            timers: TimerQueue::new(),
            listeners: Listeners::new(),
            store,
            styles_installed: false,
        }
    }

    /// Start-of-day wiring. The returned handle owns every listener
    /// registered here; hand it back to [`Page::shutdown`] to tear down.
    pub fn start(&mut self) -> Subscription {
        styles::install(self);
        theme::initialize(self);

        let mut subscription = Subscription::new();
        subscription.merge(menu::initialize(self));
        subscription.merge(dragdrop::initialize(self));
        subscription.merge(validation::initialize(self));
        subscription.merge(shortcuts::initialize(self));
        info!(listeners = subscription.len(), "page started");
        subscription
    }

    pub fn shutdown(&mut self, subscription: Subscription) -> usize {
        let removed = self.unsubscribe(subscription);
        info!(removed, "page shut down");
        removed
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> usize {
        subscription
            .into_ids()
            .into_iter()
            .filter(|id| self.listeners.remove(*id))
            .count()
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn KeyValueStore {
        self.store.as_mut()
    }

    /// Marks the stylesheet as installed; `true` only on the first call.
    pub(crate) fn claim_stylesheet(&mut self) -> bool {
        !std::mem::replace(&mut self.styles_installed, true)
    }

    pub fn add_listener(
        &mut self,
        target: Target,
        kind: EventKind,
        handler: impl Fn(&mut Page, &mut Event) + 'static,
    ) -> ListenerId {
        self.listeners.add(target, kind, handler)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Runs listeners on the target, then its ancestors, then the document.
    /// Returns `false` if any listener prevented the default action.
    pub fn dispatch(&mut self, mut event: Event) -> bool {
        let mut handlers = Vec::new();
        for node in self.document.ancestors(event.target) {
            handlers.extend(self.listeners.matching(Target::Node(node), event.kind));
        }
        handlers.extend(self.listeners.matching(Target::Document, event.kind));
        for handler in handlers {
            handler(self, &mut event);
        }
        !event.default_prevented()
    }

    pub fn click(&mut self, node: NodeId) -> bool {
        self.dispatch(Event::new(EventKind::Click, node))
    }

    /// Key press aimed at the focused element, or the body when nothing has focus.
    pub fn key_down(&mut self, key: Key, modifiers: Modifiers) -> bool {
        let target = self.document.focused().unwrap_or_else(|| self.document.body());
        self.dispatch(Event::key_down(target, key, modifiers))
    }

    pub fn request_submit(&mut self, form: NodeId) -> bool {
        debug!(%form, "submit requested");
        self.dispatch(Event::new(EventKind::Submit, form))
    }

    /// Detaches `node`, drops listeners on it and its descendants, and frees them.
    pub fn release(&mut self, node: NodeId) -> usize {
        let freed = self.document.release(node);
        for id in &freed {
            self.listeners.remove_node(*id);
        }
        freed.len()
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.next_deadline()
    }

    pub fn advance(&mut self, by: Duration) -> usize {
        timers::advance(self, by)
    }

    pub fn run_until(&mut self, deadline: Duration) -> usize {
        timers::run_until(self, deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn dispatch_bubbles_target_first_then_document() {
        let mut page = Page::default();
        let body = page.document.body();
        let div = page.document.create_element("div");
        page.document.append_child(body, div).unwrap();

        let order = Rc::new(RefCell::new(Vec::new()));
        for (target, name) in [(Target::Document, "document"), (Target::Node(body), "body"), (Target::Node(div), "div")] {
            let order = Rc::clone(&order);
            let _ = page.add_listener(target, EventKind::Click, move |_, _| order.borrow_mut().push(name));
        }

        assert!(page.click(div));
        assert_eq!(*order.borrow(), vec!["div", "body", "document"]);
    }

    #[test]
    fn prevented_default_is_reported() {
        let mut page = Page::default();
        let _ = page.add_listener(Target::Document, EventKind::Drop, |_, event| event.prevent_default());
        let body = page.document.body();
        assert!(!page.dispatch(Event::new(EventKind::Drop, body)));
        assert!(page.click(body));
    }

    #[test]
    fn release_drops_listeners_of_the_subtree() {
        let mut page = Page::default();
        let body = page.document.body();
        let div = page.document.create_element("div");
        let button = page.document.create_element("button");
        page.document.append_child(body, div).unwrap();
        page.document.append_child(div, button).unwrap();
        let _ = page.add_listener(Target::Node(button), EventKind::Click, |_, _| {});

        assert_eq!(page.release(div), 2);
        assert_eq!(page.listener_count(), 0);
    }

    #[test]
    fn start_then_shutdown_leaves_no_listeners() {
        let mut page = Page::default();
        let subscription = page.start();
        assert!(!subscription.is_empty());
        let registered = page.listener_count();
        assert_eq!(page.shutdown(subscription), registered);
        assert_eq!(page.listener_count(), 0);
    }

    #[test]
    fn key_down_targets_focus_or_body() {
        let mut page = Page::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _ = page.add_listener(Target::Document, EventKind::KeyDown, move |_, event| {
            sink.borrow_mut().push(event.target)
        });

        let body = page.document.body();
        let input = page.document.create_element("input");
        page.document.append_child(body, input).unwrap();
        page.key_down(Key::Tab, Modifiers::NONE);
        page.document.focus(input).unwrap();
        page.key_down(Key::Tab, Modifiers::NONE);

        assert_eq!(*seen.borrow(), vec![body, input]);
    }
}
