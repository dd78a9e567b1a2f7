//! Highlight drop zones while something is dragged over them.

use crate::events::{EventKind, Subscription, Target};
use crate::page::Page;

pub const DROP_ZONE_ATTR: &str = "data-drop-zone";
pub const ACTIVE_CLASS: &str = "drag-active";

pub fn initialize(page: &mut Page) -> Subscription {
    let mut subscription = Subscription::new();

    // keep stray drops from reaching the default handling
    for kind in [EventKind::DragOver, EventKind::DragLeave, EventKind::Drop] {
        subscription.push(page.add_listener(Target::Document, kind, |_, event| event.prevent_default()));
    }

    let root = page.document.root();
    for zone in page.document.query_all(root, |el| el.has_attribute(DROP_ZONE_ATTR)) {
        subscription.push(page.add_listener(Target::Node(zone), EventKind::DragEnter, move |page, event| {
            event.prevent_default();
            if let Ok(el) = page.document.element_mut(zone) {
                el.add_class(ACTIVE_CLASS);
            }
        }));
        subscription.push(page.add_listener(Target::Node(zone), EventKind::DragLeave, move |page, event| {
            event.prevent_default();
            // moving onto a child of the zone is not leaving it
            let still_inside = event
                .related_target
                .is_some_and(|related| page.document.contains(zone, related));
            if !still_inside && let Ok(el) = page.document.element_mut(zone) {
                el.remove_class(ACTIVE_CLASS);
            }
        }));
        subscription.push(page.add_listener(Target::Node(zone), EventKind::Drop, move |page, event| {
            event.prevent_default();
            if let Ok(el) = page.document.element_mut(zone) {
                el.remove_class(ACTIVE_CLASS);
            }
        }));
    }
    subscription
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeId;
    use crate::events::Event;

    fn zone_page() -> (Page, NodeId, NodeId) {
        let mut page = Page::default();
        let body = page.document.body();
        let zone = page.document.create_element("div");
        let label = page.document.create_element("span");
        page.document.element_mut(zone).unwrap().set_attribute(DROP_ZONE_ATTR, "");
        page.document.append_child(body, zone).unwrap();
        page.document.append_child(zone, label).unwrap();
        (page, zone, label)
    }

    fn active(page: &Page, zone: NodeId) -> bool {
        page.document.element(zone).unwrap().has_class(ACTIVE_CLASS)
    }

    #[test]
    fn enter_highlights_and_drop_clears() {
        let (mut page, zone, _) = zone_page();
        let _sub = initialize(&mut page);

        assert!(!page.dispatch(Event::new(EventKind::DragEnter, zone)));
        assert!(active(&page, zone));
        assert!(!page.dispatch(Event::new(EventKind::Drop, zone)));
        assert!(!active(&page, zone));
    }

    #[test]
    fn leaving_onto_a_child_keeps_the_highlight() {
        let (mut page, zone, label) = zone_page();
        let _sub = initialize(&mut page);
        page.dispatch(Event::new(EventKind::DragEnter, zone));

        page.dispatch(Event::new(EventKind::DragLeave, zone).with_related_target(Some(label)));
        assert!(active(&page, zone));

        let body = page.document.body();
        page.dispatch(Event::new(EventKind::DragLeave, zone).with_related_target(Some(body)));
        assert!(!active(&page, zone));
    }

    #[test]
    fn leaving_the_window_clears_the_highlight() {
        let (mut page, zone, _) = zone_page();
        let _sub = initialize(&mut page);
        page.dispatch(Event::new(EventKind::DragEnter, zone));
        page.dispatch(Event::new(EventKind::DragLeave, zone));
        assert!(!active(&page, zone));
    }

    #[test]
    fn drops_outside_zones_are_still_prevented() {
        let (mut page, _, _) = zone_page();
        let _sub = initialize(&mut page);
        let body = page.document.body();
        assert!(!page.dispatch(Event::new(EventKind::Drop, body)));
        assert!(!page.dispatch(Event::new(EventKind::DragOver, body)));
    }
}
