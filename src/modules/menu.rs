//! Collapsible navigation menu for narrow layouts.

use crate::dom::NodeId;
use crate::events::{EventKind, Subscription, Target};
use crate::page::Page;

pub const BUTTON_ATTR: &str = "data-mobile-menu-button";
pub const MENU_ATTR: &str = "data-mobile-menu";

/// Wires the menu button and the click-outside-to-close behaviour. Pages
/// without both elements get an empty subscription.
pub fn initialize(page: &mut Page) -> Subscription {
    let mut subscription = Subscription::new();
    let (Some(button), Some(menu)) = (
        page.document.query_attribute(BUTTON_ATTR),
        page.document.query_attribute(MENU_ATTR),
    ) else {
        return subscription;
    };

    subscription.push(page.add_listener(Target::Node(button), EventKind::Click, move |page, _| {
        toggle(page, menu);
    }));
    subscription.push(page.add_listener(Target::Document, EventKind::Click, move |page, event| {
        let inside = page.document.contains(button, event.target) || page.document.contains(menu, event.target);
        if !inside {
            close(page, menu);
        }
    }));
    subscription
}

pub fn is_open(page: &Page, menu: NodeId) -> bool {
    page.document.element(menu).is_ok_and(|el| el.has_class("show"))
}

pub fn open(page: &mut Page, menu: NodeId) {
    if let Ok(el) = page.document.element_mut(menu) {
        el.remove_class("hide");
        el.add_class("show");
    }
}

pub fn close(page: &mut Page, menu: NodeId) {
    if let Ok(el) = page.document.element_mut(menu) {
        el.remove_class("show");
        el.add_class("hide");
    }
}

pub fn toggle(page: &mut Page, menu: NodeId) {
    if is_open(page, menu) {
        close(page, menu);
    } else {
        open(page, menu);
    }
}
