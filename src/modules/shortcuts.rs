//! Page-wide keyboard shortcuts.
//!
//! | Keys                  | Action                              |
//! |-----------------------|-------------------------------------|
//! | Ctrl/Cmd + D          | toggle dark mode                    |
//! | Escape                | hide every `data-alert` element     |
//! | Ctrl/Cmd + Enter      | submit the form holding the focus   |

use tracing::warn;

use crate::events::{Event, EventKind, Key, Subscription, Target};
use crate::modules::theme;
use crate::page::Page;

pub const ALERT_ATTR: &str = "data-alert";

pub fn initialize(page: &mut Page) -> Subscription {
    let mut subscription = Subscription::new();
    subscription.push(page.add_listener(Target::Document, EventKind::KeyDown, handle_key));
    subscription
}

fn handle_key(page: &mut Page, event: &mut Event) {
    let command = event.modifiers.command();

    if command && (event.is_key(Key::Char('d')) || event.is_key(Key::Char('D'))) {
        event.prevent_default();
        if let Err(e) = theme::toggle_dark_mode(page) {
            warn!(error = %e, "could not persist theme");
        }
    }

    if event.is_key(Key::Escape) {
        close_alerts(page);
    }

    if command && event.is_key(Key::Enter) {
        let form = page
            .document
            .focused()
            .and_then(|focused| page.document.closest(focused, "form"));
        if let Some(form) = form {
            event.prevent_default();
            page.request_submit(form);
        }
    }
}

/// Hides every alert banner. Returns how many were hidden.
pub fn close_alerts(page: &mut Page) -> usize {
    let root = page.document.root();
    let alerts = page.document.query_all(root, |el| el.has_attribute(ALERT_ATTR));
    for alert in &alerts {
        if let Ok(el) = page.document.element_mut(*alert) {
            el.set_style("display", "none");
        }
    }
    alerts.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeId;
    use crate::events::Modifiers;
    use std::cell::Cell;
    use std::rc::Rc;

    fn page_with_form() -> (Page, NodeId, NodeId) {
        let mut page = Page::default();
        let body = page.document.body();
        let form = page.document.create_element("form");
        let input = page.document.create_element("input");
        page.document.append_child(body, form).unwrap();
        page.document.append_child(form, input).unwrap();
        (page, form, input)
    }

    #[test]
    fn ctrl_d_toggles_theme_and_prevents_default() {
        let mut page = Page::default();
        let _sub = initialize(&mut page);
        assert!(!page.key_down(Key::Char('d'), Modifiers::CTRL));
        assert!(theme::is_dark(&page));
        let cmd = Modifiers { meta: true, ..Modifiers::NONE };
        page.key_down(Key::Char('d'), cmd);
        assert!(!theme::is_dark(&page));
    }

    #[test]
    fn plain_d_is_left_alone() {
        let mut page = Page::default();
        let _sub = initialize(&mut page);
        assert!(page.key_down(Key::Char('d'), Modifiers::NONE));
        assert!(!theme::is_dark(&page));
    }

    #[test]
    fn escape_hides_alerts() {
        let mut page = Page::default();
        let body = page.document.body();
        let alerts: Vec<_> = (0..2)
            .map(|_| {
                let alert = page.document.create_element("div");
                page.document.element_mut(alert).unwrap().set_attribute(ALERT_ATTR, "");
                page.document.append_child(body, alert).unwrap();
                alert
            })
            .collect();
        let _sub = initialize(&mut page);

        page.key_down(Key::Escape, Modifiers::NONE);
        for alert in alerts {
            assert!(page.document.element(alert).unwrap().is_hidden());
        }
    }

    #[test]
    fn ctrl_enter_submits_the_focused_form() {
        let (mut page, form, input) = page_with_form();
        let submitted = Rc::new(Cell::new(0));
        let counter = Rc::clone(&submitted);
        page.add_listener(Target::Node(form), EventKind::Submit, move |_, _| counter.set(counter.get() + 1));
        let _sub = initialize(&mut page);

        // nothing focused: no submit
        assert!(page.key_down(Key::Enter, Modifiers::CTRL));
        assert_eq!(submitted.get(), 0);

        page.document.focus(input).unwrap();
        assert!(!page.key_down(Key::Enter, Modifiers::CTRL));
        assert_eq!(submitted.get(), 1);

        page.key_down(Key::Enter, Modifiers::NONE);
        assert_eq!(submitted.get(), 1);
    }
}
