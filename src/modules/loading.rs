//! Busy state for buttons.

use crate::dom::NodeId;
use crate::error::Result;
use crate::page::Page;

pub const DEFAULT_LOADING_TEXT: &str = "Loading...";
const ORIGINAL_CONTENT_ATTR: &str = "data-original-content";
const SPINNER_CLASS: &str = "loading-spinner";

/// Disables `button` and swaps its label for `text` plus a spinner.
/// The current label is kept on the element for [`hide_loading`].
pub fn show_loading(page: &mut Page, button: NodeId, text: &str) -> Result<()> {
    let already_loading = page.document.element(button)?.has_attribute(ORIGINAL_CONTENT_ATTR);

    let el = page.document.element_mut(button)?;
    if !already_loading {
        let original = el.text().to_string();
        el.set_attribute(ORIGINAL_CONTENT_ATTR, original);
    }
    el.set_disabled(true);
    el.set_text(text);

    if !already_loading {
        let spinner = page.document.create_element("div");
        page.document.element_mut(spinner)?.set_class_name(&format!("{SPINNER_CLASS} mr-2"));
        page.document.append_child(button, spinner)?;
    }
    Ok(())
}

/// Restores the label saved by [`show_loading`] and re-enables `button`.
pub fn hide_loading(page: &mut Page, button: NodeId) -> Result<()> {
    let el = page.document.element_mut(button)?;
    if let Some(original) = el.remove_attribute(ORIGINAL_CONTENT_ATTR) {
        el.set_text(original);
    }
    el.set_disabled(false);

    for spinner in page.document.query_all(button, |el| el.has_class(SPINNER_CLASS)) {
        page.release(spinner);
    }
    Ok(())
}

pub fn is_loading(page: &Page, button: NodeId) -> bool {
    page.document
        .element(button)
        .is_ok_and(|el| el.has_attribute(ORIGINAL_CONTENT_ATTR))
}
