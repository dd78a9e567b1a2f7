//! Inline messages for required form fields.

use tracing::warn;

use crate::dom::{Element, NodeId};
use crate::error::Result;
use crate::events::{EventKind, Subscription, Target};
use crate::page::Page;

pub const VALIDATE_ATTR: &str = "data-validate";
pub const ERROR_CLASS: &str = "validation-error";
const INVALID_CLASSES: &[&str] = &["border-red-500", "focus:border-red-500", "focus:ring-red-500"];
const ERROR_ELEMENT_CLASSES: &str = "validation-error text-sm text-red-600 dark:text-red-400 mt-1";

/// Validates required inputs of every `form[data-validate]` on blur and
/// clears their message as soon as they are edited.
pub fn initialize(page: &mut Page) -> Subscription {
    let mut subscription = Subscription::new();
    let root = page.document.root();
    let forms = page.document.query_all(root, |el| el.is("form") && el.has_attribute(VALIDATE_ATTR));

    for form in forms {
        let inputs = page.document.query_all(form, |el| el.is("input") && el.has_attribute("required"));
        for input in inputs {
            subscription.push(page.add_listener(Target::Node(input), EventKind::Blur, move |page, _| {
                if let Err(e) = validate_input(page, input) {
                    warn!(%input, error = %e, "validation skipped");
                }
            }));
            subscription.push(page.add_listener(Target::Node(input), EventKind::Input, move |page, _| {
                if let Err(e) = clear_validation_error(page, input) {
                    warn!(%input, error = %e, "clearing validation failed");
                }
            }));
        }
    }
    subscription
}

/// Constraint check in the spirit of the browser's `checkValidity`:
/// `required`, `minlength` and `maxlength`.
pub fn check_validity(input: &Element) -> bool {
    let value = input.value();
    let len = value.chars().count();
    if value.is_empty() {
        return !input.has_attribute("required");
    }
    let min_ok = input
        .attribute("minlength")
        .and_then(|v| v.parse::<usize>().ok())
        .is_none_or(|min| len >= min);
    let max_ok = input
        .attribute("maxlength")
        .and_then(|v| v.parse::<usize>().ok())
        .is_none_or(|max| len <= max);
    min_ok && max_ok
}

pub fn validation_message(input: &Element) -> &'static str {
    match input.attribute("type") {
        Some("file") => "Please select a valid file.",
        Some("password") => "Password is required.",
        _ => "This field is required.",
    }
}

/// Shows the field's message when it is invalid or blank. Returns validity.
pub fn validate_input(page: &mut Page, input: NodeId) -> Result<bool> {
    let el = page.document.element(input)?;
    let blank = el.value().trim().is_empty();
    let valid = check_validity(el);
    let message = validation_message(el);

    clear_validation_error(page, input)?;
    if !valid || blank {
        show_validation_error(page, input, message)?;
        return Ok(false);
    }
    Ok(true)
}

fn error_element(page: &Page, input: NodeId) -> Option<NodeId> {
    let parent = page.document.parent(input)?;
    page.document.query(parent, |el| el.has_class(ERROR_CLASS))
}

pub fn show_validation_error(page: &mut Page, input: NodeId, message: &str) -> Result<()> {
    page.document.element_mut(input)?.add_classes(INVALID_CLASSES);

    let error = match error_element(page, input) {
        Some(existing) => existing,
        None => {
            let created = page.document.create_element("p");
            page.document.element_mut(created)?.set_class_name(ERROR_ELEMENT_CLASSES);
            // an input outside any container keeps its classes but gets no message
            let Some(parent) = page.document.parent(input) else {
                page.release(created);
                return Ok(());
            };
            page.document.append_child(parent, created)?;
            created
        }
    };

    let el = page.document.element_mut(error)?;
    el.set_text(message);
    el.set_style("display", "block");
    Ok(())
}

pub fn clear_validation_error(page: &mut Page, input: NodeId) -> Result<()> {
    page.document.element_mut(input)?.remove_classes(INVALID_CLASSES);
    if let Some(error) = error_element(page, input) {
        page.document.element_mut(error)?.set_style("display", "none");
    }
    Ok(())
}

/// Message currently displayed next to `input`, if any.
pub fn visible_error(page: &Page, input: NodeId) -> Option<&str> {
    let el = page.document.element(error_element(page, input)?).ok()?;
    (!el.is_hidden()).then(|| el.text())
}
