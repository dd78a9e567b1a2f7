//! Toast notifications.
//!
//! A toast is a small element tree appended to the body. It slides in a few
//! milliseconds after creation (class `show`), and leaves either when its
//! duration runs out or when its close button is clicked. Leaving is a two
//! step affair: the exit classes go on first, and the element is detached
//! once the exit transition had time to play.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::debug;

use crate::dom::NodeId;
use crate::error::{Result, UiError};
use crate::events::{EventKind, Target};
use crate::page::Page;
use crate::timers::Scheduler;

/// Delay before a fresh toast gets its `show` class.
pub const SHOW_DELAY: Duration = Duration::from_millis(10);
/// How long the exit transition plays before the toast is detached.
pub const EXIT_TRANSITION: Duration = Duration::from_millis(300);
pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);

pub const TOAST_CLASS: &str = "notification-toast";
/// Set once the exit transition has started.
const DISMISSED_ATTR: &str = "data-dismissed";
const TOAST_CLASSES: &[&str] = &[
    "fixed", "top-4", "right-4", "max-w-sm", "w-full", "bg-white", "dark:bg-gray-800",
    "border-l-4", "rounded-lg", "shadow-lg", "transform", "translate-x-full",
    "transition-transform", "duration-300", "z-50", TOAST_CLASS,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::Success, Kind::Error, Kind::Warning, Kind::Info];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Success => "success",
            Kind::Error => "error",
            Kind::Warning => "warning",
            Kind::Info => "info",
        }
    }

    pub fn color_classes(&self) -> &'static [&'static str] {
        match self {
            Kind::Success => &["border-green-500", "text-green-800", "dark:text-green-200"],
            Kind::Error => &["border-red-500", "text-red-800", "dark:text-red-200"],
            Kind::Warning => &["border-yellow-500", "text-yellow-800", "dark:text-yellow-200"],
            Kind::Info => &["border-blue-500", "text-blue-800", "dark:text-blue-200"],
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Kind::Success => "✔",
            Kind::Error => "✖",
            Kind::Warning => "⚠",
            Kind::Info => "ℹ",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = UiError;

    fn from_str(s: &str) -> Result<Self> {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UiError::UnknownKind(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    message: String,
    kind: Kind,
    duration: Duration,
}

impl Notification {
    pub fn new(kind: Kind, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind,
            duration: DEFAULT_DURATION,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Kind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Kind::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Kind::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Kind::Info, message)
    }

    /// A zero duration dismisses the toast on the next drive of the timers.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

/// Shows `message` as a toast for `duration_ms`, then slides it out.
pub fn notify(page: &mut Page, message: impl Into<String>, kind: Kind, duration_ms: u64) -> NodeId {
    show(page, Notification::new(kind, message).with_duration(Duration::from_millis(duration_ms)))
}

pub fn show(page: &mut Page, notification: Notification) -> NodeId {
    let toast = build(page, &notification);
    let body = page.document.body();
    // fresh node under the body, cannot form a cycle
    let _ = page.document.append_child(body, toast);
    debug!(%toast, kind = %notification.kind, "toast shown");

    page.timers().schedule(SHOW_DELAY, move |page: &mut Page| {
        if let Ok(el) = page.document.element_mut(toast)
            && !el.has_attribute(DISMISSED_ATTR)
        {
            el.add_class("show");
        }
    });

    page.timers().schedule(notification.duration, move |page: &mut Page| dismiss(page, toast));

    let close = page.document.query(toast, |el| el.has_attribute("data-close"));
    if let Some(close) = close {
        page.add_listener(Target::Node(close), EventKind::Click, move |page, _| dismiss(page, toast));
    }
    toast
}

fn build(page: &mut Page, notification: &Notification) -> NodeId {
    let doc = &mut page.document;
    let toast = doc.create_element("div");
    let row = doc.create_element("div");
    let icon = doc.create_element("span");
    let message = doc.create_element("p");
    let close = doc.create_element("button");

    if let Ok(el) = doc.element_mut(toast) {
        el.add_classes(TOAST_CLASSES);
        el.add_classes(notification.kind.color_classes());
        el.set_attribute("data-kind", notification.kind.as_str());
        el.set_attribute("role", "status");
    }
    if let Ok(el) = doc.element_mut(row) {
        el.set_class_name("flex p-4");
    }
    if let Ok(el) = doc.element_mut(icon) {
        el.set_class_name("icon flex-shrink-0");
        el.set_text(notification.kind.icon());
    }
    if let Ok(el) = doc.element_mut(message) {
        el.set_class_name("message ml-3 flex-1 text-sm font-medium");
        el.set_text(notification.message());
    }
    if let Ok(el) = doc.element_mut(close) {
        el.set_class_name("ml-4 flex-shrink-0 text-gray-400");
        el.set_attribute("data-close", "");
        el.set_text("×");
    }

    for (parent, child) in [(toast, row), (row, icon), (row, message), (row, close)] {
        let _ = doc.append_child(parent, child);
    }
    toast
}

/// Starts the exit transition and detaches the toast once it is over.
/// Safe to call any number of times, also after the toast is gone.
pub fn dismiss(page: &mut Page, toast: NodeId) {
    let Ok(el) = page.document.element_mut(toast) else {
        return;
    };
    if el.has_attribute(DISMISSED_ATTR) {
        return;
    }
    el.set_attribute(DISMISSED_ATTR, "");
    el.remove_class("show");
    el.add_class("translate-x-full");

    page.timers().schedule(EXIT_TRANSITION, move |page: &mut Page| {
        if page.document.parent(toast).is_some() {
            page.release(toast);
            debug!(%toast, "toast removed");
        }
    });
}

/// Attached toasts in insertion order.
pub fn active_toasts(page: &Page) -> Vec<NodeId> {
    let body = page.document.body();
    page.document.query_all(body, |el| el.has_class(TOAST_CLASS))
}

/// Message text of a toast.
pub fn toast_message(page: &Page, toast: NodeId) -> Option<&str> {
    let id = page.document.query(toast, |el| el.has_class("message"))?;
    page.document.element(id).ok().map(|el| el.text())
}

/// Kind recorded on a toast element.
pub fn toast_kind(page: &Page, toast: NodeId) -> Option<Kind> {
    page.document
        .element(toast)
        .ok()?
        .attribute("data-kind")?
        .parse()
        .ok()
}
