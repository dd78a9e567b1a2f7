use tracing::debug;

use crate::page::Page;

/// Rules the helpers rely on: toast slide-in, drop-zone highlight, fades.
pub const STYLESHEET: &str = r#"
.notification-toast.show {
    transform: translateX(0);
}

.drag-active {
    border-color: #3b82f6 !important;
    background-color: rgba(59, 130, 246, 0.05) !important;
}

.dark .drag-active {
    background-color: rgba(59, 130, 246, 0.1) !important;
}

.fade-in {
    animation: fadeIn 0.5s ease-in-out;
}

@keyframes fadeIn {
    from { opacity: 0; transform: translateY(20px); }
    to { opacity: 1; transform: translateY(0); }
}

.pulse-slow {
    animation: pulse 2s infinite;
}
"#;

/// Appends the stylesheet to the head once per page.
pub fn install(page: &mut Page) -> bool {
    if !page.claim_stylesheet() {
        return false;
    }
    let style = page.document.create_element("style");
    let head = page.document.head();
    if let Ok(el) = page.document.element_mut(style) {
        el.set_text(STYLESHEET);
    }
    let _ = page.document.append_child(head, style);
    debug!("stylesheet installed");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_exactly_once() {
        let mut page = Page::default();
        assert!(install(&mut page));
        assert!(!install(&mut page));
        let head = page.document.head();
        let styles = page.document.query_all(head, |el| el.is("style"));
        assert_eq!(styles.len(), 1);
        assert!(page.document.element(styles[0]).unwrap().text().contains(".drag-active"));
    }
}
