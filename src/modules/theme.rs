//! Light/dark theme flag on the root element, persisted in the preference store.

use tracing::debug;

use crate::error::Result;
use crate::page::Page;

pub const DARK_MODE_KEY: &str = "darkMode";
pub const DARK_CLASS: &str = "dark";
const TRANSITION_CLASSES: &[&str] = &["transition-colors", "duration-300"];

/// Adds the colour transition classes and applies the stored preference.
pub fn initialize(page: &mut Page) {
    let dark = page.store().get(DARK_MODE_KEY).as_deref() == Some("true");
    let root = page.document.root();
    if let Ok(el) = page.document.element_mut(root) {
        el.add_classes(TRANSITION_CLASSES);
        if dark {
            el.add_class(DARK_CLASS);
        } else {
            el.remove_class(DARK_CLASS);
        }
    }
}

pub fn is_dark(page: &Page) -> bool {
    page.document
        .element(page.document.root())
        .is_ok_and(|el| el.has_class(DARK_CLASS))
}

/// Flips the theme and persists the new value. Returns whether dark mode is on.
/// The class only changes once the store accepted the new value.
pub fn toggle_dark_mode(page: &mut Page) -> Result<bool> {
    let root = page.document.root();
    let dark = !page.document.element(root)?.has_class(DARK_CLASS);
    page.store_mut().set(DARK_MODE_KEY, if dark { "true" } else { "false" })?;
    let el = page.document.element_mut(root)?;
    if dark {
        el.add_class(DARK_CLASS);
    } else {
        el.remove_class(DARK_CLASS);
    }
    debug!(dark, "theme toggled");
    Ok(dark)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KeyValueStore, MemoryStore};
    use crate::error::UiError;

    /// A store whose disk is gone.
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("read-only file system")
        }
    }

    #[test]
    fn initialize_applies_the_stored_flag() {
        let mut store = MemoryStore::default();
        store.set(DARK_MODE_KEY, "true").unwrap();
        let mut page = Page::new(Box::new(store));
        initialize(&mut page);
        assert!(is_dark(&page));
        let root = page.document.element(page.document.root()).unwrap();
        assert!(root.has_class("transition-colors"));
    }

    #[test]
    fn missing_or_false_flag_means_light() {
        let mut page = Page::default();
        initialize(&mut page);
        assert!(!is_dark(&page));
    }

    #[test]
    fn toggle_round_trips_and_persists() {
        let mut page = Page::default();
        assert!(toggle_dark_mode(&mut page).unwrap());
        assert_eq!(page.store().get(DARK_MODE_KEY).as_deref(), Some("true"));
        assert!(!toggle_dark_mode(&mut page).unwrap());
        assert_eq!(page.store().get(DARK_MODE_KEY).as_deref(), Some("false"));
        assert!(!is_dark(&page));
    }

    #[test]
    fn failed_save_leaves_the_theme_alone() {
        let mut page = Page::new(Box::new(ReadOnlyStore));
        initialize(&mut page);
        assert!(matches!(toggle_dark_mode(&mut page), Err(UiError::Other(_))));
        assert!(!is_dark(&page));
        assert_eq!(page.store().get(DARK_MODE_KEY), None);
    }
}
