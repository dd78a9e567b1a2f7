pub mod clipboard;
pub mod debounce;
pub mod dragdrop;
pub mod format;
pub mod loading;
pub mod menu;
pub mod notifications;
pub mod shortcuts;
pub mod styles;
pub mod theme;
pub mod validation;
