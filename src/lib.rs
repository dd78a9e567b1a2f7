//! Front-end helpers for the PDFCrypto upload page: toasts, debounce, byte
//! formatting, loading buttons, clipboard copy, dark mode and the page-wide
//! listeners, running against an in-process element tree and a virtual clock.
//! The [`crypto`] module holds the local file encryption the page drives.

pub mod config;
pub mod crypto;
pub mod dom;
pub mod error;
pub mod events;
pub mod modules;
pub mod page;
pub mod timers;

pub use error::{Result, UiError};
pub use modules::clipboard::{copy_to_clipboard, Clipboard};
pub use modules::debounce::{debounce, Debounced};
pub use modules::format::format_bytes;
pub use modules::loading::{hide_loading, show_loading};
pub use modules::notifications::{notify, Kind, Notification};
pub use modules::theme::toggle_dark_mode;
pub use page::Page;
