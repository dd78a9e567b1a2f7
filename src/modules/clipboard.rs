//! Copy text to the clipboard, falling back to the platform copy command.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::dom::NodeId;
use crate::error::{Result, UiError};
use crate::modules::notifications::{self, Kind};
use crate::page::Page;

pub const COPIED_MESSAGE: &str = "Copied to clipboard!";
pub const FAILED_MESSAGE: &str = "Failed to copy to clipboard";
const COPIED_DURATION_MS: u64 = 2000;
const FAILED_DURATION_MS: u64 = 3000;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Something that can put text on the clipboard.
pub trait ClipboardWriter: Send + Sync {
    fn name(&self) -> &str;
    fn write_text(&self, text: &str) -> Result<()>;
}

fn failure(backend: &str, reason: impl ToString) -> UiError {
    UiError::Clipboard {
        backend: backend.to_string(),
        reason: reason.to_string(),
    }
}

/// The desktop clipboard through the `clipboard` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardWriter for SystemClipboard {
    fn name(&self) -> &str {
        "system"
    }

    #[cfg(feature = "clipboard")]
    fn write_text(&self, text: &str) -> Result<()> {
        use clipboard::{ClipboardContext, ClipboardProvider};
        let mut ctx: ClipboardContext = ClipboardProvider::new().map_err(|e| failure(self.name(), e))?;
        ctx.set_contents(text.to_string()).map_err(|e| failure(self.name(), e))
    }

    #[cfg(not(feature = "clipboard"))]
    fn write_text(&self, _text: &str) -> Result<()> {
        Err(failure(self.name(), "built without clipboard support"))
    }
}

/// Pipes the text into the platform's copy command.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    candidates: Vec<(String, Vec<String>)>,
}

impl Default for CommandClipboard {
    fn default() -> Self {
        Self::platform()
    }
}

impl CommandClipboard {
    /// xclip, then xsel on Linux; pbcopy on macOS; PowerShell on Windows.
    pub fn platform() -> Self {
        let candidates = if cfg!(target_os = "macos") {
            vec![candidate("pbcopy", &[])]
        } else if cfg!(target_os = "windows") {
            vec![candidate("powershell", &["-NoProfile", "-Command", "$input | Set-Clipboard"])]
        } else {
            vec![
                candidate("xclip", &["-selection", "clipboard"]),
                candidate("xsel", &["--clipboard", "--input"]),
                candidate("wl-copy", &[]),
            ]
        };
        Self::with_candidates(candidates)
    }

    pub fn with_candidates(candidates: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            candidates: candidates.into_iter().collect(),
        }
    }

    /// Runs `program` with `text` on stdin. The child is always waited on; a
    /// short write counts as a failed copy.
    fn pipe(program: &std::path::Path, args: &[String], text: &str) -> std::io::Result<bool> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        // stdin is dropped at the end of the arm, so the child sees EOF before the wait
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };
        let status = child.wait()?;
        if let Err(e) = written {
            debug!(program = %program.display(), error = %e, "copy command closed its input early");
            return Ok(false);
        }
        Ok(status.success())
    }
}

impl ClipboardWriter for CommandClipboard {
    fn name(&self) -> &str {
        "command"
    }

    fn write_text(&self, text: &str) -> Result<()> {
        for (program, args) in &self.candidates {
            let Ok(path) = which::which(program) else {
                continue;
            };
            match Self::pipe(&path, args, text) {
                Ok(true) => {
                    debug!(%program, "copied through command");
                    return Ok(());
                }
                Ok(false) => debug!(%program, "copy command exited with failure"),
                Err(e) => debug!(%program, error = %e, "copy command could not run"),
            }
        }
        Err(failure(self.name(), "no working copy command found"))
    }
}

fn candidate(program: &str, args: &[&str]) -> (String, Vec<String>) {
    (program.to_string(), args.iter().map(|a| a.to_string()).collect())
}

/// A primary writer tried first under a timeout, and a fallback used through
/// the page's selection when the primary fails.
#[derive(Clone)]
pub struct Clipboard {
    primary: Arc<dyn ClipboardWriter>,
    fallback: Arc<dyn ClipboardWriter>,
    timeout: Duration,
}

impl std::fmt::Debug for Clipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clipboard")
            .field("primary", &self.primary.name())
            .field("fallback", &self.fallback.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::system()
    }
}

impl Clipboard {
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClipboard), Arc::new(CommandClipboard::platform()))
    }

    pub fn new(primary: Arc<dyn ClipboardWriter>, fallback: Arc<dyn ClipboardWriter>) -> Self {
        Self {
            primary,
            fallback,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn write_primary(&self, text: &str) -> Result<()> {
        let writer = Arc::clone(&self.primary);
        let owned = text.to_string();
        let name = self.primary.name().to_string();
        let task = tokio::task::spawn_blocking(move || writer.write_text(&owned));
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(failure(&name, join)),
            Err(_) => Err(failure(&name, format!("timed out after {:?}", self.timeout))),
        }
    }

    /// Copies through an off-screen textarea: append it, focus and select it,
    /// always remove it, then hand the selection to the fallback writer on the
    /// blocking pool.
    async fn write_fallback(&self, page: &mut Page, text: &str) -> Result<()> {
        let previous_focus = page.document.focused();
        let area = offscreen_textarea(page, text)?;
        let selected = select_contents(page, area);
        page.release(area);
        if let Some(node) = previous_focus {
            let _ = page.document.focus(node);
        }
        let selected = selected?;

        let writer = Arc::clone(&self.fallback);
        let name = self.fallback.name().to_string();
        match tokio::task::spawn_blocking(move || writer.write_text(&selected)).await {
            Ok(result) => result,
            Err(join) => Err(failure(&name, join)),
        }
    }
}

fn select_contents(page: &mut Page, area: NodeId) -> Result<String> {
    page.document.focus(area)?;
    page.document.select(area)?;
    Ok(page.document.selection().unwrap_or_default().to_string())
}

fn offscreen_textarea(page: &mut Page, text: &str) -> Result<NodeId> {
    let area = page.document.create_element("textarea");
    let el = page.document.element_mut(area)?;
    el.set_value(text);
    el.set_style("position", "fixed");
    el.set_style("left", "-999999px");
    el.set_style("top", "-999999px");
    let body = page.document.body();
    page.document.append_child(body, area)?;
    Ok(area)
}

/// Copies `text`, raising a success or failure toast. Returns whether
/// either path succeeded.
pub async fn copy_to_clipboard(page: &mut Page, clipboard: &Clipboard, text: &str) -> bool {
    let copied = match clipboard.write_primary(text).await {
        Ok(()) => true,
        Err(primary) => {
            warn!(error = %primary, "clipboard write failed, trying fallback");
            match clipboard.write_fallback(page, text).await {
                Ok(()) => true,
                Err(fallback) => {
                    warn!(error = %fallback, "clipboard fallback failed");
                    false
                }
            }
        }
    };

    if copied {
        notifications::notify(page, COPIED_MESSAGE, Kind::Success, COPIED_DURATION_MS);
    } else {
        notifications::notify(page, FAILED_MESSAGE, Kind::Error, FAILED_DURATION_MS);
    }
    copied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::notifications::{active_toasts, toast_kind, toast_message};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Stub {
        fail: bool,
        delay: Option<Duration>,
        written: Mutex<Vec<String>>,
        threads: Mutex<Vec<std::thread::ThreadId>>,
    }

    impl Stub {
        fn ok() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { fail: true, ..Self::default() })
        }

        fn written(&self) -> Vec<String> {
            self.written.lock().unwrap().clone()
        }
    }

    impl ClipboardWriter for Stub {
        fn name(&self) -> &str {
            "stub"
        }

        fn write_text(&self, text: &str) -> Result<()> {
            self.threads.lock().unwrap().push(std::thread::current().id());
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            if self.fail {
                return Err(failure(self.name(), "denied"));
            }
            self.written.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn only_toast(page: &Page) -> (Option<Kind>, String) {
        let toasts = active_toasts(page);
        assert_eq!(toasts.len(), 1);
        (
            toast_kind(page, toasts[0]),
            toast_message(page, toasts[0]).unwrap_or_default().to_string(),
        )
    }

    #[tokio::test]
    async fn primary_success_reports_success() {
        let mut page = Page::default();
        let primary = Stub::ok();
        let fallback = Stub::ok();
        let clipboard = Clipboard::new(primary.clone(), fallback.clone());

        assert!(copy_to_clipboard(&mut page, &clipboard, "secret").await);
        assert_eq!(primary.written(), vec!["secret".to_string()]);
        assert!(fallback.written().is_empty());
        assert_eq!(only_toast(&page), (Some(Kind::Success), COPIED_MESSAGE.to_string()));
    }

    #[tokio::test]
    async fn fallback_receives_the_selected_text_and_cleans_up() {
        let mut page = Page::default();
        let fallback = Stub::ok();
        let clipboard = Clipboard::new(Stub::failing(), fallback.clone());
        let before = page.document.len();

        assert!(copy_to_clipboard(&mut page, &clipboard, "via selection").await);
        assert_eq!(fallback.written(), vec!["via selection".to_string()]);
        let textareas = page.document.query_all(page.document.root(), |el| el.is("textarea"));
        assert!(textareas.is_empty());
        assert_eq!(only_toast(&page).0, Some(Kind::Success));
        // the toast's nodes are the only additions
        assert!(page.document.len() > before);
    }

    #[tokio::test]
    async fn both_paths_failing_reports_failure() {
        let mut page = Page::default();
        let clipboard = Clipboard::new(Stub::failing(), Stub::failing());

        assert!(!copy_to_clipboard(&mut page, &clipboard, "nope").await);
        assert_eq!(only_toast(&page), (Some(Kind::Error), FAILED_MESSAGE.to_string()));
        let textareas = page.document.query_all(page.document.root(), |el| el.is("textarea"));
        assert!(textareas.is_empty());
    }

    #[tokio::test]
    async fn slow_primary_times_out_into_the_fallback() {
        let mut page = Page::default();
        let slow = Arc::new(Stub {
            delay: Some(Duration::from_millis(200)),
            ..Stub::default()
        });
        let fallback = Stub::ok();
        let clipboard = Clipboard::new(slow, fallback.clone()).with_timeout(Duration::from_millis(20));

        assert!(copy_to_clipboard(&mut page, &clipboard, "late").await);
        assert_eq!(fallback.written(), vec!["late".to_string()]);
    }

    #[tokio::test]
    async fn fallback_writer_runs_off_the_runtime_thread() {
        let mut page = Page::default();
        let fallback = Stub::ok();
        let clipboard = Clipboard::new(Stub::failing(), fallback.clone());

        assert!(copy_to_clipboard(&mut page, &clipboard, "elsewhere").await);
        let threads = fallback.threads.lock().unwrap().clone();
        assert_eq!(threads.len(), 1);
        assert_ne!(threads[0], std::thread::current().id());
    }

    #[cfg(unix)]
    #[test]
    fn command_that_ignores_its_input_is_reaped_and_reported() {
        let program = which::which("true").unwrap();
        // larger than a pipe buffer, so the write runs into the closed pipe
        let text = "x".repeat(1 << 20);
        assert!(!CommandClipboard::pipe(&program, &[], &text).unwrap());
    }

    #[test]
    fn command_clipboard_without_programs_fails() {
        let clipboard = CommandClipboard::with_candidates([(
            "definitely-not-a-copy-command-1f3a".to_string(),
            Vec::new(),
        )]);
        assert!(matches!(clipboard.write_text("x"), Err(UiError::Clipboard { .. })));
    }
}
