use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::{Position, Rect};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{info, warn};

use pdfcrypto_ui::config::{Config, KeyValueStore, UiConfig};
use pdfcrypto_ui::crypto::{self, files, password, Job, Mode};
use pdfcrypto_ui::dom::NodeId;
use pdfcrypto_ui::events::{Event, EventKind, Key, Modifiers, Subscription, Target};
use pdfcrypto_ui::modules::{
    clipboard::{self, Clipboard},
    debounce::{debounce, Debounced},
    dragdrop, format, loading, menu,
    notifications::{self, Kind},
    shortcuts, validation,
};
use pdfcrypto_ui::page::Page;
use pdfcrypto_ui::timers::Scheduler;

const TICK: Duration = Duration::from_millis(100);
/// How long a pasted path shows the drop highlight before it lands.
const DROP_FEEDBACK: Duration = Duration::from_millis(250);
const MODE_ATTR: &str = "data-mode";
const ABOUT_TEXT: &str = "PDFCrypto encrypts PDFs with a key derived from your password. Files stay on this machine.";

/// Element handles of the upload page.
#[derive(Debug, Clone, Copy)]
pub struct Nodes {
    pub alert: NodeId,
    pub menu_button: NodeId,
    pub menu: NodeId,
    pub menu_links: [NodeId; 3],
    pub form: NodeId,
    pub file_input: NodeId,
    pub password_input: NodeId,
    pub strength: NodeId,
    pub drop_zone: NodeId,
    pub file_info: NodeId,
    pub submit: NodeId,
}

pub const MENU_LABELS: [&str; 3] = ["Encrypt", "Decrypt", "About"];

/// A finished file job, handed back from the blocking pool.
#[derive(Debug)]
pub struct Outcome {
    pub mode: Mode,
    pub source: PathBuf,
    pub result: pdfcrypto_ui::Result<PathBuf>,
}

pub struct App {
    pub page: Page,
    pub nodes: Nodes,
    pub status_message: String,
    pub show_help: bool,
    /// Clickable screen areas from the last frame, topmost last.
    pub hit_regions: Vec<(Rect, NodeId)>,
    subscription: Option<Subscription>,
    clipboard: Clipboard,
    started: Instant,
    focus_order: [NodeId; 4],
    size_check: Debounced<Page, String>,
    ui: UiConfig,
    outcomes: UnboundedReceiver<Outcome>,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = Config::load()?;
        info!(path = ?config.path(), "config loaded");
        let ui = config.ui.clone();
        Self::with_store(Box::new(config), ui)
    }

    pub fn with_store(store: Box<dyn KeyValueStore>, ui: UiConfig) -> Result<Self> {
        let mut page = Page::new(store);
        let nodes = build_document(&mut page)?;
        let mut subscription = page.start();
        let (sender, outcomes) = mpsc::unbounded_channel();
        subscription.merge(wire_form(&mut page, nodes, ui.toast_duration_ms, sender));

        let file_info = nodes.file_info;
        let size_check = debounce(
            move |page: &mut Page, path: String| show_file_size(page, file_info, &path),
            ui.size_debounce(),
            false,
        );

        notifications::notify(&mut page, "Press F1 for help", Kind::Info, ui.toast_duration_ms);

        Ok(Self {
            page,
            nodes,
            status_message: String::from("Welcome to PDFCrypto! Press F1 for help"),
            show_help: false,
            hit_regions: Vec::new(),
            subscription: Some(subscription),
            clipboard: Clipboard::system().with_timeout(ui.clipboard_timeout()),
            started: Instant::now(),
            focus_order: [nodes.menu_button, nodes.file_input, nodes.password_input, nodes.submit],
            size_check,
            ui,
            outcomes,
        })
    }

    /// Fires every timer whose deadline the wall clock has passed and picks
    /// up finished file jobs.
    pub fn tick(&mut self) {
        self.page.run_until(self.started.elapsed());
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.finish(outcome);
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.status_message = finish_job(&mut self.page, self.nodes, self.ui.toast_duration_ms, outcome);
    }

    /// How long the event loop may block before a timer is due.
    pub fn poll_timeout(&self) -> Duration {
        match self.page.next_deadline() {
            Some(deadline) => deadline.saturating_sub(self.started.elapsed()).min(TICK),
            None => TICK,
        }
    }

    pub fn mode(&self) -> Mode {
        current_mode(&self.page, self.nodes.form)
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.page.document.focused()
    }

    pub fn focus_next(&mut self) {
        self.cycle_focus(1);
    }

    pub fn focus_previous(&mut self) {
        self.cycle_focus(self.focus_order.len() - 1);
    }

    fn cycle_focus(&mut self, step: usize) {
        let len = self.focus_order.len();
        let next = match self.focused().and_then(|f| self.focus_order.iter().position(|n| *n == f)) {
            Some(i) => (i + step) % len,
            None if step == 1 => 0,
            None => len - 1,
        };
        self.move_focus(Some(self.focus_order[next]));
    }

    /// Moves focus and fires `blur` on the element that lost it.
    fn move_focus(&mut self, target: Option<NodeId>) {
        let previous = self.focused();
        if previous == target {
            return;
        }
        match target {
            Some(node) => {
                if let Err(e) = self.page.document.focus(node) {
                    warn!(error = %e, "focus failed");
                    return;
                }
            }
            None => {
                self.page.document.blur();
            }
        }
        if let Some(previous) = previous {
            self.page.dispatch(Event::new(EventKind::Blur, previous));
        }
    }

    /// Keys that are not bound by the terminal itself go to the page first;
    /// editing happens only if no listener prevented the default.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let key = match code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Escape,
            KeyCode::Tab => Key::Tab,
            _ => Key::Other,
        };
        let modifiers = Modifiers {
            ctrl: modifiers.contains(KeyModifiers::CONTROL),
            meta: modifiers.contains(KeyModifiers::SUPER),
            shift: modifiers.contains(KeyModifiers::SHIFT),
            alt: modifiers.contains(KeyModifiers::ALT),
        };
        if !self.page.key_down(key, modifiers) {
            return;
        }
        if modifiers.command() || modifiers.alt {
            return;
        }

        let Some(focused) = self.focused() else {
            return;
        };
        match code {
            KeyCode::Enter if focused == self.nodes.submit || focused == self.nodes.menu_button => {
                self.page.click(focused);
            }
            KeyCode::Char(c) if self.is_text_input(focused) => self.edit(focused, |value| value.push(c)),
            KeyCode::Backspace if self.is_text_input(focused) => self.edit(focused, |value| {
                value.pop();
            }),
            _ => {}
        }
    }

    fn is_text_input(&self, node: NodeId) -> bool {
        node == self.nodes.file_input || node == self.nodes.password_input
    }

    fn edit(&mut self, input: NodeId, change: impl FnOnce(&mut String)) {
        let Ok(el) = self.page.document.element_mut(input) else {
            return;
        };
        let mut value = el.value().to_string();
        change(&mut value);
        el.set_value(value.clone());
        self.page.dispatch(Event::new(EventKind::Input, input));
        if input == self.nodes.file_input {
            self.size_check.call(&mut self.page, value);
        }
    }

    /// Left click at a terminal cell: focus what can take focus, then click.
    pub fn click_at(&mut self, column: u16, row: u16) {
        let position = Position::new(column, row);
        let hit = self
            .hit_regions
            .iter()
            .rev()
            .find(|(area, _)| area.contains(position))
            .map(|(_, node)| *node);

        match hit {
            Some(node) => {
                if self.focus_order.contains(&node) {
                    self.move_focus(Some(node));
                }
                self.page.click(node);
            }
            None => {
                self.move_focus(None);
                let body = self.page.document.body();
                self.page.click(body);
            }
        }
    }

    /// A bracketed paste is the terminal's version of dropping a file: the
    /// drop zone lights up, and the path lands in the file field shortly after.
    pub fn paste(&mut self, text: &str) {
        let path = text.trim().trim_matches(|c| c == '\'' || c == '"').to_string();
        if path.is_empty() {
            return;
        }
        let zone = self.nodes.drop_zone;
        let input = self.nodes.file_input;
        self.page.dispatch(Event::new(EventKind::DragEnter, zone));
        self.page.timers().schedule(DROP_FEEDBACK, move |page: &mut Page| {
            page.dispatch(Event::new(EventKind::Drop, zone));
        });

        if let Ok(el) = self.page.document.element_mut(input) {
            el.set_value(path.clone());
        }
        self.page.dispatch(Event::new(EventKind::Input, input));
        self.size_check.call(&mut self.page, path.clone());
        self.status_message = format!("Dropped {path}");
    }

    /// Puts a fresh password (or passphrase) in the password field.
    pub fn fill_generated_password(&mut self, passphrase: bool) -> Option<String> {
        let generated = if passphrase {
            crypto::generate_passphrase(password::DEFAULT_WORD_COUNT)
        } else {
            crypto::generate_password(password::DEFAULT_GENERATED_LENGTH)
        };
        let generated = match generated {
            Ok(generated) => generated,
            Err(e) => {
                warn!(error = %e, "password generation failed");
                notifications::notify(&mut self.page, "Failed to generate password", Kind::Error, self.ui.toast_duration_ms);
                return None;
            }
        };
        let input = self.nodes.password_input;
        if let Ok(el) = self.page.document.element_mut(input) {
            el.set_value(generated.clone());
        }
        self.page.dispatch(Event::new(EventKind::Input, input));
        Some(generated)
    }

    /// Fills the password field and copies the new password, since the
    /// field itself only shows asterisks.
    pub async fn generate_password(&mut self, passphrase: bool) {
        let Some(generated) = self.fill_generated_password(passphrase) else {
            self.status_message = "Failed to generate password".to_string();
            return;
        };
        let copied = clipboard::copy_to_clipboard(&mut self.page, &self.clipboard, &generated).await;
        let what = if passphrase { "passphrase" } else { "password" };
        self.status_message = if copied {
            format!("Generated a {what} and copied it to the clipboard")
        } else {
            format!("Generated a {what}; copy it with Ctrl+K from the field")
        };
    }

    /// Copies the focused field, or the file info line when nothing is focused.
    pub async fn copy_focused(&mut self) {
        let source = self
            .focused()
            .filter(|node| self.is_text_input(*node))
            .unwrap_or(self.nodes.file_info);
        let text = match self.page.document.element(source) {
            Ok(el) if source == self.nodes.file_info => el.text().to_string(),
            Ok(el) => el.value().to_string(),
            Err(_) => String::new(),
        };
        if text.is_empty() {
            self.status_message = "Nothing to copy".to_string();
            return;
        }
        let copied = clipboard::copy_to_clipboard(&mut self.page, &self.clipboard, &text).await;
        self.status_message = if copied {
            clipboard::COPIED_MESSAGE.to_string()
        } else {
            clipboard::FAILED_MESSAGE.to_string()
        };
    }

    pub fn is_menu_open(&self) -> bool {
        menu::is_open(&self.page, self.nodes.menu)
    }

    pub fn is_drag_active(&self) -> bool {
        self.page
            .document
            .element(self.nodes.drop_zone)
            .is_ok_and(|el| el.has_class(dragdrop::ACTIVE_CLASS))
    }

    pub fn shutdown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            self.page.shutdown(subscription);
        }
    }
}

fn build_document(page: &mut Page) -> Result<Nodes> {
    let doc = &mut page.document;
    let body = doc.body();

    let alert = doc.create_element("div");
    let el = doc.element_mut(alert)?;
    el.set_attribute(shortcuts::ALERT_ATTR, "");
    el.set_text("Files are encrypted locally. Nothing leaves this machine.");
    doc.append_child(body, alert)?;

    let nav = doc.create_element("nav");
    let menu_button = doc.create_element("button");
    let menu = doc.create_element("ul");
    doc.element_mut(menu_button)?.set_attribute(menu::BUTTON_ATTR, "");
    doc.element_mut(menu_button)?.set_text("☰ Menu");
    let el = doc.element_mut(menu)?;
    el.set_attribute(menu::MENU_ATTR, "");
    el.add_class("hide");
    doc.append_child(body, nav)?;
    doc.append_child(nav, menu_button)?;
    doc.append_child(nav, menu)?;

    let mut menu_links = [menu; 3];
    for (slot, label) in menu_links.iter_mut().zip(MENU_LABELS) {
        let link = doc.create_element("a");
        doc.element_mut(link)?.set_text(label);
        doc.append_child(menu, link)?;
        *slot = link;
    }

    let form = doc.create_element("form");
    let el = doc.element_mut(form)?;
    el.set_attribute(validation::VALIDATE_ATTR, "");
    el.set_attribute(MODE_ATTR, Mode::Encrypt.as_str());
    doc.append_child(body, form)?;

    let file_input = labelled_input(page, form, "file", "PDF file")?;
    let password_input = labelled_input(page, form, "password", "Password")?;

    let doc = &mut page.document;
    let strength = doc.create_element("p");
    doc.element_mut(strength)?.set_class_name("password-strength");
    doc.append_child(form, strength)?;

    let drop_zone = doc.create_element("div");
    let el = doc.element_mut(drop_zone)?;
    el.set_attribute(dragdrop::DROP_ZONE_ATTR, "");
    el.set_text("Paste or drop a PDF path here");
    doc.append_child(form, drop_zone)?;

    let file_info = doc.create_element("p");
    doc.element_mut(file_info)?.set_class_name("file-info");
    doc.append_child(form, file_info)?;

    let submit = doc.create_element("button");
    let el = doc.element_mut(submit)?;
    el.set_attribute("type", "submit");
    el.set_text("Encrypt PDF");
    doc.append_child(form, submit)?;

    Ok(Nodes {
        alert,
        menu_button,
        menu,
        menu_links,
        form,
        file_input,
        password_input,
        strength,
        drop_zone,
        file_info,
        submit,
    })
}

/// A `div` holding a label and a required input, so validation messages
/// have a container to live in.
fn labelled_input(page: &mut Page, form: NodeId, input_type: &str, label: &str) -> Result<NodeId> {
    let doc = &mut page.document;
    let field = doc.create_element("div");
    let input = doc.create_element("input");
    let el = doc.element_mut(input)?;
    el.set_attribute("type", input_type);
    el.set_attribute("required", "");
    el.set_attribute("aria-label", label);
    doc.append_child(form, field)?;
    doc.append_child(field, input)?;
    Ok(input)
}

fn wire_form(page: &mut Page, nodes: Nodes, toast_ms: u64, outcomes: UnboundedSender<Outcome>) -> Subscription {
    let mut subscription = Subscription::new();
    subscription.push(page.add_listener(Target::Node(nodes.submit), EventKind::Click, move |page, _| {
        let enabled = page.document.element(nodes.submit).is_ok_and(|el| !el.is_disabled());
        if enabled {
            page.request_submit(nodes.form);
        }
    }));
    subscription.push(page.add_listener(Target::Node(nodes.form), EventKind::Submit, move |page, event| {
        event.prevent_default();
        submit(page, nodes, toast_ms, &outcomes);
    }));
    subscription.push(page.add_listener(Target::Node(nodes.password_input), EventKind::Input, move |page, _| {
        show_strength(page, nodes);
    }));

    for (link, label) in nodes.menu_links.into_iter().zip(MENU_LABELS) {
        subscription.push(page.add_listener(Target::Node(link), EventKind::Click, move |page, _| {
            match Mode::parse(&label.to_lowercase()) {
                Some(mode) => set_mode(page, nodes, mode, toast_ms),
                None => {
                    notifications::notify(page, ABOUT_TEXT, Kind::Info, toast_ms);
                }
            }
            menu::close(page, nodes.menu);
        }));
    }
    subscription
}

fn current_mode(page: &Page, form: NodeId) -> Mode {
    page.document
        .element(form)
        .ok()
        .and_then(|el| el.attribute(MODE_ATTR))
        .and_then(Mode::parse)
        .unwrap_or_default()
}

fn input_value(page: &Page, input: NodeId) -> String {
    page.document
        .element(input)
        .map(|el| el.value().to_string())
        .unwrap_or_default()
}

/// Switches the form between encrypting PDFs and decrypting `.enc` files.
fn set_mode(page: &mut Page, nodes: Nodes, mode: Mode, toast_ms: u64) {
    if current_mode(page, nodes.form) == mode {
        return;
    }
    if loading::is_loading(page, nodes.submit) {
        notifications::notify(page, "Wait for the current file to finish", Kind::Warning, toast_ms);
        return;
    }
    let (button, field, zone) = match mode {
        Mode::Encrypt => ("Encrypt PDF", "PDF file", "Paste or drop a PDF path here"),
        Mode::Decrypt => ("Decrypt file", "Encrypted file", "Paste or drop an .enc path here"),
    };

    let doc = &mut page.document;
    if let Ok(el) = doc.element_mut(nodes.form) {
        el.set_attribute(MODE_ATTR, mode.as_str());
    }
    if let Ok(el) = doc.element_mut(nodes.submit) {
        el.set_text(button);
    }
    if let Ok(el) = doc.element_mut(nodes.file_input) {
        el.set_attribute("aria-label", field);
    }
    if let Ok(el) = doc.element_mut(nodes.drop_zone) {
        el.set_text(zone);
    }
    for input in [nodes.file_input, nodes.password_input] {
        if let Err(e) = validation::clear_validation_error(page, input) {
            warn!(error = %e, "clearing validation failed");
        }
    }
    show_strength(page, nodes);
    info!(%mode, "mode switched");
}

/// Strength hint under the password while encrypting; decryption takes
/// whatever password the file was made with.
fn show_strength(page: &mut Page, nodes: Nodes) {
    let password = input_value(page, nodes.password_input);
    let hint = if password.is_empty() || current_mode(page, nodes.form) == Mode::Decrypt {
        String::new()
    } else {
        let check = crypto::check_strength(&password);
        format!("Strength: {} · {}", check.strength, check.feedback.join(", "))
    };
    if let Ok(el) = page.document.element_mut(nodes.strength) {
        el.set_text(hint);
    }
}

fn submit(page: &mut Page, nodes: Nodes, toast_ms: u64, outcomes: &UnboundedSender<Outcome>) {
    if loading::is_loading(page, nodes.submit) {
        return;
    }
    let mut valid = true;
    for input in [nodes.file_input, nodes.password_input] {
        match validation::validate_input(page, input) {
            Ok(ok) => valid &= ok,
            Err(e) => warn!(error = %e, "validation failed"),
        }
    }
    if !valid {
        notifications::notify(page, "Please fill in the highlighted fields", Kind::Warning, toast_ms);
        return;
    }

    let mode = current_mode(page, nodes.form);
    let source = PathBuf::from(input_value(page, nodes.file_input).trim());
    if let Err(e) = files::check_source(mode, &source) {
        notifications::notify(page, mode.failure_message(&e), Kind::Error, toast_ms);
        return;
    }
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        warn!("no async runtime for the file job");
        notifications::notify(page, mode.failure_message(&crypto_unavailable()), Kind::Error, toast_ms);
        return;
    };

    if let Err(e) = loading::show_loading(page, nodes.submit, mode.progress_label()) {
        warn!(error = %e, "loading state unavailable");
        return;
    }
    info!(%mode, ?source, "file job started");
    let job = Job::new(mode, source.clone(), input_value(page, nodes.password_input));
    let outcomes = outcomes.clone();
    runtime.spawn(async move {
        let result = files::run(job).await;
        // the receiver only goes away when the app shuts down
        let _ = outcomes.send(Outcome { mode, source, result });
    });
}

fn crypto_unavailable() -> pdfcrypto_ui::UiError {
    anyhow::anyhow!("background runtime unavailable").into()
}

/// Restores the submit button and reports the job. Returns the status line.
fn finish_job(page: &mut Page, nodes: Nodes, toast_ms: u64, outcome: Outcome) -> String {
    if let Err(e) = loading::hide_loading(page, nodes.submit) {
        warn!(error = %e, "could not restore submit button");
    }
    match outcome.result {
        Ok(output) => {
            let message = format!(
                "{} {} to {}",
                file_name(&outcome.source),
                outcome.mode.past_tense(),
                file_name(&output)
            );
            notifications::notify(page, message, Kind::Success, toast_ms);
            format!("Wrote {}", output.display())
        }
        Err(e) => {
            warn!(mode = %outcome.mode, error = %e, "file job failed");
            let message = outcome.mode.failure_message(&e);
            notifications::notify(page, message.clone(), Kind::Error, toast_ms);
            message
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn show_file_size(page: &mut Page, file_info: NodeId, path: &str) {
    let path = path.trim();
    let info = if path.is_empty() {
        String::new()
    } else {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => {
                let size = format::format_bytes(meta.len(), format::DEFAULT_DECIMALS);
                format!("{} · {size}", file_name(Path::new(path)))
            }
            Ok(_) => "Not a file".to_string(),
            Err(_) => "File not found".to_string(),
        }
    };
    if let Ok(el) = page.document.element_mut(file_info) {
        el.set_text(info);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfcrypto_ui::config::MemoryStore;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF\n";

    fn app() -> App {
        App::with_store(Box::new(MemoryStore::default()), UiConfig::default()).unwrap()
    }

    fn fill(app: &mut App, path: &Path, password: &str) {
        let nodes = app.nodes;
        let doc = &mut app.page.document;
        doc.element_mut(nodes.file_input).unwrap().set_value(path.display().to_string());
        doc.element_mut(nodes.password_input).unwrap().set_value(password);
    }

    fn last_toast(page: &Page) -> (Kind, String) {
        let toast = *notifications::active_toasts(page).last().unwrap();
        (
            notifications::toast_kind(page, toast).unwrap(),
            notifications::toast_message(page, toast).unwrap().to_string(),
        )
    }

    fn text(app: &App, node: NodeId) -> String {
        app.page.document.element(node).unwrap().text().to_string()
    }

    async fn wait_for_job(app: &mut App) {
        let outcome = app.outcomes.recv().await.unwrap();
        app.finish(outcome);
    }

    #[test]
    fn empty_form_warns_and_marks_both_fields() {
        let mut app = app();
        app.page.request_submit(app.nodes.form);

        assert_eq!(last_toast(&app.page), (Kind::Warning, "Please fill in the highlighted fields".to_string()));
        assert_eq!(validation::visible_error(&app.page, app.nodes.file_input), Some("Please select a valid file."));
        assert_eq!(validation::visible_error(&app.page, app.nodes.password_input), Some("Password is required."));
        assert!(!loading::is_loading(&app.page, app.nodes.submit));
    }

    #[test]
    fn missing_file_is_an_error_and_nothing_loads() {
        let mut app = app();
        let dir = tempdir().unwrap();
        fill(&mut app, &dir.path().join("gone.pdf"), "pw");
        app.page.click(app.nodes.submit);

        let (kind, message) = last_toast(&app.page);
        assert_eq!(kind, Kind::Error);
        assert!(message.starts_with("Encryption failed: "), "{message}");
        assert!(!loading::is_loading(&app.page, app.nodes.submit));
    }

    #[test]
    fn only_pdfs_are_accepted_for_encryption() {
        let mut app = app();
        let dir = tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        fs::write(&notes, "hello").unwrap();
        fill(&mut app, &notes, "pw");
        app.page.click(app.nodes.submit);

        assert_eq!(last_toast(&app.page), (Kind::Error, "Only PDF files are allowed".to_string()));
    }

    #[tokio::test]
    async fn submit_encrypts_in_the_background_then_restores_the_button() {
        let mut app = app();
        let dir = tempdir().unwrap();
        let source = dir.path().join("report.pdf");
        fs::write(&source, PDF).unwrap();
        fill(&mut app, &source, "correct horse");

        app.page.click(app.nodes.submit);
        assert!(loading::is_loading(&app.page, app.nodes.submit));
        assert_eq!(text(&app, app.nodes.submit), "Encrypting...");
        // a second submit while busy is ignored
        app.page.click(app.nodes.submit);

        wait_for_job(&mut app).await;
        assert!(!loading::is_loading(&app.page, app.nodes.submit));
        assert_eq!(text(&app, app.nodes.submit), "Encrypt PDF");
        assert_eq!(last_toast(&app.page), (Kind::Success, "report.pdf encrypted to report.enc".to_string()));

        let sealed = fs::read(dir.path().join("report.enc")).unwrap();
        assert_eq!(crypto::decrypt_pdf(&sealed, "correct horse").unwrap(), PDF);
        assert!(app.outcomes.try_recv().is_err());
    }

    #[tokio::test]
    async fn decrypt_link_switches_the_form_and_restores_the_pdf() {
        let mut app = app();
        let dir = tempdir().unwrap();
        let source = dir.path().join("scan.pdf");
        fs::write(&source, PDF).unwrap();
        let sealed = files::process(&Job::new(Mode::Encrypt, &source, "pw")).unwrap();
        fs::remove_file(&source).unwrap();

        app.page.click(app.nodes.menu_button);
        app.page.click(app.nodes.menu_links[1]);
        assert_eq!(app.mode(), Mode::Decrypt);
        assert!(!app.is_menu_open());
        assert_eq!(text(&app, app.nodes.submit), "Decrypt file");

        fill(&mut app, &sealed, "wrong");
        app.page.click(app.nodes.submit);
        assert_eq!(text(&app, app.nodes.submit), "Decrypting...");
        wait_for_job(&mut app).await;
        assert_eq!(last_toast(&app.page), (Kind::Error, "Invalid password or corrupted file".to_string()));
        assert!(!source.exists());

        fill(&mut app, &sealed, "pw");
        app.page.click(app.nodes.submit);
        wait_for_job(&mut app).await;
        assert_eq!(last_toast(&app.page), (Kind::Success, "scan.enc decrypted to scan.pdf".to_string()));
        assert_eq!(fs::read(&source).unwrap(), PDF);
        assert_eq!(app.status_message, format!("Wrote {}", source.display()));
    }

    #[test]
    fn decrypt_mode_wants_enc_files() {
        let mut app = app();
        app.page.click(app.nodes.menu_links[1]);
        let dir = tempdir().unwrap();
        let pdf = dir.path().join("plain.pdf");
        fs::write(&pdf, PDF).unwrap();
        fill(&mut app, &pdf, "pw");
        app.page.click(app.nodes.submit);
        assert_eq!(last_toast(&app.page), (Kind::Error, "Only .enc files are allowed for decryption".to_string()));

        app.page.click(app.nodes.menu_links[0]);
        assert_eq!(app.mode(), Mode::Encrypt);
        assert_eq!(text(&app, app.nodes.submit), "Encrypt PDF");
    }

    #[test]
    fn about_link_shows_an_info_toast() {
        let mut app = app();
        app.page.click(app.nodes.menu_links[2]);
        assert_eq!(last_toast(&app.page), (Kind::Info, ABOUT_TEXT.to_string()));
        assert_eq!(app.mode(), Mode::Encrypt);
    }

    #[test]
    fn size_line_reports_name_and_size() {
        let mut page = Page::default();
        let info = page.document.create_element("p");
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.pdf");
        fs::write(&path, vec![0u8; 2048]).unwrap();

        show_file_size(&mut page, info, &path.display().to_string());
        assert_eq!(page.document.element(info).unwrap().text(), "a.pdf · 2 KB");
        show_file_size(&mut page, info, &dir.path().display().to_string());
        assert_eq!(page.document.element(info).unwrap().text(), "Not a file");
        show_file_size(&mut page, info, &dir.path().join("nope.pdf").display().to_string());
        assert_eq!(page.document.element(info).unwrap().text(), "File not found");
        show_file_size(&mut page, info, "  ");
        assert_eq!(page.document.element(info).unwrap().text(), "");
    }

    #[test]
    fn paste_highlights_the_drop_zone_then_shows_the_size() {
        let mut app = app();
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.pdf");
        fs::write(&path, vec![0u8; 1536]).unwrap();

        app.paste(&format!("'{}'\n", path.display()));
        assert!(app.is_drag_active());
        assert_eq!(app.page.document.element(app.nodes.file_input).unwrap().value(), path.display().to_string());
        assert_eq!(text(&app, app.nodes.file_info), "");

        app.page.advance(DROP_FEEDBACK);
        assert!(!app.is_drag_active());
        app.page.advance(UiConfig::default().size_debounce());
        assert_eq!(text(&app, app.nodes.file_info), "big.pdf · 1.5 KB");
    }

    #[test]
    fn tabbing_past_an_empty_field_validates_it() {
        let mut app = app();
        app.focus_next();
        assert_eq!(app.focused(), Some(app.nodes.menu_button));
        app.focus_next();
        app.focus_next();
        assert_eq!(app.focused(), Some(app.nodes.password_input));
        assert_eq!(validation::visible_error(&app.page, app.nodes.file_input), Some("Please select a valid file."));

        app.focus_previous();
        app.handle_key(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(validation::visible_error(&app.page, app.nodes.file_input), None);
        assert_eq!(validation::visible_error(&app.page, app.nodes.password_input), Some("Password is required."));
    }

    #[test]
    fn typing_a_password_updates_the_strength_hint() {
        let mut app = app();
        app.page.document.focus(app.nodes.password_input).unwrap();
        for c in "abc".chars() {
            app.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
        assert!(text(&app, app.nodes.strength).starts_with("Strength: Weak · Use at least 8 characters"));

        let generated = app.fill_generated_password(false).unwrap();
        assert_eq!(generated.len(), password::DEFAULT_GENERATED_LENGTH);
        assert_eq!(app.page.document.element(app.nodes.password_input).unwrap().value(), generated);
        assert_eq!(text(&app, app.nodes.strength), "Strength: Very Strong · Password looks good!");

        app.page.click(app.nodes.menu_links[1]);
        assert_eq!(text(&app, app.nodes.strength), "");
    }
}
