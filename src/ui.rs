use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use pdfcrypto_ui::dom::NodeId;
use pdfcrypto_ui::modules::{loading, notifications, theme, validation};

use crate::app::App;

const TOAST_WIDTH: u16 = 44;
const TOAST_HEIGHT: u16 = 3;

#[derive(Clone, Copy)]
struct Palette {
    bg: Color,
    fg: Color,
    accent: Color,
    muted: Color,
}

fn palette(dark: bool) -> Palette {
    if dark {
        Palette { bg: Color::Black, fg: Color::Gray, accent: Color::Cyan, muted: Color::DarkGray }
    } else {
        Palette { bg: Color::White, fg: Color::Black, accent: Color::Blue, muted: Color::Gray }
    }
}

pub fn draw(f: &mut Frame, app: &mut App) {
    app.hit_regions.clear();
    let colors = palette(theme::is_dark(&app.page));
    f.render_widget(Block::default().style(Style::default().bg(colors.bg).fg(colors.fg)), f.area());

    let alert_visible = app
        .page
        .document
        .element(app.nodes.alert)
        .is_ok_and(|el| !el.is_hidden());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(if alert_visible { 3 } else { 0 }),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_title(f, app, chunks[0], colors);
    if alert_visible {
        draw_alert(f, app, chunks[1]);
    }

    if app.is_menu_open() {
        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(20), Constraint::Percentage(80)])
            .split(chunks[2]);
        draw_menu(f, app, main_chunks[0], colors);
        draw_form(f, app, main_chunks[1], colors);
    } else {
        draw_form(f, app, chunks[2], colors);
    }

    draw_status(f, app, chunks[3], colors);
    draw_toasts(f, app);

    if app.show_help {
        draw_help_popup(f, colors);
    }
}

fn draw_title(f: &mut Frame, app: &mut App, area: Rect, colors: Palette) {
    let parts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(12)])
        .split(area);

    let time_str = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let mode = if theme::is_dark(&app.page) { "dark" } else { "light" };
    let header = format!("PDFCrypto | {} | theme: {}", time_str, mode);
    let title = Paragraph::new(header)
        .style(Style::default().fg(colors.accent).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, parts[0]);

    let button = app.nodes.menu_button;
    let label = text(app, button).to_string();
    let button_widget = Paragraph::new(label).block(focus_block(app, button, colors));
    f.render_widget(button_widget, parts[1]);
    app.hit_regions.push((parts[1], button));
}

fn draw_alert(f: &mut Frame, app: &App, area: Rect) {
    let alert = Paragraph::new(text(app, app.nodes.alert))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title("Notice (Esc to close)"));
    f.render_widget(alert, area);
}

fn draw_menu(f: &mut Frame, app: &mut App, area: Rect, colors: Palette) {
    let items: Vec<ListItem> = app
        .nodes
        .menu_links
        .iter()
        .map(|link| {
            let label = text(app, *link);
            let active = label.eq_ignore_ascii_case(app.mode().as_str());
            ListItem::new(format!("{} {label}", if active { "›" } else { " " }))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title("Menu")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors.accent)),
    );
    f.render_widget(list, area);

    let inner = area.inner(ratatui::layout::Margin { horizontal: 1, vertical: 1 });
    app.hit_regions.push((area, app.nodes.menu));
    for (i, link) in app.nodes.menu_links.iter().enumerate() {
        let row = Rect { y: inner.y + i as u16, height: 1, ..inner };
        if row.y < inner.bottom() {
            app.hit_regions.push((row, *link));
        }
    }
}

fn draw_form(f: &mut Frame, app: &mut App, area: Rect, colors: Palette) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let file = app.nodes.file_input;
    let password = app.nodes.password_input;
    draw_input(f, app, file, false, chunks[0], colors);
    draw_error(f, app, file, chunks[1]);
    draw_input(f, app, password, true, chunks[2], colors);
    draw_error(f, app, password, chunks[3]);

    let strength = Paragraph::new(text(app, app.nodes.strength)).style(Style::default().fg(colors.muted));
    f.render_widget(strength, chunks[4]);

    let zone_style = if app.is_drag_active() {
        Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(colors.muted)
    };
    let zone = Paragraph::new(text(app, app.nodes.drop_zone))
        .alignment(ratatui::layout::Alignment::Center)
        .block(Block::default().title("Drop zone").borders(Borders::ALL).border_style(zone_style));
    f.render_widget(zone, chunks[5]);
    app.hit_regions.push((chunks[5], app.nodes.drop_zone));

    let info = Paragraph::new(text(app, app.nodes.file_info)).style(Style::default().fg(colors.muted));
    f.render_widget(info, chunks[6]);

    let submit = app.nodes.submit;
    let busy = loading::is_loading(&app.page, submit);
    let label = if busy {
        format!("⟳ {}", text(app, submit))
    } else {
        text(app, submit).to_string()
    };
    let style = if busy {
        Style::default().fg(colors.muted)
    } else {
        Style::default().fg(colors.accent).add_modifier(Modifier::BOLD)
    };
    let button_area = Rect { width: chunks[7].width.min(24), ..chunks[7] };
    let button = Paragraph::new(label)
        .style(style)
        .alignment(ratatui::layout::Alignment::Center)
        .block(focus_block(app, submit, colors));
    f.render_widget(button, button_area);
    app.hit_regions.push((button_area, submit));
}

fn draw_input(f: &mut Frame, app: &mut App, input: NodeId, masked: bool, area: Rect, colors: Palette) {
    let value = app.page.document.element(input).map(|el| el.value()).unwrap_or_default();
    let title = app
        .page
        .document
        .element(input)
        .ok()
        .and_then(|el| el.attribute("aria-label"))
        .unwrap_or_default()
        .to_string();
    let shown = if masked { "*".repeat(value.chars().count()) } else { value.to_string() };
    let cursor = if app.focused() == Some(input) { "▏" } else { "" };

    let invalid = app
        .page
        .document
        .element(input)
        .is_ok_and(|el| el.has_class("border-red-500"));
    let block = if invalid {
        Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Red))
    } else {
        focus_block(app, input, colors)
    };

    let widget = Paragraph::new(format!("{shown}{cursor}")).block(block.title(title));
    f.render_widget(widget, area);
    app.hit_regions.push((area, input));
}

fn draw_error(f: &mut Frame, app: &App, input: NodeId, area: Rect) {
    if let Some(message) = validation::visible_error(&app.page, input) {
        let line = Paragraph::new(message).style(Style::default().fg(Color::Red));
        f.render_widget(line, area);
    }
}

/// Toasts stack down from the top-right corner, oldest first.
fn draw_toasts(f: &mut Frame, app: &mut App) {
    let screen = f.area();
    let width = TOAST_WIDTH.min(screen.width);
    let mut y = screen.y + 1;

    for toast in notifications::active_toasts(&app.page) {
        let visible = app.page.document.element(toast).is_ok_and(|el| el.has_class("show"));
        if !visible || y + TOAST_HEIGHT > screen.bottom() {
            continue;
        }
        let kind = notifications::toast_kind(&app.page, toast).unwrap_or_default();
        let message = notifications::toast_message(&app.page, toast).unwrap_or_default().to_string();
        let color = match kind {
            notifications::Kind::Success => Color::Green,
            notifications::Kind::Error => Color::Red,
            notifications::Kind::Warning => Color::Yellow,
            notifications::Kind::Info => Color::Blue,
        };

        let area = Rect { x: screen.right().saturating_sub(width + 1), y, width, height: TOAST_HEIGHT };
        let line = Line::from(vec![
            Span::styled(format!("{} ", kind.icon()), Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::raw(message),
        ]);
        let widget = Paragraph::new(line)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(Line::from("×").right_aligned()),
            );
        f.render_widget(Clear, area);
        f.render_widget(widget, area);

        if let Some(close) = app.page.document.query(toast, |el| el.has_attribute("data-close")) {
            let close_area = Rect { x: area.right().saturating_sub(3), y: area.y, width: 3, height: 1 };
            app.hit_regions.push((close_area, close));
        }
        y += TOAST_HEIGHT;
    }
}

fn draw_status(f: &mut Frame, app: &App, area: Rect, colors: Palette) {
    let help_text = "Tab: Next field | Enter: Activate | Ctrl+Enter: Submit | Ctrl+G: Generate password | Ctrl+D: Theme | Ctrl+K: Copy | F1: Help | Ctrl+Q: Quit";

    let status = Paragraph::new(vec![
        Line::from(app.status_message.as_str()),
        Line::from(Span::styled(help_text, Style::default().fg(colors.muted))),
    ])
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(status, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn draw_help_popup(f: &mut Frame, colors: Palette) {
    let area = centered_rect(60, 60, f.area());
    let help = "PDFCrypto Help\n\nKeys:\n  Tab / Shift+Tab: Move between fields\n  Type / Backspace: Edit the focused field\n  Enter: Press the focused button\n  Ctrl+Enter: Submit the form\n  Ctrl+D: Toggle dark mode\n  Ctrl+K: Copy the focused field\n  Ctrl+G: Generate and copy a password\n  Ctrl+P: Generate and copy a passphrase\n  Esc: Close notices\n  F1: Toggle this help\n  Ctrl+Q / Ctrl+C: Quit\n\nPaste a file path to drop it on the page.\nPick Encrypt or Decrypt from the menu; the result is written next to the source file.\nClick × to close a notification.";

    let paragraph = Paragraph::new(help)
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn focus_block(app: &App, node: NodeId, colors: Palette) -> Block<'static> {
    let style = if app.focused() == Some(node) {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(colors.fg)
    };
    Block::default().borders(Borders::ALL).border_style(style)
}

fn text(app: &App, node: NodeId) -> &str {
    app.page.document.element(node).map(|el| el.text()).unwrap_or_default()
}
