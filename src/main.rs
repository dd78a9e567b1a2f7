use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture, Event, KeyCode,
        KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app;
mod ui;

use app::App;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout belongs to the terminal UI, so a missing log file only costs us logs
    let _ = init_logging();
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let mut app = App::new()?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;
    app.shutdown();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = ?err, "terminal loop failed");
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn init_logging() -> Result<()> {
    let dir = dirs::data_dir().context("No data directory")?.join("pdfcrypto-ui");
    fs::create_dir_all(&dir).with_context(|| format!("Creating {:?}", &dir))?;
    let log_path = dir.join("pdfcrypto-ui.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Opening {:?}", &log_path))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pdfcrypto_ui=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(app.poll_timeout())? {
            match event::read()? {
                Event::Key(KeyEvent { code, modifiers, kind, .. }) if kind == KeyEventKind::Press => {
                    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('c') if ctrl => return Ok(()),
                        KeyCode::Char('k') if ctrl => app.copy_focused().await,
                        KeyCode::Char('g') if ctrl => app.generate_password(false).await,
                        KeyCode::Char('p') if ctrl => app.generate_password(true).await,
                        KeyCode::F(1) => app.show_help = !app.show_help,
                        KeyCode::Esc if app.show_help => app.show_help = false,
                        KeyCode::Tab => app.focus_next(),
                        KeyCode::BackTab => app.focus_previous(),
                        _ => app.handle_key(code, modifiers),
                    }
                }
                Event::Mouse(MouseEvent { kind: MouseEventKind::Down(MouseButton::Left), column, row, .. }) => {
                    app.click_at(column, row);
                }
                Event::Paste(text) => app.paste(&text),
                _ => {}
            }
        }

        app.tick();
    }
}
