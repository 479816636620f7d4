pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, Theme, ThemeColors};

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};
use tokio::task::JoinHandle;

use crate::quiz::{Effect, SessionEvent};

/// Tick often enough for the spinner and the calculating message rotation
const TICK_RATE_MS: u64 = 100;

pub async fn run_tui(mut app: App, colors: ThemeColors) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();

    let mut events = EventHandler::new(TICK_RATE_MS);
    let mut pending_timer: Option<JoinHandle<()>> = None;

    // Main loop
    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &app, &colors)) {
            break Err(anyhow::Error::from(e));
        }

        let effect = match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
                app.rotate_message(Instant::now());
                Effect::None
            }
            Event::CalculationDone { epoch } => app.dispatch(SessionEvent::TimerFired { epoch }),
        };

        match effect {
            Effect::StartTimer { epoch } => {
                if let Some(handle) = pending_timer.take() {
                    handle.abort();
                }
                pending_timer = Some(tokio::spawn(event::calculation_timer(
                    events.sender(),
                    app.calculating_delay,
                    epoch,
                )));
            }
            Effect::CancelTimer => {
                if let Some(handle) = pending_timer.take() {
                    handle.abort();
                }
            }
            Effect::ShowResult => {
                pending_timer = None;
            }
            Effect::None => {}
        }

        if app.should_quit {
            break Ok(());
        }
    };

    if let Some(handle) = pending_timer.take() {
        handle.abort();
    }

    // Restore terminal
    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

fn handle_key_event(app: &mut App, key: KeyEvent) -> Effect {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Effect::None;
    }

    match app.input_mode {
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_popup();
            Effect::None
        }
        app::InputMode::Breakdown => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('q')) {
                app.dismiss_popup();
            }
            Effect::None
        }
        app::InputMode::Share => {
            match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() => {
                    let n = c.to_digit(10).unwrap_or(0) as usize;
                    app.open_share(n);
                }
                // X is listed first
                KeyCode::Enter => app.open_share(1),
                KeyCode::Esc | KeyCode::Char('s') | KeyCode::Char('q') => app.dismiss_popup(),
                _ => {}
            }
            Effect::None
        }
        app::InputMode::Normal if app.is_typing() => match key.code {
            KeyCode::Enter => app.confirm(),
            KeyCode::Tab => app.dispatch(SessionEvent::Next),
            KeyCode::Esc => app.dispatch(SessionEvent::Restart),
            KeyCode::Backspace => {
                app.pop_char();
                Effect::None
            }
            KeyCode::Char(c) => {
                app.push_char(c);
                Effect::None
            }
            // Ignore all other keys while typing
            _ => Effect::None,
        },
        app::InputMode::Normal => match key.code {
            // Quit
            KeyCode::Char('q') | KeyCode::Esc => {
                app.should_quit = true;
                Effect::None
            }

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => {
                app.next_option();
                Effect::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.previous_option();
                Effect::None
            }

            // Answer
            KeyCode::Enter => app.confirm(),
            KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_selected(),
            KeyCode::Char(c @ '1'..='9') => app.pick_number(c as usize - '0' as usize),

            // Pages
            KeyCode::Char('n') | KeyCode::Right | KeyCode::Tab => app.dispatch(SessionEvent::Next),
            KeyCode::Char('p') | KeyCode::Left | KeyCode::Backspace => app.dispatch(SessionEvent::Back),
            KeyCode::Char('r') => app.dispatch(SessionEvent::Restart),

            // Result popups
            KeyCode::Char('s') => {
                app.show_share();
                Effect::None
            }
            KeyCode::Char('b') => {
                app.show_breakdown();
                Effect::None
            }

            // Help
            KeyCode::Char('?') => {
                app.show_help();
                Effect::None
            }

            _ => Effect::None,
        },
    }
}
