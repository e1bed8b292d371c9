pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, Theme, ThemeColors};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use event::{Event, EventHandler};
use tokio::task::JoinHandle;

use crate::grading::{GradeError, GradingConfig, Quality};
use crate::provider::{load_grading_config, ConfigSource, FetchOptions};

type PendingLoad = JoinHandle<Result<GradingConfig, GradeError>>;

fn spawn_load(source: &ConfigSource, options: &FetchOptions) -> PendingLoad {
    let source = source.clone();
    let options = *options;
    tokio::spawn(async move { load_grading_config(&source, &options).await })
}

pub async fn run_tui(mut app: App, source: ConfigSource, options: FetchOptions) -> anyhow::Result<()> {
    // Buffer log output while TUI is active to prevent it corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();

    let mut events = EventHandler::new(250);

    // The form is usable immediately; the configuration arrives in the background
    let mut pending_load: Option<PendingLoad> = Some(spawn_load(&source, &options));

    let outcome = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(anyhow::Error::from(e));
        }

        match events.next().await {
            Event::Key(key) => handle_key_event(&mut app, key),
            Event::Tick => {
                app.update_flash();
                app.advance_spinner();
            }
        }

        // Check if background load has completed
        if pending_load.as_ref().is_some_and(|h| h.is_finished()) {
            if let Some(handle) = pending_load.take() {
                match handle.await {
                    Ok(loaded) => app.config_loaded(loaded),
                    Err(e) => app.config_loaded(Err(GradeError::unavailable(
                        source.to_string(),
                        format!("load task failed: {}", e),
                    ))),
                }
            }
        }

        if app.needs_reload && pending_load.is_none() {
            app.needs_reload = false;
            if !app.session.is_ready() {
                app.load_state = app::LoadState::Loading;
            }
            app.show_flash(format!("Loading {}...", source));
            pending_load = Some(spawn_load(&source, &options));
        }

        if app.should_quit {
            break Ok(());
        }
    };

    if let Some(handle) = pending_load {
        handle.abort();
    }

    // Restore terminal
    ratatui::restore();

    // Flush buffered log lines now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    outcome
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    match app.input_mode {
        app::InputMode::Normal => match key.code {
            // Quit
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.should_quit = true
            }

            // Navigation
            KeyCode::Down | KeyCode::Tab | KeyCode::Enter => app.next_row(),
            KeyCode::Up | KeyCode::BackTab => app.previous_row(),

            // Numeric input
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => app.type_char(c),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Delete => app.clear_focused(),

            // Quality rows
            KeyCode::Right => app.cycle_quality(true),
            KeyCode::Left => app.cycle_quality(false),
            KeyCode::Char('p') => app.set_quality(Quality::Poor),
            KeyCode::Char('g') => app.set_quality(Quality::Good),
            KeyCode::Char('e') => app.set_quality(Quality::Excellent),

            // Reload configuration
            KeyCode::Char('r') => app.request_reload(),

            // Clear the form
            KeyCode::Char('x') => app.reset_form(),

            // Help
            KeyCode::Char('?') => app.show_help(),

            _ => {}
        },
        app::InputMode::Help => {
            // Any key exits help
            app.dismiss_help();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::{QualitySection, Section};

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ready_app() -> App {
        let mut app = App::new_loading("test".to_string(), ThemeColors::dark());
        app.config_loaded(Ok(GradingConfig::standard()));
        app
    }

    #[test]
    fn test_keys_fill_form() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('1'));
        press(&mut app, KeyCode::Char('0'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('5'));
        assert_eq!(app.session.field(Section::Quiz1), "10");
        assert_eq!(app.session.field(Section::Quiz2), "5");
        assert_eq!(app.result.as_ref().unwrap().breakdown.quiz_average, 5.0);
    }

    #[test]
    fn test_letter_keys_do_not_type() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.session.field(Section::Quiz1), "");
    }

    #[test]
    fn test_quality_shortcut() {
        let mut app = ready_app();
        for _ in 0..5 {
            press(&mut app, KeyCode::Down);
        }
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(
            app.session.active_quality(QualitySection::Presentation),
            Some(Quality::Good)
        );
    }

    #[test]
    fn test_help_and_quit() {
        let mut app = ready_app();
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.input_mode, app::InputMode::Help);
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.input_mode, app::InputMode::Normal);
        assert!(!app.should_quit);

        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }
}
