//! Full-screen terminal front end: a login/register screen and a main screen
//! with an action bar, a book table and modal dialogs.

mod app;
mod form;
mod view;

pub use app::{AuthTab, BookTable, Dialog, DialogKind, Popup, PopupKind, Screen, TableKind, TuiApp};
pub use view::draw;

use crate::domain::ports::Clock;
use anyhow::Result;
use crossterm::event::{self, Event};
use ratatui::DefaultTerminal;

/// Takes over the terminal until the user quits. The terminal is restored
/// even when the loop fails.
pub fn run<C: Clock>(app: &mut TuiApp<C>) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, app);
    ratatui::restore();
    result
}

fn event_loop<C: Clock>(terminal: &mut DefaultTerminal, app: &mut TuiApp<C>) -> Result<()> {
    tracing::info!("Terminal UI started");
    while !app.should_quit() {
        terminal.draw(|frame| draw(frame, app))?;
        if let Event::Key(key) = event::read()? {
            app.handle_key(key);
        }
    }
    tracing::info!("Terminal UI closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::policy::LendingPolicy;
    use crate::core::system::LibrarySystem;
    use crate::domain::model::SearchBy;
    use crate::domain::ports::ManualClock;
    use chrono::{Duration, NaiveDate};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text<C: Clock>(app: &mut TuiApp<C>, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn app_with_clock() -> (TuiApp<ManualClock>, ManualClock) {
        let clock = ManualClock::new(
            NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );
        let mut system = LibrarySystem::with_clock(LendingPolicy::default(), clock.clone());
        system.seed_library();
        system.register_user("u1", "Ada", "pw").unwrap();
        (TuiApp::new(system, "Library Management System"), clock)
    }

    fn logged_in_app() -> (TuiApp<ManualClock>, ManualClock) {
        let (mut app, clock) = app_with_clock();
        type_text(&mut app, "u1");
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "pw");
        app.handle_key(key(KeyCode::Enter));
        (app, clock)
    }

    fn screen_text<C: Clock>(app: &TuiApp<C>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(110, 30)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_login_switches_to_main_screen() {
        let (app, _) = logged_in_app();
        assert_eq!(app.screen(), Screen::Main);
        assert!(app.popup().is_none());
        assert_eq!(app.table().rows.len(), 10);
        assert_eq!(app.table().rows[0][4], "1/1");
    }

    #[test]
    fn test_failed_login_shows_warning() {
        let (mut app, _) = app_with_clock();
        type_text(&mut app, "u1");
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "nope");
        app.handle_key(key(KeyCode::Enter));

        let popup = app.popup().unwrap();
        assert_eq!(popup.kind, PopupKind::Warning);
        assert_eq!(popup.message, "Invalid user ID or password.");
        assert_eq!(app.screen(), Screen::Auth);

        app.handle_key(key(KeyCode::Esc));
        assert!(app.popup().is_none());
        assert!(!app.should_quit());
    }

    #[test]
    fn test_register_tab_creates_user() {
        let (mut app, _) = app_with_clock();
        app.handle_key(key(KeyCode::Tab));
        type_text(&mut app, "u2");
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "Grace");
        app.handle_key(key(KeyCode::Down));
        type_text(&mut app, "pw2");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.popup().unwrap().message, "User 'Grace' registered.");
        assert!(app.system().user("u2").is_some());

        // back on the login tab with the id filled in
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "pw2");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.screen(), Screen::Main);
    }

    #[test]
    fn test_lend_dialog_updates_table() {
        let (mut app, _) = logged_in_app();
        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(app.dialog().unwrap().kind, DialogKind::Lend);
        type_text(&mut app, "9780451524935");
        app.handle_key(key(KeyCode::Enter));

        assert!(app.dialog().is_none());
        assert_eq!(app.popup().unwrap().message, "Due on 2024-02-15");
        let row = app
            .table()
            .rows
            .iter()
            .find(|row| row[2] == "9780451524935")
            .unwrap();
        assert_eq!(row[4], "0/1");
    }

    #[test]
    fn test_failed_dialog_stays_open() {
        let (mut app, _) = logged_in_app();
        app.handle_key(key(KeyCode::Char('r')));
        type_text(&mut app, "9780451524935");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.popup().unwrap().message, "You did not borrow this book.");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.dialog().unwrap().kind, DialogKind::Return);
        app.handle_key(key(KeyCode::Esc));
        assert!(app.dialog().is_none());
    }

    #[test]
    fn test_late_return_reports_fine() {
        let (mut app, clock) = logged_in_app();
        app.handle_key(key(KeyCode::Char('b')));
        type_text(&mut app, "9780547928227");
        app.handle_key(key(KeyCode::Enter));
        app.handle_key(key(KeyCode::Enter));

        clock.advance(Duration::days(16));
        app.handle_key(key(KeyCode::Char('r')));
        type_text(&mut app, "9780547928227");
        app.handle_key(key(KeyCode::Enter));

        let popup = app.popup().unwrap();
        assert_eq!(popup.title, "Returned");
        assert!(popup.message.contains("fine of $2"));
    }

    #[test]
    fn test_add_book_dialog() {
        let (mut app, _) = logged_in_app();
        app.handle_key(key(KeyCode::Char('a')));
        for value in ["Dune", "Frank Herbert", "9780441172719", "Science Fiction"] {
            type_text(&mut app, value);
            app.handle_key(key(KeyCode::Tab));
        }
        app.handle_key(key(KeyCode::Backspace));
        type_text(&mut app, "3");
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(app.popup().unwrap().message, "Book added.");
        let book = app.system().library().search_by_isbn("9780441172719").unwrap();
        assert_eq!(book.total_copies, 3);
        assert_eq!(app.table().rows.len(), 11);
    }

    #[test]
    fn test_search_dialog_cycles_field() {
        let (mut app, _) = logged_in_app();
        app.handle_key(key(KeyCode::Char('s')));
        app.handle_key(key(KeyCode::Right));
        assert_eq!(app.dialog().unwrap().search_by, SearchBy::Author);
        type_text(&mut app, "tolkien");
        app.handle_key(key(KeyCode::Enter));

        assert!(app.popup().is_none());
        assert_eq!(app.table().rows.len(), 1);
        assert_eq!(app.table().rows[0][0], "The Hobbit");
    }

    #[test]
    fn test_search_suggestions_popup() {
        let (mut app, _) = logged_in_app();
        app.handle_key(key(KeyCode::Char('s')));
        type_text(&mut app, "Moby Dik");
        app.handle_key(key(KeyCode::Enter));

        assert!(app.table().rows.is_empty());
        assert!(app.popup().unwrap().message.contains("Moby-Dick"));
    }

    #[test]
    fn test_genre_view_and_logout() {
        let (mut app, _) = logged_in_app();
        app.handle_key(key(KeyCode::Char('g')));
        assert_eq!(app.table().kind, TableKind::Genres);
        assert_eq!(app.table().rows[0][0], "Classic Fiction");

        app.handle_key(key(KeyCode::Char('o')));
        assert_eq!(app.screen(), Screen::Auth);
        assert!(!app.system().is_logged_in());

        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit());
    }

    #[test]
    fn test_ctrl_c_quits_from_dialog() {
        let (mut app, _) = logged_in_app();
        app.handle_key(key(KeyCode::Char('a')));
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit());
    }

    #[test]
    fn test_render_screens() {
        let (mut app, _) = app_with_clock();
        let auth = screen_text(&app);
        assert!(auth.contains("Library Management System"));
        assert!(auth.contains("Register"));

        type_text(&mut app, "u1");
        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "pw");
        assert!(screen_text(&app).contains("Password: **"));
        app.handle_key(key(KeyCode::Enter));

        let main = screen_text(&app);
        assert!(main.contains("Logged in as: Ada"));
        assert!(main.contains("The Hobbit"));
        assert!(main.contains("Avail/Total"));
    }
}
