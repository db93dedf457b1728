//! Screen state and key handling for the terminal UI, kept free of any
//! terminal I/O so it can be driven directly by tests.

use super::form::{Form, FormField};
use crate::core::system::LibrarySystem;
use crate::domain::model::{Book, NewBook, SearchBy};
use crate::domain::ports::Clock;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Auth,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTab {
    Login,
    Register,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub kind: PopupKind,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    AddBook,
    Lend,
    Return,
    Reserve,
    Search,
}

impl DialogKind {
    pub fn title(&self) -> &'static str {
        match self {
            DialogKind::AddBook => "Add New Book",
            DialogKind::Lend => "Lend Book",
            DialogKind::Return => "Return Book",
            DialogKind::Reserve => "Reserve Book",
            DialogKind::Search => "Search Books",
        }
    }

    fn form(&self) -> Form {
        match self {
            DialogKind::AddBook => Form::new(vec![
                FormField::new("Title"),
                FormField::new("Author"),
                FormField::new("ISBN"),
                FormField::new("Genre"),
                FormField::new("Copies"),
            ]),
            DialogKind::Lend | DialogKind::Return | DialogKind::Reserve => {
                Form::new(vec![FormField::new("ISBN")])
            }
            DialogKind::Search => Form::new(vec![FormField::new("Term")]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dialog {
    pub kind: DialogKind,
    pub form: Form,
    pub search_by: SearchBy,
}

impl Dialog {
    fn new(kind: DialogKind) -> Self {
        let mut form = kind.form();
        if kind == DialogKind::AddBook {
            form.set_value(4, "1");
        }
        Self {
            kind,
            form,
            search_by: SearchBy::Title,
        }
    }

    fn cycle_search_by(&mut self, forward: bool) {
        let all = SearchBy::ALL;
        let current = all.iter().position(|by| *by == self.search_by).unwrap_or(0);
        let next = if forward {
            (current + 1) % all.len()
        } else {
            (current + all.len() - 1) % all.len()
        };
        self.search_by = all[next];
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Books,
    Genres,
}

impl TableKind {
    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            TableKind::Books => &["Title", "Author", "ISBN", "Genre", "Avail/Total"],
            TableKind::Genres => &["Genre", "Title", "Author", "ISBN", "Avail", "Total"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookTable {
    pub kind: TableKind,
    pub rows: Vec<Vec<String>>,
}

impl BookTable {
    fn books(books: &[&Book]) -> Self {
        Self {
            kind: TableKind::Books,
            rows: books
                .iter()
                .map(|b| {
                    vec![
                        b.title.clone(),
                        b.author.clone(),
                        b.isbn.clone(),
                        b.genre.clone(),
                        format!("{}/{}", b.available_copies, b.total_copies),
                    ]
                })
                .collect(),
        }
    }

    fn genres(groups: &[(String, Vec<&Book>)]) -> Self {
        let rows = groups
            .iter()
            .flat_map(|(genre, books)| {
                books.iter().map(move |b| {
                    vec![
                        genre.clone(),
                        b.title.clone(),
                        b.author.clone(),
                        b.isbn.clone(),
                        b.available_copies.to_string(),
                        b.total_copies.to_string(),
                    ]
                })
            })
            .collect();
        Self {
            kind: TableKind::Genres,
            rows,
        }
    }
}

/// Main-screen actions and the keys that trigger them.
pub const ACTIONS: [(char, &str); 9] = [
    ('l', "List Books"),
    ('a', "Add Book"),
    ('b', "Lend Book"),
    ('r', "Return Book"),
    ('s', "Search Books"),
    ('v', "Reserve Book"),
    ('g', "Filter Genre"),
    ('o', "Logout"),
    ('q', "Quit"),
];

pub struct TuiApp<C: Clock> {
    system: LibrarySystem<C>,
    title: String,
    pub(super) screen: Screen,
    pub(super) auth_tab: AuthTab,
    pub(super) login_form: Form,
    pub(super) register_form: Form,
    pub(super) table: BookTable,
    pub(super) dialog: Option<Dialog>,
    pub(super) popup: Option<Popup>,
    should_quit: bool,
}

impl<C: Clock> TuiApp<C> {
    pub fn new(system: LibrarySystem<C>, title: impl Into<String>) -> Self {
        Self {
            system,
            title: title.into(),
            screen: Screen::Auth,
            auth_tab: AuthTab::Login,
            login_form: Form::new(vec![FormField::new("User ID"), FormField::masked("Password")]),
            register_form: Form::new(vec![
                FormField::new("User ID"),
                FormField::new("Name"),
                FormField::masked("Password"),
            ]),
            table: BookTable {
                kind: TableKind::Books,
                rows: Vec::new(),
            },
            dialog: None,
            popup: None,
            should_quit: false,
        }
    }

    pub fn system(&self) -> &LibrarySystem<C> {
        &self.system
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn table(&self) -> &BookTable {
        &self.table
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.popup.is_some() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                self.popup = None;
            }
            return;
        }

        if self.dialog.is_some() {
            self.handle_dialog_key(key.code);
            return;
        }

        match self.screen {
            Screen::Auth => self.handle_auth_key(key.code),
            Screen::Main => self.handle_main_key(key.code),
        }
    }

    fn handle_auth_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => {
                self.auth_tab = match self.auth_tab {
                    AuthTab::Login => AuthTab::Register,
                    AuthTab::Register => AuthTab::Login,
                };
            }
            KeyCode::Enter => {
                if self.auth_form().on_last_field() {
                    match self.auth_tab {
                        AuthTab::Login => self.submit_login(),
                        AuthTab::Register => self.submit_register(),
                    }
                } else {
                    self.auth_form_mut().next();
                }
            }
            KeyCode::Down => self.auth_form_mut().next(),
            KeyCode::Up => self.auth_form_mut().prev(),
            KeyCode::Backspace => self.auth_form_mut().backspace(),
            KeyCode::Char(c) => self.auth_form_mut().push_char(c),
            _ => {}
        }
    }

    pub(super) fn auth_form(&self) -> &Form {
        match self.auth_tab {
            AuthTab::Login => &self.login_form,
            AuthTab::Register => &self.register_form,
        }
    }

    fn auth_form_mut(&mut self) -> &mut Form {
        match self.auth_tab {
            AuthTab::Login => &mut self.login_form,
            AuthTab::Register => &mut self.register_form,
        }
    }

    fn submit_login(&mut self) {
        let user_id = self.login_form.value(0).to_string();
        let password = self.login_form.value(1).to_string();
        match self.system.login(&user_id, &password) {
            Ok(_) => {
                self.login_form.clear();
                self.screen = Screen::Main;
                self.list_books();
                let notes = self.system.take_notifications();
                if !notes.is_empty() {
                    self.info("Notifications", notes.join("\n"));
                }
            }
            Err(_) => self.warn("Login Failed", "Invalid user ID or password."),
        }
    }

    fn submit_register(&mut self) {
        let user_id = self.register_form.value(0).to_string();
        let name = self.register_form.value(1).to_string();
        let password = self.register_form.value(2).to_string();
        match self.system.register_user(&user_id, &name, &password) {
            Ok(user) => {
                let message = format!("User '{}' registered.", user.name);
                self.register_form.clear();
                self.auth_tab = AuthTab::Login;
                self.login_form.set_value(0, user_id.trim());
                self.login_form.focus = 1;
                self.info("Registered", message);
            }
            Err(e) => self.warn("Error", e.user_friendly_message()),
        }
    }

    fn handle_main_key(&mut self, code: KeyCode) {
        let KeyCode::Char(c) = code else {
            if code == KeyCode::Esc {
                self.should_quit = true;
            }
            return;
        };
        match c.to_ascii_lowercase() {
            'l' => self.list_books(),
            'a' => self.dialog = Some(Dialog::new(DialogKind::AddBook)),
            'b' => self.dialog = Some(Dialog::new(DialogKind::Lend)),
            'r' => self.dialog = Some(Dialog::new(DialogKind::Return)),
            's' => self.dialog = Some(Dialog::new(DialogKind::Search)),
            'v' => self.dialog = Some(Dialog::new(DialogKind::Reserve)),
            'g' => self.filter_genre(),
            'o' => self.logout(),
            'q' => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_dialog_key(&mut self, code: KeyCode) {
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.dialog = None,
            KeyCode::Left if dialog.kind == DialogKind::Search => dialog.cycle_search_by(false),
            KeyCode::Right if dialog.kind == DialogKind::Search => dialog.cycle_search_by(true),
            KeyCode::Tab | KeyCode::Down => dialog.form.next(),
            KeyCode::BackTab | KeyCode::Up => dialog.form.prev(),
            KeyCode::Backspace => dialog.form.backspace(),
            KeyCode::Char(c) => dialog.form.push_char(c),
            KeyCode::Enter => {
                if dialog.form.on_last_field() {
                    self.submit_dialog();
                } else {
                    dialog.form.next();
                }
            }
            _ => {}
        }
    }

    fn submit_dialog(&mut self) {
        let Some(dialog) = self.dialog.take() else {
            return;
        };
        let form = &dialog.form;
        let outcome = match dialog.kind {
            DialogKind::AddBook => self.add_book(form),
            DialogKind::Lend => self
                .system
                .lend_book(form.value(0))
                .map(|due| {
                    self.list_books();
                    ("Lent", format!("Due on {}", due))
                }),
            DialogKind::Return => self.system.return_book(form.value(0)).map(|receipt| {
                let mut message = "Book returned.".to_string();
                if let Some(fine) = receipt.fine {
                    message.push_str(&format!("\nYou have a fine of {} for late return.", fine));
                }
                if let Some(next) = &receipt.notified {
                    message.push_str(&format!(
                        "\nNotification: {}, your reserved book '{}' is now available.",
                        next, receipt.title
                    ));
                }
                self.list_books();
                ("Returned", message)
            }),
            DialogKind::Reserve => self.system.reserve_book(form.value(0)).map(|position| {
                (
                    "Reserved",
                    format!("Book reserved. You are number {} in the queue.", position),
                )
            }),
            DialogKind::Search => {
                self.search(dialog.search_by, form.value(0));
                return;
            }
        };

        match outcome {
            Ok((title, message)) => self.info(title, message),
            Err(e) => {
                tracing::debug!("Dialog '{}' failed: {}", dialog.kind.title(), e);
                self.warn("Error", e.user_friendly_message());
                // keep the dialog open so the input can be corrected
                self.dialog = Some(dialog);
            }
        }
    }

    fn add_book(&mut self, form: &Form) -> crate::utils::error::Result<(&'static str, String)> {
        let count = form.value(4).trim().parse::<u32>().map_err(|_| {
            crate::utils::error::LibraryError::ValidationError {
                message: "Copies must be a whole number".to_string(),
            }
        })?;
        let entry = NewBook::new(
            form.value(0).trim(),
            form.value(1).trim(),
            form.value(2).trim(),
            form.value(3).trim(),
        );
        self.system.add_book(entry, count)?;
        self.list_books();
        Ok(("Success", "Book added.".to_string()))
    }

    fn list_books(&mut self) {
        match self.system.all_books() {
            Ok(books) => self.table = BookTable::books(&books),
            Err(e) => self.warn("Error", e.user_friendly_message()),
        }
    }

    fn search(&mut self, by: SearchBy, term: &str) {
        let (table, suggestions) = match self.system.search(by, term) {
            Ok(results) => (BookTable::books(&results.books), results.suggestions),
            Err(e) => {
                self.warn("Error", e.user_friendly_message());
                return;
            }
        };
        self.table = table;
        if !suggestions.is_empty() {
            self.info(
                "No exact match",
                format!("Did you mean: {}?", suggestions.join(", ")),
            );
        }
    }

    fn filter_genre(&mut self) {
        match self.system.filter_by_genre() {
            Ok(groups) => self.table = BookTable::genres(&groups),
            Err(e) => self.warn("Error", e.user_friendly_message()),
        }
    }

    fn logout(&mut self) {
        self.system.logout();
        self.screen = Screen::Auth;
        self.auth_tab = AuthTab::Login;
        self.table.rows.clear();
    }

    fn info(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.popup = Some(Popup {
            kind: PopupKind::Info,
            title: title.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.popup = Some(Popup {
            kind: PopupKind::Warning,
            title: title.into(),
            message: message.into(),
        });
    }
}
