use crate::core::system::LibrarySystem;
use crate::domain::model::{NewBook, SearchBy};
use crate::domain::ports::Clock;
use crate::utils::error::{LibraryError, Result};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// Numbered-menu front end. Shows the auth menu while nobody is logged in
/// and the main menu otherwise; runs until Exit is chosen or input ends.
pub struct TextMenu<'a, C: Clock, R: BufRead, W: Write> {
    system: &'a mut LibrarySystem<C>,
    input: R,
    output: W,
    title: String,
}

impl<'a, C: Clock, R: BufRead, W: Write> TextMenu<'a, C, R, W> {
    pub fn new(system: &'a mut LibrarySystem<C>, input: R, output: W) -> Self {
        Self {
            system,
            input,
            output,
            title: "Library Management System".to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn run(&mut self) -> Result<()> {
        loop {
            let flow = if self.system.is_logged_in() {
                self.main_step()?
            } else {
                self.auth_step()?
            };
            if flow == Flow::Exit {
                writeln!(self.output, "Exiting system. Goodbye!")?;
                self.output.flush()?;
                return Ok(());
            }
        }
    }

    fn auth_step(&mut self) -> Result<Flow> {
        self.display_auth_menu()?;
        let Some(choice) = self.prompt("👉 Choose an option: ")? else {
            return Ok(Flow::Exit);
        };

        match choice.as_str() {
            "1" => {
                let Some(user_id) = self.prompt("   • User ID: ")? else {
                    return Ok(Flow::Exit);
                };
                let Some(name) = self.prompt("   • Name: ")? else {
                    return Ok(Flow::Exit);
                };
                let Some(password) = self.prompt("   • Password: ")? else {
                    return Ok(Flow::Exit);
                };
                match self.system.register_user(&user_id, &name, &password) {
                    Ok(user) => {
                        let name = user.name.clone();
                        writeln!(self.output, "User '{}' registered successfully.", name)?;
                    }
                    Err(e) => Self::report(&mut self.output, &e)?,
                }
            }
            "2" => {
                let Some(user_id) = self.prompt("   • User ID: ")? else {
                    return Ok(Flow::Exit);
                };
                let Some(password) = self.prompt("   • Password: ")? else {
                    return Ok(Flow::Exit);
                };
                match self.system.login(&user_id, &password) {
                    Ok(user) => {
                        let name = user.name.clone();
                        writeln!(self.output, "Welcome, {}!", name)?;
                    }
                    Err(e) => Self::report(&mut self.output, &e)?,
                }
            }
            "3" => return Ok(Flow::Exit),
            _ => writeln!(self.output, "❗ Invalid option, please enter 1, 2 or 3.")?,
        }
        Ok(Flow::Continue)
    }

    fn main_step(&mut self) -> Result<Flow> {
        for note in self.system.take_notifications() {
            writeln!(self.output, "{}", note)?;
        }
        self.display_main_menu()?;
        let Some(action) = self.prompt("👉 Select action [1–9]: ")? else {
            return Ok(Flow::Exit);
        };

        match action.as_str() {
            "1" => self.list_books()?,
            "2" => return self.add_book(),
            "3" => return self.lend_book(),
            "4" => return self.return_book(),
            "5" => return self.search_books(),
            "6" => return self.reserve_book(),
            "7" => self.filter_by_genre()?,
            "8" => {
                if let Some(name) = self.system.logout() {
                    writeln!(self.output, "Goodbye, {}.", name)?;
                }
            }
            "9" => return Ok(Flow::Exit),
            _ => writeln!(
                self.output,
                "❗ Invalid option, please enter a number from 1 to 9."
            )?,
        }
        Ok(Flow::Continue)
    }

    fn list_books(&mut self) -> Result<()> {
        writeln!(self.output, "\nAvailable Books:")?;
        match self.system.list_books() {
            Ok(books) => {
                for (idx, book) in books.iter().enumerate() {
                    writeln!(self.output, "{}. {}", idx + 1, book)?;
                }
            }
            Err(e) => Self::report(&mut self.output, &e)?,
        }
        Ok(())
    }

    fn add_book(&mut self) -> Result<Flow> {
        writeln!(self.output, "\n-- Add New Book --")?;
        let mut fields = Vec::with_capacity(5);
        for label in ["Title: ", "Author: ", "ISBN: ", "Genre: ", "Number of copies: "] {
            match self.prompt(label)? {
                Some(value) => fields.push(value),
                None => return Ok(Flow::Exit),
            }
        }
        let [title, author, isbn, genre, copies]: [String; 5] = match fields.try_into() {
            Ok(fields) => fields,
            Err(_) => return Ok(Flow::Continue),
        };

        let Ok(count) = copies.parse::<u32>() else {
            Self::report(&mut self.output, &LibraryError::ValidationError {
                message: "Number of copies must be a whole number".to_string(),
            })?;
            return Ok(Flow::Continue);
        };

        match self
            .system
            .add_book(NewBook::new(title.clone(), author, isbn, genre), count)
        {
            Ok(()) => writeln!(self.output, "Added '{}' ({} copies).", title, count)?,
            Err(e) => Self::report(&mut self.output, &e)?,
        }
        Ok(Flow::Continue)
    }

    fn lend_book(&mut self) -> Result<Flow> {
        let Some(isbn) = self.prompt("Enter ISBN to lend: ")? else {
            return Ok(Flow::Exit);
        };
        match self.system.lend_book(&isbn) {
            Ok(due) => writeln!(self.output, "Book lent successfully. Due on {}.", due)?,
            Err(e) => Self::report(&mut self.output, &e)?,
        }
        Ok(Flow::Continue)
    }

    fn return_book(&mut self) -> Result<Flow> {
        let Some(isbn) = self.prompt("Enter ISBN to return: ")? else {
            return Ok(Flow::Exit);
        };
        match self.system.return_book(&isbn) {
            Ok(receipt) => {
                if let Some(fine) = receipt.fine {
                    writeln!(self.output, "You have a fine of {} for late return.", fine)?;
                }
                if let Some(next) = &receipt.notified {
                    writeln!(
                        self.output,
                        "Notification: {}, your reserved book '{}' is now available.",
                        next, receipt.title
                    )?;
                }
                writeln!(self.output, "Book returned successfully.")?;
            }
            Err(e) => Self::report(&mut self.output, &e)?,
        }
        Ok(Flow::Continue)
    }

    fn search_books(&mut self) -> Result<Flow> {
        let Some(by) = self.prompt("Search by (title/author/isbn): ")? else {
            return Ok(Flow::Exit);
        };
        let Some(term) = self.prompt("Enter search term: ")? else {
            return Ok(Flow::Exit);
        };
        let Ok(by) = by.parse::<SearchBy>() else {
            writeln!(self.output, "Invalid search type.")?;
            return Ok(Flow::Continue);
        };

        let results = match self.system.search(by, &term) {
            Ok(results) => results,
            Err(e) => {
                Self::report(&mut self.output, &e)?;
                return Ok(Flow::Continue);
            }
        };

        writeln!(self.output, "\nSearch Results:")?;
        if results.is_empty() {
            writeln!(self.output, "No results found.")?;
        } else if results.books.is_empty() {
            writeln!(
                self.output,
                "No exact match. Did you mean: {}?",
                results.suggestions.join(", ")
            )?;
        } else {
            for book in &results.books {
                writeln!(self.output, "{}", book)?;
            }
        }
        Ok(Flow::Continue)
    }

    fn reserve_book(&mut self) -> Result<Flow> {
        let Some(isbn) = self.prompt("Enter ISBN to reserve: ")? else {
            return Ok(Flow::Exit);
        };
        match self.system.reserve_book(&isbn) {
            Ok(position) => writeln!(
                self.output,
                "Book reserved successfully. You are number {} in the queue.",
                position
            )?,
            Err(e) => Self::report(&mut self.output, &e)?,
        }
        Ok(Flow::Continue)
    }

    fn filter_by_genre(&mut self) -> Result<()> {
        match self.system.filter_by_genre() {
            Ok(groups) => {
                for (genre, books) in groups {
                    writeln!(self.output, "\nGenre: {}", genre)?;
                    for book in books {
                        writeln!(self.output, " - {}", book)?;
                    }
                }
            }
            Err(e) => Self::report(&mut self.output, &e)?,
        }
        Ok(())
    }

    fn display_auth_menu(&mut self) -> Result<()> {
        let rule = "-".repeat(50);
        writeln!(self.output, "\n{}", rule)?;
        writeln!(self.output, "📖  Welcome to the Library CLI  📖")?;
        writeln!(self.output, "{}", rule)?;
        writeln!(self.output, "[1] Register a new user")?;
        writeln!(self.output, "[2] Login")?;
        writeln!(self.output, "[3] Exit")?;
        writeln!(self.output, "{}", rule)?;
        Ok(())
    }

    fn display_main_menu(&mut self) -> Result<()> {
        let name = self
            .system
            .current_user()
            .map(|user| user.name.clone())
            .unwrap_or_default();
        writeln!(self.output, "\n{}", "=".repeat(60))?;
        writeln!(self.output, "👤  Logged in as: {}", name)?;
        writeln!(self.output, "📚  {}  📚", self.title)?;
        writeln!(self.output, "{}", "=".repeat(60))?;
        for line in [
            "[1]  List all available books",
            "[2]  Add a new book",
            "[3]  Lend a book",
            "[4]  Return a book",
            "[5]  Search for a book",
            "[6]  Reserve a book",
            "[7]  Filter books by genre",
            "[8]  Logout",
            "[9]  Exit",
        ] {
            writeln!(self.output, "{}", line)?;
        }
        writeln!(self.output, "{}", "-".repeat(60))?;
        Ok(())
    }

    /// Prints `label` and reads one trimmed line; `None` once input is exhausted.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn report(output: &mut W, error: &LibraryError) -> Result<()> {
        tracing::debug!("Menu action failed: {} (Category: {:?})", error, error.category());
        match error {
            LibraryError::InvalidCredentials
            | LibraryError::UserExists { .. }
            | LibraryError::NotBorrowed { .. }
            | LibraryError::NotLoggedIn => {
                writeln!(output, "{}", error.user_friendly_message())?
            }
            _ => writeln!(output, "Error: {}", error.user_friendly_message())?,
        }
        Ok(())
    }
}
