use crate::config::policy::LendingPolicy;
use crate::config::seed::{default_catalog, read_catalog_csv};
use crate::core::catalog::Library;
use crate::domain::model::{
    Book, Loan, NewBook, ReturnReceipt, SearchBy, SearchResults, User,
};
use crate::domain::ports::{Clock, SystemClock};
use crate::utils::error::{LibraryError, Result};
use crate::utils::validation::validate_non_empty_string;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;

/// Session-level facade shared by both front ends: user accounts, the
/// logged-in user and the lending rules on top of [`Library`].
pub struct LibrarySystem<C: Clock = SystemClock> {
    library: Library,
    users: HashMap<String, User>,
    current_user: Option<String>,
    policy: LendingPolicy,
    clock: C,
}

impl LibrarySystem<SystemClock> {
    pub fn new(policy: LendingPolicy) -> Self {
        Self::with_clock(policy, SystemClock)
    }
}

impl Default for LibrarySystem<SystemClock> {
    fn default() -> Self {
        Self::new(LendingPolicy::default())
    }
}

impl<C: Clock> LibrarySystem<C> {
    pub fn with_clock(policy: LendingPolicy, clock: C) -> Self {
        Self {
            library: Library::with_loan_period(policy.loan_period()),
            users: HashMap::new(),
            current_user: None,
            policy,
            clock,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn policy(&self) -> &LendingPolicy {
        &self.policy
    }

    pub fn user(&self, user_id: &str) -> Option<&User> {
        self.users.get(user_id)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user
            .as_deref()
            .and_then(|user_id| self.users.get(user_id))
    }

    pub fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    pub fn register_user(&mut self, user_id: &str, name: &str, password: &str) -> Result<&User> {
        let user_id = user_id.trim();
        let name = name.trim();
        validate_non_empty_string("User ID", user_id)?;
        validate_non_empty_string("Name", name)?;
        if self.users.contains_key(user_id) {
            return Err(LibraryError::UserExists {
                user_id: user_id.to_string(),
            });
        }

        tracing::info!("REGISTER_USER: {}", user_id);
        let user = self
            .users
            .entry(user_id.to_string())
            .or_insert_with(|| User::new(user_id, name, password));
        Ok(user)
    }

    pub fn login(&mut self, user_id: &str, password: &str) -> Result<&User> {
        let user_id = user_id.trim();
        match self.users.get(user_id) {
            Some(user) if user.verify_password(password) => {
                tracing::info!("LOGIN: {}", user_id);
                self.current_user = Some(user_id.to_string());
                Ok(user)
            }
            _ => {
                tracing::warn!("LOGIN_FAILED: {}", user_id);
                Err(LibraryError::InvalidCredentials)
            }
        }
    }

    /// Ends the session and returns the name of the user who left.
    pub fn logout(&mut self) -> Option<String> {
        let name = self.current_user().map(|user| user.name.clone());
        if let Some(user_id) = self.current_user.take() {
            tracing::info!("LOGOUT: {}", user_id);
        }
        name
    }

    pub fn list_books(&self) -> Result<Vec<&Book>> {
        self.session_user()?;
        Ok(self.library.available_books().collect())
    }

    pub fn all_books(&self) -> Result<Vec<&Book>> {
        self.session_user()?;
        Ok(self.library.books().collect())
    }

    pub fn add_book(&mut self, entry: NewBook, count: u32) -> Result<()> {
        self.session_user()?;
        validate_new_book(&entry)?;
        if count == 0 {
            return Err(LibraryError::ValidationError {
                message: "Number of copies must be at least 1".to_string(),
            });
        }
        self.library.add_book(Book::new(entry, count), count)
    }

    pub fn add_ebook(&mut self, entry: NewBook, download_size_mb: f64) -> Result<()> {
        self.session_user()?;
        validate_new_book(&entry)?;
        self.library.add_ebook(entry, download_size_mb)
    }

    /// Withdraws copies. When the title goes away, everyone still waiting for
    /// it loses the reservation and is told so.
    pub fn remove_book(&mut self, isbn: &str, count: u32) -> Result<()> {
        let isbn = isbn.trim();
        self.session_user()?;
        let title = self
            .library
            .search_by_isbn(isbn)
            .map(|book| book.title.clone())
            .unwrap_or_default();

        for user_id in self.library.remove_book(isbn, count)? {
            if let Some(waiting) = self.users.get_mut(&user_id) {
                waiting.reserved.remove(isbn);
                waiting.notifications.push(format!(
                    "Notification: {}, your reserved book '{}' was withdrawn from the catalog.",
                    user_id, title
                ));
            }
        }
        Ok(())
    }

    /// Lends one copy to the current user and returns the due date.
    pub fn lend_book(&mut self, isbn: &str) -> Result<NaiveDate> {
        let isbn = isbn.trim();
        let user = self.session_user()?;
        if user.borrowed.len() >= self.policy.borrow_limit {
            return Err(LibraryError::UserLimitExceeded {
                limit: self.policy.borrow_limit,
            });
        }
        if user.borrowed.contains_key(isbn) {
            return Err(LibraryError::AlreadyBorrowed {
                isbn: isbn.to_string(),
            });
        }
        let user_id = user.user_id.clone();

        let now = self.clock.now();
        let due = self.library.lend_book(isbn, &user_id, now)?;
        let user = self.session_user_mut()?;
        user.borrowed.insert(
            isbn.to_string(),
            Loan {
                isbn: isbn.to_string(),
                borrowed_at: now,
                due,
            },
        );
        Ok(due.date())
    }

    pub fn return_book(&mut self, isbn: &str) -> Result<ReturnReceipt> {
        let isbn = isbn.trim();
        let user = self.session_user()?;
        let loan = user
            .borrowed
            .get(isbn)
            .cloned()
            .ok_or_else(|| LibraryError::NotBorrowed {
                isbn: isbn.to_string(),
            })?;
        let user_id = user.user_id.clone();

        let returned_on = self.clock.now().date();
        let next_user = self.library.return_book(isbn, &user_id)?;
        let title = self
            .library
            .search_by_isbn(isbn)
            .map(|book| book.title.clone())
            .unwrap_or_default();

        self.session_user_mut()?.borrowed.remove(isbn);

        let fine = self.policy.fine_for(loan.due_date(), returned_on);
        if let Some(fine) = &fine {
            tracing::info!("LATE_FINE: {} by {}, {} days, {}", isbn, user_id, fine.days_late, fine);
        }

        if let Some(next) = &next_user {
            if let Some(waiting) = self.users.get_mut(next) {
                waiting.reserved.remove(isbn);
                waiting.notifications.push(format!(
                    "Notification: {}, your reserved book '{}' is now available.",
                    next, title
                ));
            }
        }

        Ok(ReturnReceipt {
            isbn: isbn.to_string(),
            title,
            fine,
            notified: next_user,
        })
    }

    pub fn search(&self, by: SearchBy, term: &str) -> Result<SearchResults<'_>> {
        self.session_user()?;
        let term = term.trim();
        let results = match by {
            SearchBy::Title => self.library.search_by_title(term),
            SearchBy::Author => SearchResults {
                books: self.library.search_by_author(term),
                suggestions: Vec::new(),
            },
            SearchBy::Isbn => SearchResults {
                books: self.library.search_by_isbn(term).into_iter().collect(),
                suggestions: Vec::new(),
            },
        };
        tracing::debug!(
            "SEARCH: by {} '{}' -> {} books, {} suggestions",
            by.as_str(),
            term,
            results.books.len(),
            results.suggestions.len()
        );
        Ok(results)
    }

    /// Joins the wait queue and returns the queue position.
    pub fn reserve_book(&mut self, isbn: &str) -> Result<usize> {
        let isbn = isbn.trim();
        let user = self.session_user()?;
        if user.borrowed.contains_key(isbn) {
            return Err(LibraryError::ReservationError {
                message: "You are currently borrowing this book".to_string(),
            });
        }
        let user_id = user.user_id.clone();
        let position = self.library.reserve_book(isbn, &user_id)?;
        self.session_user_mut()?.reserved.insert(isbn.to_string());
        Ok(position)
    }

    pub fn filter_by_genre(&self) -> Result<Vec<(String, Vec<&Book>)>> {
        self.session_user()?;
        Ok(self.library.filter_by_genre())
    }

    /// Drains messages queued for the logged-in user.
    pub fn take_notifications(&mut self) -> Vec<String> {
        match self.session_user_mut() {
            Ok(user) => std::mem::take(&mut user.notifications),
            Err(_) => Vec::new(),
        }
    }

    /// Stocks the default classics, one copy each.
    pub fn seed_library(&mut self) {
        for entry in default_catalog() {
            let title = entry.title.clone();
            if let Err(e) = self.library.add_book(Book::new(entry, 1), 1) {
                tracing::warn!("Skipped seeding '{}': {}", title, e);
            }
        }
    }

    /// Stocks titles from a `title,author,isbn,genre,copies` CSV file and
    /// returns how many rows were loaded.
    pub fn seed_from_csv<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let rows = read_catalog_csv(path)?;
        let loaded = rows.len();
        for (entry, copies) in rows {
            self.library.add_book(Book::new(entry, copies), copies)?;
        }
        Ok(loaded)
    }

    fn session_user(&self) -> Result<&User> {
        self.current_user().ok_or(LibraryError::NotLoggedIn)
    }

    fn session_user_mut(&mut self) -> Result<&mut User> {
        let user_id = self.current_user.as_deref().ok_or(LibraryError::NotLoggedIn)?;
        self.users.get_mut(user_id).ok_or(LibraryError::NotLoggedIn)
    }
}

fn validate_new_book(entry: &NewBook) -> Result<()> {
    validate_non_empty_string("Title", &entry.title)?;
    validate_non_empty_string("ISBN", &entry.isbn)?;
    Ok(())
}
