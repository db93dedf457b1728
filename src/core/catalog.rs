use crate::core::search::{close_matches, MAX_SUGGESTIONS, SIMILARITY_CUTOFF};
use crate::domain::model::{Book, BookFormat, NewBook, SearchResults};
use crate::utils::error::{LibraryError, Result};
use chrono::{Duration, NaiveDateTime};
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_LOAN_PERIOD_DAYS: i64 = 14;

/// In-memory catalog keyed by ISBN. Iteration follows insertion order.
#[derive(Debug, Clone)]
pub struct Library {
    books: HashMap<String, Book>,
    order: Vec<String>,
    reservations: HashMap<String, VecDeque<String>>,
    loan_period: Duration,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    pub fn new() -> Self {
        Self::with_loan_period(Duration::days(DEFAULT_LOAN_PERIOD_DAYS))
    }

    pub fn with_loan_period(loan_period: Duration) -> Self {
        Self {
            books: HashMap::new(),
            order: Vec::new(),
            reservations: HashMap::new(),
            loan_period,
        }
    }

    pub fn loan_period(&self) -> Duration {
        self.loan_period
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Adds `count` copies. A known ISBN only grows its counters; the other
    /// fields of `book` are ignored in that case.
    pub fn add_book(&mut self, mut book: Book, count: u32) -> Result<()> {
        let title = book.title.clone();
        match self.books.get_mut(&book.isbn) {
            Some(existing) => {
                let too_many = || LibraryError::ValidationError {
                    message: format!("Too many copies of '{}'", existing.title),
                };
                let total = existing.total_copies.checked_add(count).ok_or_else(too_many)?;
                let available = existing
                    .available_copies
                    .checked_add(count)
                    .ok_or_else(too_many)?;
                existing.total_copies = total;
                existing.available_copies = available;
            }
            None => {
                book.total_copies = count;
                book.available_copies = count;
                self.order.push(book.isbn.clone());
                self.books.insert(book.isbn.clone(), book);
            }
        }
        tracing::info!("ADD_BOOK: {} x{}", title, count);
        Ok(())
    }

    pub fn add_ebook(&mut self, entry: NewBook, download_size_mb: f64) -> Result<()> {
        let title = entry.title.clone();
        let mut book = Book::new(entry, 1);
        book.format = BookFormat::Digital { download_size_mb };
        self.add_book(book, 1)?;
        tracing::info!("ADD_EBOOK: {}", title);
        Ok(())
    }

    /// Withdraws `count` shelved copies. Removing the last copy drops the
    /// title with its wait queue; the queued user ids are returned.
    pub fn remove_book(&mut self, isbn: &str, count: u32) -> Result<Vec<String>> {
        let book = self.get_mut(isbn)?;
        if count > book.available_copies {
            return Err(LibraryError::InsufficientCopies {
                isbn: isbn.to_string(),
                requested: count,
                available: book.available_copies,
            });
        }
        book.total_copies -= count;
        book.available_copies -= count;
        let mut dropped = Vec::new();
        if book.total_copies == 0 {
            self.books.remove(isbn);
            self.order.retain(|known| known != isbn);
            if let Some(queue) = self.reservations.remove(isbn) {
                dropped.extend(queue);
            }
        }
        tracing::info!("REMOVE_BOOK: {} x{}", isbn, count);
        if !dropped.is_empty() {
            tracing::info!("RESERVATION_DROPPED: {} for {}", isbn, dropped.join(", "));
        }
        Ok(dropped)
    }

    /// Takes one copy off the shelf and returns the due instant.
    pub fn lend_book(&mut self, isbn: &str, user_id: &str, now: NaiveDateTime) -> Result<NaiveDateTime> {
        let loan_period = self.loan_period;
        let book = self.get_mut(isbn)?;
        if book.available_copies == 0 {
            return Err(LibraryError::BookNotAvailable {
                isbn: isbn.to_string(),
            });
        }
        book.available_copies -= 1;
        let due = now + loan_period;
        tracing::info!("LEND_BOOK: {} to {}, due {}", isbn, user_id, due.date());
        Ok(due)
    }

    /// Puts one copy back and hands the book to the head of its wait queue,
    /// returning that user's id.
    pub fn return_book(&mut self, isbn: &str, user_id: &str) -> Result<Option<String>> {
        let book = self.get_mut(isbn)?;
        if book.available_copies < book.total_copies {
            book.available_copies += 1;
        } else {
            tracing::warn!("RETURN_BOOK: {} has no copies out, counter left at total", isbn);
        }

        let next_user = self
            .reservations
            .get_mut(isbn)
            .and_then(VecDeque::pop_front);
        if let Some(next) = &next_user {
            tracing::info!("RESERVATION_NOTIFY: {} to {}", isbn, next);
        }

        tracing::info!("RETURN_BOOK: {} by {}", isbn, user_id);
        Ok(next_user)
    }

    /// Queues `user_id` for a title with no copies left. Returns the 1-based
    /// position in the queue.
    pub fn reserve_book(&mut self, isbn: &str, user_id: &str) -> Result<usize> {
        let book = self.get(isbn)?;
        if book.is_available() {
            return Err(LibraryError::ReservationError {
                message: "Book is available; no need to reserve".to_string(),
            });
        }

        let queue = self.reservations.entry(isbn.to_string()).or_default();
        if queue.iter().any(|queued| queued == user_id) {
            return Err(LibraryError::ReservationError {
                message: "You are already in the wait queue for this book".to_string(),
            });
        }
        queue.push_back(user_id.to_string());
        tracing::info!("RESERVE_BOOK: {} by {}", isbn, user_id);
        Ok(queue.len())
    }

    pub fn reservation_queue(&self, isbn: &str) -> impl Iterator<Item = &str> {
        self.reservations
            .get(isbn)
            .into_iter()
            .flat_map(|queue| queue.iter().map(String::as_str))
    }

    pub fn books(&self) -> impl Iterator<Item = &Book> {
        self.order.iter().filter_map(|isbn| self.books.get(isbn))
    }

    pub fn available_books(&self) -> impl Iterator<Item = &Book> {
        self.books().filter(|book| book.is_available())
    }

    pub fn books_by_author<'a>(&'a self, author_name: &str) -> impl Iterator<Item = &'a Book> {
        let wanted = author_name.to_lowercase();
        self.books()
            .filter(move |book| book.author.to_lowercase() == wanted)
    }

    /// Substring match on titles. Falls back to close title suggestions when
    /// nothing contains `title`.
    pub fn search_by_title(&self, title: &str) -> SearchResults<'_> {
        let needle = title.to_lowercase();
        let books: Vec<&Book> = self
            .books()
            .filter(|book| book.title.to_lowercase().contains(&needle))
            .collect();
        if !books.is_empty() {
            return SearchResults {
                books,
                suggestions: Vec::new(),
            };
        }

        SearchResults {
            books,
            suggestions: close_matches(
                title,
                self.books().map(|book| book.title.as_str()),
                MAX_SUGGESTIONS,
                SIMILARITY_CUTOFF,
            ),
        }
    }

    pub fn search_by_author(&self, author: &str) -> Vec<&Book> {
        let needle = author.to_lowercase();
        self.books()
            .filter(|book| book.author.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn search_by_isbn(&self, isbn: &str) -> Option<&Book> {
        self.books.get(isbn)
    }

    /// Available books grouped by genre, genres in first-seen order.
    pub fn filter_by_genre(&self) -> Vec<(String, Vec<&Book>)> {
        let mut groups: Vec<(String, Vec<&Book>)> = Vec::new();
        for book in self.available_books() {
            match groups.iter_mut().find(|(genre, _)| *genre == book.genre) {
                Some((_, books)) => books.push(book),
                None => groups.push((book.genre.clone(), vec![book])),
            }
        }
        groups
    }

    fn get(&self, isbn: &str) -> Result<&Book> {
        self.books.get(isbn).ok_or_else(|| LibraryError::BookNotFound {
            isbn: isbn.to_string(),
        })
    }

    fn get_mut(&mut self, isbn: &str) -> Result<&mut Book> {
        self.books
            .get_mut(isbn)
            .ok_or_else(|| LibraryError::BookNotFound {
                isbn: isbn.to_string(),
            })
    }
}
