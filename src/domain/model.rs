use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BookFormat {
    Print,
    Digital { download_size_mb: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub format: BookFormat,
    pub total_copies: u32,
    pub available_copies: u32,
}

impl Book {
    pub fn new(entry: NewBook, copies: u32) -> Self {
        Self {
            title: entry.title,
            author: entry.author,
            isbn: entry.isbn,
            genre: entry.genre,
            format: BookFormat::Print,
            total_copies: copies,
            available_copies: copies,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }

    pub fn lent_copies(&self) -> u32 {
        self.total_copies - self.available_copies
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} by {} (ISBN: {}) - {}/{} available",
            self.title, self.author, self.isbn, self.available_copies, self.total_copies
        )
    }
}

/// Catalog entry as typed into a form or read from a seed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            genre: genre.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub isbn: String,
    pub borrowed_at: NaiveDateTime,
    pub due: NaiveDateTime,
}

impl Loan {
    pub fn due_date(&self) -> NaiveDate {
        self.due.date()
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: String,
    pub name: String,
    password: String,
    pub borrowed: HashMap<String, Loan>,
    pub reserved: BTreeSet<String>,
    pub notifications: Vec<String>,
}

impl User {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            password: password.into(),
            borrowed: HashMap::new(),
            reserved: BTreeSet::new(),
            notifications: Vec::new(),
        }
    }

    pub fn verify_password(&self, password: &str) -> bool {
        self.password == password
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fine {
    pub days_late: i64,
    pub amount: u64,
}

impl fmt::Display for Fine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub isbn: String,
    pub title: String,
    pub fine: Option<Fine>,
    /// User popped from the reservation queue by this return.
    pub notified: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBy {
    Title,
    Author,
    Isbn,
}

impl SearchBy {
    pub const ALL: [SearchBy; 3] = [SearchBy::Title, SearchBy::Author, SearchBy::Isbn];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchBy::Title => "title",
            SearchBy::Author => "author",
            SearchBy::Isbn => "isbn",
        }
    }
}

impl FromStr for SearchBy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SearchBy::Title),
            "author" => Ok(SearchBy::Author),
            "isbn" => Ok(SearchBy::Isbn),
            other => Err(format!("Invalid search type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchResults<'a> {
    pub books: Vec<&'a Book>,
    /// Close title matches, filled only when a title search found nothing.
    pub suggestions: Vec<String>,
}

impl SearchResults<'_> {
    pub fn is_empty(&self) -> bool {
        self.books.is_empty() && self.suggestions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_display() {
        let mut book = Book::new(
            NewBook::new("1984", "George Orwell", "9780451524935", "Dystopian Fiction"),
            3,
        );
        book.available_copies = 2;
        assert_eq!(
            book.to_string(),
            "1984 by George Orwell (ISBN: 9780451524935) - 2/3 available"
        );
        assert_eq!(book.lent_copies(), 1);
    }

    #[test]
    fn test_search_by_parsing() {
        assert_eq!(" Title ".parse::<SearchBy>(), Ok(SearchBy::Title));
        assert_eq!("AUTHOR".parse::<SearchBy>(), Ok(SearchBy::Author));
        assert_eq!("isbn".parse::<SearchBy>(), Ok(SearchBy::Isbn));
        assert!("genre".parse::<SearchBy>().is_err());
    }

    #[test]
    fn test_verify_password() {
        let user = User::new("u1", "Ada", "secret");
        assert!(user.verify_password("secret"));
        assert!(!user.verify_password("Secret"));
    }
}
