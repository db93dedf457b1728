use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Book not found in library: {isbn}")]
    BookNotFound { isbn: String },

    #[error("Book currently not available: {isbn}")]
    BookNotAvailable { isbn: String },

    #[error("Cannot remove {requested} copies of {isbn}: only {available} available")]
    InsufficientCopies {
        isbn: String,
        requested: u32,
        available: u32,
    },

    #[error("You have reached your borrow limit of {limit} books")]
    UserLimitExceeded { limit: usize },

    #[error("You already borrowed this book: {isbn}")]
    AlreadyBorrowed { isbn: String },

    #[error("You did not borrow this book: {isbn}")]
    NotBorrowed { isbn: String },

    #[error("Reservation error: {message}")]
    ReservationError { message: String },

    #[error("User ID already exists: {user_id}")]
    UserExists { user_id: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Please login first")]
    NotLoggedIn,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Catalog,
    Account,
    Session,
    Validation,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LibraryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LibraryError::BookNotFound { .. }
            | LibraryError::BookNotAvailable { .. }
            | LibraryError::InsufficientCopies { .. }
            | LibraryError::ReservationError { .. } => ErrorCategory::Catalog,
            LibraryError::UserLimitExceeded { .. }
            | LibraryError::AlreadyBorrowed { .. }
            | LibraryError::NotBorrowed { .. }
            | LibraryError::UserExists { .. } => ErrorCategory::Account,
            LibraryError::ValidationError { .. } => ErrorCategory::Validation,
            LibraryError::InvalidCredentials | LibraryError::NotLoggedIn => {
                ErrorCategory::Session
            }
            LibraryError::ConfigError { .. } | LibraryError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            LibraryError::IoError(_) | LibraryError::CsvError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Catalog | ErrorCategory::Account => ErrorSeverity::Low,
            ErrorCategory::Session | ErrorCategory::Validation => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// Short message suitable for a menu line or a popup.
    pub fn user_friendly_message(&self) -> String {
        match self {
            LibraryError::BookNotFound { .. } => "Book not found in library".to_string(),
            LibraryError::BookNotAvailable { .. } => "Book currently not available".to_string(),
            LibraryError::InsufficientCopies { .. } => {
                "Cannot remove more copies than available".to_string()
            }
            LibraryError::UserLimitExceeded { .. } => {
                "You have reached your borrow limit.".to_string()
            }
            LibraryError::AlreadyBorrowed { .. } => "You already borrowed this book.".to_string(),
            LibraryError::NotBorrowed { .. } => "You did not borrow this book.".to_string(),
            LibraryError::ReservationError { message } => message.clone(),
            LibraryError::UserExists { .. } => "User ID already exists.".to_string(),
            LibraryError::InvalidCredentials => "Invalid credentials.".to_string(),
            LibraryError::NotLoggedIn => "Please login first.".to_string(),
            LibraryError::ValidationError { message } => message.clone(),
            LibraryError::IoError(e) => format!("File access failed: {}", e),
            LibraryError::CsvError(e) => format!("Catalog file could not be read: {}", e),
            LibraryError::ConfigError { message } => format!("Configuration problem: {}", message),
            LibraryError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration value '{}' is invalid: {}", field, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LibraryError::BookNotFound { .. } => "Check the ISBN or search the catalog first",
            LibraryError::BookNotAvailable { .. } => "Reserve the book to join the wait queue",
            LibraryError::InsufficientCopies { .. } => "Wait until lent copies are returned",
            LibraryError::UserLimitExceeded { .. } => "Return a book before borrowing another",
            LibraryError::AlreadyBorrowed { .. } => "Return the current copy first",
            LibraryError::NotBorrowed { .. } => "Check the ISBN of the book you borrowed",
            LibraryError::ReservationError { .. } => "Lend the book directly if copies remain",
            LibraryError::UserExists { .. } => "Pick a different user ID or login instead",
            LibraryError::InvalidCredentials => "Check your user ID and password",
            LibraryError::NotLoggedIn => "Login or register a user first",
            LibraryError::ValidationError { .. } => "Fill in every required field",
            LibraryError::IoError(_) => "Check that the file exists and is readable",
            LibraryError::CsvError(_) => {
                "Use a CSV file with the header title,author,isbn,genre,copies"
            }
            LibraryError::ConfigError { .. } | LibraryError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
