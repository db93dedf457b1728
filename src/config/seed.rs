use crate::domain::model::NewBook;
use crate::utils::error::{LibraryError, Result};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_BOOKS: [(&str, &str, &str, &str); 10] = [
    ("To Kill a Mockingbird", "Harper Lee", "9780061120084", "Classic Fiction"),
    ("1984", "George Orwell", "9780451524935", "Dystopian Fiction"),
    ("Pride and Prejudice", "Jane Austen", "9780141199078", "Classic Romance"),
    ("The Great Gatsby", "F. Scott Fitzgerald", "9780743273565", "Classic Fiction"),
    ("Moby-Dick", "Herman Melville", "9781503280786", "Adventure Fiction"),
    ("War and Peace", "Leo Tolstoy", "9780199232765", "Historical Fiction"),
    ("The Catcher in the Rye", "J.D. Salinger", "9780316769488", "Literary Fiction"),
    ("The Hobbit", "J.R.R. Tolkien", "9780547928227", "Fantasy"),
    ("Fahrenheit 451", "Ray Bradbury", "9781451673319", "Dystopian Fiction"),
    ("Brave New World", "Aldous Huxley", "9780060850524", "Dystopian Fiction"),
];

pub fn default_catalog() -> Vec<NewBook> {
    DEFAULT_BOOKS
        .iter()
        .map(|(title, author, isbn, genre)| NewBook::new(*title, *author, *isbn, *genre))
        .collect()
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    title: String,
    author: String,
    isbn: String,
    genre: String,
    #[serde(default = "one")]
    copies: u32,
}

fn one() -> u32 {
    1
}

/// Reads `title,author,isbn,genre,copies` rows. A missing `copies` column
/// means one copy; zero copies or a blank title/ISBN rejects the file.
pub fn read_catalog_csv<P: AsRef<Path>>(path: P) -> Result<Vec<(NewBook, u32)>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let mut rows = Vec::new();
    for (index, record) in reader.deserialize::<CatalogRow>().enumerate() {
        let row = record?;
        // header is line 1
        let line = index + 2;
        if row.title.is_empty() || row.isbn.is_empty() {
            return Err(LibraryError::ValidationError {
                message: format!("Catalog line {}: title and isbn are required", line),
            });
        }
        if row.copies == 0 {
            return Err(LibraryError::ValidationError {
                message: format!("Catalog line {}: copies must be at least 1", line),
            });
        }
        rows.push((NewBook::new(row.title, row.author, row.isbn, row.genre), row.copies));
    }

    tracing::debug!("Read {} catalog rows from {}", rows.len(), path.as_ref().display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_catalog_has_unique_isbns() {
        let catalog = default_catalog();
        let mut isbns: Vec<&str> = catalog.iter().map(|b| b.isbn.as_str()).collect();
        isbns.sort_unstable();
        isbns.dedup();
        assert_eq!(isbns.len(), 10);
    }

    #[test]
    fn test_read_catalog_csv() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "title,author,isbn,genre,copies").unwrap();
        writeln!(file, "Dune, Frank Herbert ,9780441172719,Science Fiction,3").unwrap();
        writeln!(file, "\"Good Omens\",Pratchett & Gaiman,9780060853983,Fantasy,1").unwrap();

        let rows = read_catalog_csv(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0.author, "Frank Herbert");
        assert_eq!(rows[0].1, 3);
        assert_eq!(rows[1].0.title, "Good Omens");
    }

    #[test]
    fn test_read_catalog_csv_rejects_zero_copies() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "title,author,isbn,genre,copies").unwrap();
        writeln!(file, "Dune,Frank Herbert,9780441172719,Science Fiction,0").unwrap();

        let err = read_catalog_csv(file.path()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_read_catalog_csv_missing_file() {
        assert!(matches!(
            read_catalog_csv("/definitely/not/here.csv"),
            Err(LibraryError::CsvError(_))
        ));
    }
}
