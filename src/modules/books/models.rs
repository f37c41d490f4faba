use serde::{Deserialize, Serialize};

/// A row of the `books` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Book {
    /// Primary key; immutable once created
    pub isbn: String,
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    /// Always positive
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    /// Always positive
    pub year: i32,
}

/// Full replacement of every field except the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUpdate {
    pub amazon_url: String,
    pub author: String,
    pub language: String,
    pub pages: i32,
    pub publisher: String,
    pub title: String,
    pub year: i32,
}

impl BookUpdate {
    pub fn into_book(self, isbn: impl Into<String>) -> Book {
        Book {
            isbn: isbn.into(),
            amazon_url: self.amazon_url,
            author: self.author,
            language: self.language,
            pages: self.pages,
            publisher: self.publisher,
            title: self.title,
            year: self.year,
        }
    }
}

/// `{"books": [...]}`
#[derive(Debug, Serialize, Deserialize)]
pub struct BookList {
    pub books: Vec<Book>,
}

/// `{"book": {...}}`
#[derive(Debug, Serialize, Deserialize)]
pub struct BookEnvelope {
    pub book: Book,
}

/// `{"message": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}
