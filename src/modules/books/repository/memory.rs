use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use tokio::sync::RwLock;

use super::BookRepository;
use crate::modules::books::error::BookError;
use crate::modules::books::models::{Book, BookUpdate};

/// Process-local store with the same contract as the PostgreSQL one.
#[derive(Default)]
pub struct InMemoryBookRepository {
    books: RwLock<BTreeMap<String, Book>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn list(&self) -> Result<Vec<Book>, BookError> {
        let mut books: Vec<Book> = self.books.read().await.values().cloned().collect();
        books.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.isbn.cmp(&b.isbn)));
        Ok(books)
    }

    async fn get(&self, isbn: &str) -> Result<Book, BookError> {
        self.books
            .read()
            .await
            .get(isbn)
            .cloned()
            .ok_or_else(|| BookError::NotFound(isbn.to_string()))
    }

    async fn create(&self, book: Book) -> Result<Book, BookError> {
        match self.books.write().await.entry(book.isbn.clone()) {
            Entry::Occupied(entry) => Err(BookError::Conflict(entry.key().clone())),
            Entry::Vacant(entry) => Ok(entry.insert(book).clone()),
        }
    }

    async fn update(&self, isbn: &str, fields: BookUpdate) -> Result<Book, BookError> {
        let mut books = self.books.write().await;
        let stored = books
            .get_mut(isbn)
            .ok_or_else(|| BookError::NotFound(isbn.to_string()))?;
        *stored = fields.into_book(isbn);
        Ok(stored.clone())
    }

    async fn delete(&self, isbn: &str) -> Result<(), BookError> {
        self.books
            .write()
            .await
            .remove(isbn)
            .map(|_| ())
            .ok_or_else(|| BookError::NotFound(isbn.to_string()))
    }
}
