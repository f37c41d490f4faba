pub use memory::InMemoryBookRepository;
pub use postgres::PgBookRepository;

use super::error::BookError;
use super::models::{Book, BookUpdate};

mod memory;
mod postgres;

/// Every read and write of the `books` table goes through this trait.
/// Inputs are already validated; each call is one atomic statement.
#[async_trait::async_trait]
pub trait BookRepository: Send + Sync {
    /// All books ordered by title, then isbn
    async fn list(&self) -> Result<Vec<Book>, BookError>;

    async fn get(&self, isbn: &str) -> Result<Book, BookError>;

    /// Fails with [`BookError::Conflict`] when the isbn is taken
    async fn create(&self, book: Book) -> Result<Book, BookError>;

    /// Overwrites every field except the isbn
    async fn update(&self, isbn: &str, fields: BookUpdate) -> Result<Book, BookError>;

    async fn delete(&self, isbn: &str) -> Result<(), BookError>;
}
