use sqlx::PgPool;

use super::BookRepository;
use crate::modules::books::error::BookError;
use crate::modules::books::models::{Book, BookUpdate};

pub struct PgBookRepository {
    pool: PgPool,
}

impl PgBookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl BookRepository for PgBookRepository {
    async fn list(&self) -> Result<Vec<Book>, BookError> {
        let books = sqlx::query_as::<_, Book>(
            // language=postgresql
            r#"
            SELECT isbn, amazon_url, author, language, pages, publisher, title, year
            FROM books
            ORDER BY title, isbn
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn get(&self, isbn: &str) -> Result<Book, BookError> {
        let row = sqlx::query_as::<_, Book>(
            // language=postgresql
            r#"
            SELECT isbn, amazon_url, author, language, pages, publisher, title, year
            FROM books
            WHERE isbn = $1
            "#,
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| BookError::NotFound(isbn.to_string()))
    }

    async fn create(&self, book: Book) -> Result<Book, BookError> {
        // An existing key yields no row instead of a unique-violation error.
        let row = sqlx::query_as::<_, Book>(
            // language=postgresql
            r#"
            INSERT INTO books (isbn, amazon_url, author, language, pages, publisher, title, year)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (isbn) DO NOTHING
            RETURNING isbn, amazon_url, author, language, pages, publisher, title, year
            "#,
        )
        .bind(&book.isbn)
        .bind(&book.amazon_url)
        .bind(&book.author)
        .bind(&book.language)
        .bind(book.pages)
        .bind(&book.publisher)
        .bind(&book.title)
        .bind(book.year)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(BookError::Conflict(book.isbn))
    }

    async fn update(&self, isbn: &str, fields: BookUpdate) -> Result<Book, BookError> {
        let row = sqlx::query_as::<_, Book>(
            // language=postgresql
            r#"
            UPDATE books
            SET amazon_url = $2, author = $3, language = $4, pages = $5,
                publisher = $6, title = $7, year = $8
            WHERE isbn = $1
            RETURNING isbn, amazon_url, author, language, pages, publisher, title, year
            "#,
        )
        .bind(isbn)
        .bind(&fields.amazon_url)
        .bind(&fields.author)
        .bind(&fields.language)
        .bind(fields.pages)
        .bind(&fields.publisher)
        .bind(&fields.title)
        .bind(fields.year)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or_else(|| BookError::NotFound(isbn.to_string()))
    }

    async fn delete(&self, isbn: &str) -> Result<(), BookError> {
        let deleted = sqlx::query_scalar::<_, String>(
            // language=postgresql
            r#"
            DELETE FROM books
            WHERE isbn = $1
            RETURNING isbn
            "#,
        )
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| BookError::NotFound(isbn.to_string()))
    }
}
