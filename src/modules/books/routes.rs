//! HTTP handlers for `/books`.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use bookstore_http::AppError;
use serde_json::Value;

use super::error::BookError;
use super::models::{BookEnvelope, BookList, Message};
use super::repository::BookRepository;
use super::schema;

pub type SharedRepository = Arc<dyn BookRepository>;

pub fn router(repository: SharedRepository) -> Router {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route(
            "/{isbn}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(repository)
}

async fn list_books(State(repo): State<SharedRepository>) -> Result<Json<BookList>, AppError> {
    let books = repo.list().await?;
    Ok(Json(BookList { books }))
}

async fn get_book(
    State(repo): State<SharedRepository>,
    Path(isbn): Path<String>,
) -> Result<Json<BookEnvelope>, AppError> {
    let book = repo.get(&isbn).await?;
    Ok(Json(BookEnvelope { book }))
}

async fn create_book(
    State(repo): State<SharedRepository>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<BookEnvelope>), AppError> {
    let Json(payload) = payload?;
    let book = schema::validate_new_book(&payload).map_err(BookError::from)?;

    let book = repo.create(book).await?;
    tracing::info!(isbn = %book.isbn, "book created");
    Ok((StatusCode::CREATED, Json(BookEnvelope { book })))
}

async fn update_book(
    State(repo): State<SharedRepository>,
    Path(isbn): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BookEnvelope>, AppError> {
    let Json(payload) = payload?;
    let fields = schema::validate_book_update(&isbn, &payload).map_err(BookError::from)?;

    let book = repo.update(&isbn, fields).await?;
    tracing::info!(isbn = %book.isbn, "book updated");
    Ok(Json(BookEnvelope { book }))
}

async fn delete_book(
    State(repo): State<SharedRepository>,
    Path(isbn): Path<String>,
) -> Result<Json<Message>, AppError> {
    repo.delete(&isbn).await?;
    tracing::info!(%isbn, "book deleted");
    Ok(Json(Message {
        message: "Book deleted".to_string(),
    }))
}
