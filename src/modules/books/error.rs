use bookstore_http::AppError;
use serde_json::json;

use super::schema::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum BookError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("book {0} not found")]
    NotFound(String),

    #[error("book {0} already exists")]
    Conflict(String),

    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::Validation(err) => {
                let message = err.to_string();
                let details = err
                    .violations
                    .into_iter()
                    .map(|v| json!({"field": v.field, "error": v.error}))
                    .collect();
                AppError::validation(details, message)
            }
            BookError::NotFound(_) => AppError::not_found(err.to_string()),
            BookError::Conflict(_) => AppError::conflict(
                vec![json!({"field": "isbn", "error": "already exists"})],
                err.to_string(),
            ),
            BookError::Storage(source) => {
                AppError::Internal(anyhow::Error::new(source).context("book storage failed"))
            }
        }
    }
}
