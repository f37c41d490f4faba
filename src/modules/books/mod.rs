pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod schema;

use async_trait::async_trait;
use axum::Router;
use bookstore_kernel::{InitCtx, Migration, Module};
use serde_json::json;

use routes::SharedRepository;

pub const MODULE_NAME: &str = "books";

pub const CREATE_BOOKS: Migration = Migration {
    id: "001_create_books",
    up: r#"
        CREATE TABLE IF NOT EXISTS books (
            isbn       TEXT PRIMARY KEY,
            amazon_url TEXT NOT NULL,
            author     TEXT NOT NULL,
            language   TEXT NOT NULL,
            pages      INTEGER NOT NULL CHECK (pages > 0),
            publisher  TEXT NOT NULL,
            title      TEXT NOT NULL,
            year       INTEGER NOT NULL CHECK (year > 0)
        );
        "#,
};

/// The `/books` resource backed by a [`repository::BookRepository`]
pub struct BooksModule {
    repository: SharedRepository,
}

impl BooksModule {
    pub fn new(repository: SharedRepository) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = %ctx.settings.environment,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.repository.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![CREATE_BOOKS]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

fn json_response(description: &str, schema: serde_json::Value) -> serde_json::Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": schema } }
    })
}

fn error_response(description: &str) -> serde_json::Value {
    json_response(
        description,
        json!({ "$ref": "#/components/schemas/ErrorResponse" }),
    )
}

fn book_envelope(description: &str) -> serde_json::Value {
    json_response(description, json!({ "$ref": "#/components/schemas/BookEnvelope" }))
}

fn request_body(schema: &str) -> serde_json::Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{schema}") }
            }
        }
    })
}

fn openapi_fragment() -> serde_json::Value {
    let isbn_param = json!([{
        "name": "isbn",
        "in": "path",
        "required": true,
        "schema": { "type": "string" }
    }]);

    let mut book_schema = json!({
        "type": "object",
        "properties": {},
        "required": []
    });
    for rule in schema::BOOK_SCHEMA {
        let property = match rule.kind {
            schema::FieldKind::Text => json!({ "type": "string", "minLength": 1 }),
            schema::FieldKind::PositiveInteger => json!({
                "type": "integer",
                "format": "int32",
                "minimum": 1,
                "maximum": i32::MAX
            }),
        };
        book_schema["properties"][rule.name] = property;
        if rule.required {
            if let Some(required) = book_schema["required"].as_array_mut() {
                required.push(json!(rule.name));
            }
        }
    }

    let mut update_schema = book_schema.clone();
    if let Some(properties) = update_schema["properties"].as_object_mut() {
        properties.remove(schema::ISBN);
    }
    if let Some(required) = update_schema["required"].as_array_mut() {
        required.retain(|name| name != schema::ISBN);
    }

    json!({
        "paths": {
            "": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response("All books", json!({
                            "type": "object",
                            "properties": {
                                "books": {
                                    "type": "array",
                                    "items": { "$ref": "#/components/schemas/Book" }
                                }
                            },
                            "required": ["books"]
                        })),
                        "500": error_response("Storage error")
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": request_body("Book"),
                    "responses": {
                        "201": book_envelope("Created book"),
                        "400": error_response("Invalid payload"),
                        "409": error_response("ISBN already exists")
                    }
                }
            },
            "/{isbn}": {
                "get": {
                    "summary": "Get a book by ISBN",
                    "tags": ["Books"],
                    "parameters": isbn_param.clone(),
                    "responses": {
                        "200": book_envelope("The book"),
                        "404": error_response("Book not found")
                    }
                },
                "put": {
                    "summary": "Replace every field of a book except its ISBN",
                    "tags": ["Books"],
                    "parameters": isbn_param.clone(),
                    "requestBody": request_body("BookUpdate"),
                    "responses": {
                        "200": book_envelope("Updated book"),
                        "400": error_response("Invalid payload"),
                        "404": error_response("Book not found")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": isbn_param,
                    "responses": {
                        "200": json_response("Deletion confirmation", json!({
                            "type": "object",
                            "properties": { "message": { "type": "string" } },
                            "required": ["message"]
                        })),
                        "404": error_response("Book not found")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": book_schema,
                "BookUpdate": update_schema,
                "BookEnvelope": {
                    "type": "object",
                    "properties": { "book": { "$ref": "#/components/schemas/Book" } },
                    "required": ["book"]
                }
            }
        }
    })
}

/// Create a new instance of the books module
pub fn create_module(repository: SharedRepository) -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(BooksModule::new(repository))
}
