use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookstore_app::{
    app,
    books::repository::{BookRepository, InMemoryBookRepository},
};
use bookstore_kernel::settings::Settings;
use serde_json::{json, Value};
use tower::ServiceExt;

const ISBN: &str = "123456789";

struct TestApp {
    router: Router,
    repository: Arc<InMemoryBookRepository>,
}

impl TestApp {
    async fn seeded() -> Self {
        let repository = Arc::new(InMemoryBookRepository::new());
        let book = serde_json::from_value(shawshank()).unwrap();
        repository.create(book).await.unwrap();

        let registry = app::registry(repository.clone());
        let router = bookstore_http::build_router(&registry, &Settings::default());
        Self { router, repository }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    async fn stored(&self) -> usize {
        self.repository.list().await.unwrap().len()
    }
}

fn shawshank() -> Value {
    json!({
        "isbn": ISBN,
        "amazon_url": "https://amazon.com/its_fun_to_put_random_things_in_my_code",
        "author": "EasterEgg",
        "language": "English",
        "pages": 99999,
        "publisher": "Truth Publishing",
        "title": "Why Shawshank Redemption is the best movie of all time",
        "year": 2024
    })
}

fn revision() -> Value {
    json!({
        "amazon_url": "https://amazon.com/test_1_2_test_1_2_is_this_thing_on",
        "author": "Gho Catchit",
        "language": "english",
        "pages": 420,
        "publisher": "This is a Test Publishing",
        "title": "Is your refrigerator running",
        "year": 1999
    })
}

fn violated_fields(body: &Value) -> Vec<&str> {
    body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["field"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn lists_the_seeded_book() {
    let app = TestApp::seeded().await;

    let (status, body) = app.send(Method::GET, "/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "books": [shawshank()] }));
}

#[tokio::test]
async fn gets_book_by_isbn() {
    let app = TestApp::seeded().await;

    let (status, body) = app.send(Method::GET, "/books/123456789", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "book": shawshank() }));
}

#[tokio::test]
async fn unknown_isbn_is_not_found() {
    let app = TestApp::seeded().await;

    let (status, body) = app.send(Method::GET, "/books/893102347", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn creates_a_book() {
    let app = TestApp::seeded().await;
    let payload = json!({
        "isbn": "23466233",
        "amazon_url": "https://amazon.com/testing_express",
        "author": "Test Ticuluar",
        "language": "english",
        "pages": 731,
        "publisher": "Dingleberry Publishing",
        "title": "testing_express",
        "year": 2026
    });

    let (status, body) = app.send(Method::POST, "/books", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "book": payload.clone() }));

    let (_, fetched) = app.send(Method::GET, "/books/23466233", None).await;
    assert_eq!(fetched["book"], payload);
    assert_eq!(app.stored().await, 2);
}

#[tokio::test]
async fn create_without_required_fields_is_rejected() {
    let app = TestApp::seeded().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/books",
            Some(json!({ "isbn": "32794782", "title": "This shouldnt work" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(
        violated_fields(&body),
        vec!["amazon_url", "author", "language", "pages", "publisher", "year"]
    );

    let (status, _) = app.send(Method::GET, "/books/32794782", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.stored().await, 1);
}

#[tokio::test]
async fn create_without_isbn_is_rejected() {
    let app = TestApp::seeded().await;
    let mut payload = shawshank();
    payload.as_object_mut().unwrap().remove("isbn");

    let (status, body) = app.send(Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(violated_fields(&body), vec!["isbn"]);
    assert_eq!(app.stored().await, 1);
}

#[tokio::test]
async fn integral_floats_are_stored_as_integers() {
    let app = TestApp::seeded().await;
    let mut payload = shawshank();
    payload["isbn"] = json!("55512345");
    payload["year"] = json!(1999.0);

    let (status, body) = app.send(Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["book"]["year"], 1999);
    assert!(body["book"]["year"].is_i64());
}

#[tokio::test]
async fn duplicate_isbn_conflicts() {
    let app = TestApp::seeded().await;
    let mut payload = shawshank();
    payload["title"] = json!("A different book");

    let (status, body) = app.send(Method::POST, "/books", Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");

    let (_, fetched) = app.send(Method::GET, "/books/123456789", None).await;
    assert_eq!(fetched["book"], shawshank());
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = TestApp::seeded().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"isbn\": "))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.stored().await, 1);
}

#[tokio::test]
async fn updates_every_field_but_the_isbn() {
    let app = TestApp::seeded().await;

    let (status, body) = app
        .send(Method::PUT, "/books/123456789", Some(revision()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let mut expected = revision();
    expected["isbn"] = json!(ISBN);
    assert_eq!(body, json!({ "book": expected.clone() }));

    let (_, fetched) = app.send(Method::GET, "/books/123456789", None).await;
    assert_eq!(fetched["book"]["pages"], 420);
    assert_eq!(fetched["book"]["year"], 1999);
    assert_eq!(fetched["book"], expected);
}

#[tokio::test]
async fn partial_update_is_rejected() {
    let app = TestApp::seeded().await;

    let (status, body) = app
        .send(
            Method::PUT,
            "/books/123456789",
            Some(json!({
                "amazon_url": "https://amazon.com/testing_express",
                "author": "Test Ticuluar"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        violated_fields(&body),
        vec!["language", "pages", "publisher", "title", "year"]
    );

    let (_, fetched) = app.send(Method::GET, "/books/123456789", None).await;
    assert_eq!(fetched["book"], shawshank());
}

#[tokio::test]
async fn update_cannot_change_the_isbn() {
    let app = TestApp::seeded().await;
    let mut payload = revision();
    payload["isbn"] = json!("987654321");

    let (status, body) = app
        .send(Method::PUT, "/books/123456789", Some(payload))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(violated_fields(&body), vec!["isbn"]);
}

#[tokio::test]
async fn updating_unknown_isbn_is_not_found() {
    let app = TestApp::seeded().await;

    let (status, _) = app
        .send(Method::PUT, "/books/93452722", Some(revision()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deletes_a_book() {
    let app = TestApp::seeded().await;

    let (status, body) = app.send(Method::DELETE, "/books/123456789", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Book deleted" }));

    let (status, _) = app.send(Method::GET, "/books/123456789", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.send(Method::DELETE, "/books/123456789", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_and_docs_are_served() {
    let app = TestApp::seeded().await;

    let (status, body) = app.send(Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("ok"));

    let (status, _) = app.send(Method::GET, "/books/health", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, spec) = app.send(Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"]["/books"]["post"].is_object());
    assert!(spec["paths"]["/books/{isbn}"]["delete"].is_object());
    assert!(spec["paths"]["/books/health"].is_null());
}

#[tokio::test]
async fn every_isbn_is_addressable() {
    let app = TestApp::seeded().await;
    let mut payload = shawshank();
    payload["isbn"] = json!("health");

    let (status, _) = app.send(Method::POST, "/books", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.send(Method::GET, "/books/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "book": payload }));

    let (status, body) = app
        .send(Method::PUT, "/books/health", Some(revision()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["isbn"], "health");
    assert_eq!(body["book"]["title"], "Is your refrigerator running");

    let (status, _) = app.send(Method::DELETE, "/books/health", None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.send(Method::DELETE, "/books/health", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.stored().await, 1);
}
