use axum::body::Body;
use axum::http::{Request, StatusCode, header::CONTENT_TYPE};
use rusty_library_books::api::handlers::AppState;
use rusty_library_books::api::router::create_router;
use rusty_library_books::api::types::*;
use rusty_library_books::domain::{BookId, BorrowStatus};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

mod common;

// ============================================================================
// テスト用のヘルパー関数
// ============================================================================

/// インメモリリポジトリと実際のAPIルーターでアプリケーションを組み立てる
fn setup_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        service_deps: common::in_memory_deps(),
    });
    (create_router(state.clone()), state)
}

struct TestResponse {
    status: StatusCode,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl TestResponse {
    fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("response body is not UTF-8")
    }

    fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("response body is not the expected JSON")
    }
}

async fn send(app: &axum::Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    TestResponse {
        status,
        content_type,
        body,
    }
}

fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn form_request(method: &str, uri: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// 書籍を登録してレスポンスを返す（factory相当）
async fn create_book(app: &axum::Router, body: Value) -> BookResponse {
    let response = send(app, json_request("POST", "/api/books", &body)).await;
    assert_eq!(response.status, StatusCode::CREATED);
    response.json()
}

async fn create_numbered_book(app: &axum::Router, n: usize) -> BookResponse {
    create_book(
        app,
        json!({
            "title": format!("title {}", n),
            "author": format!("author {}", n),
            "genre": format!("genre {}", n),
            "year": 1990 + n as i64,
        }),
    )
    .await
}

// ============================================================================
// List
// ============================================================================

#[tokio::test]
async fn test_index_lists_all_books() {
    let (app, _) = setup_app();
    let mut created = Vec::new();
    for n in 0..10 {
        created.push(create_numbered_book(&app, n).await);
    }

    let response = send(&app, empty_request("GET", "/api/books")).await;
    assert_eq!(response.status, StatusCode::OK);

    let books: Vec<BookResponse> = response.json();
    assert_eq!(books.len(), created.len());
    for expected in &created {
        let found = books
            .iter()
            .find(|b| b.id == expected.id)
            .expect("created book missing from index");
        assert_eq!(found.title, expected.title);
        assert_eq!(found.author, expected.author);
        assert_eq!(found.genre, expected.genre);
        assert_eq!(found.year, expected.year);
    }
}

#[tokio::test]
async fn test_index_on_empty_store_returns_empty_array() {
    let (app, _) = setup_app();

    let response = send(&app, empty_request("GET", "/api/books")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json::<Value>(), json!([]));
}

#[tokio::test]
async fn test_index_filters_by_status() {
    let (app, _) = setup_app();
    let kept = create_numbered_book(&app, 1).await;
    let returned = create_numbered_book(&app, 2).await;
    send(
        &app,
        empty_request("GET", &format!("/api/books/{}/giveback", returned.id)),
    )
    .await;

    let response = send(&app, empty_request("GET", "/api/books?status=given_back")).await;
    let books: Vec<BookResponse> = response.json();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, returned.id);

    let response = send(&app, empty_request("GET", "/api/books?status=available")).await;
    let books: Vec<BookResponse> = response.json();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, kept.id);
}

#[tokio::test]
async fn test_index_rejects_unknown_status_filter() {
    let (app, _) = setup_app();

    let response = send(&app, empty_request("GET", "/api/books?status=lost")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = response.json();
    assert_eq!(error.error, "BAD_REQUEST");
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn test_store_creates_book() {
    let (app, state) = setup_app();

    let response = send(
        &app,
        json_request("POST", "/api/books", &common::valid_book_json()),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let book: BookResponse = response.json();
    assert_eq!(book.title, "testTitle");
    assert_eq!(book.author, "testAuthor");
    assert_eq!(book.genre, "testGenre");
    assert_eq!(book.year, 2016);
    assert_eq!(book.status, "available");
    assert!(book.given_back_at.is_none());

    // 保存先に返却されたIDの行が存在する
    let stored = state
        .service_deps
        .book_repository
        .get_by_id(BookId::from_i64(book.id))
        .await
        .unwrap()
        .expect("created book not persisted");
    assert_eq!(stored.title, "testTitle");
    assert_eq!(stored.status, BorrowStatus::Available);
}

#[tokio::test]
async fn test_store_accepts_form_body() {
    let (app, _) = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/books")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(
            "title=testTitle&author=testAuthor&genre=testGenre&year=2016",
        ))
        .unwrap();
    let response = send(&app, request).await;

    assert_eq!(response.status, StatusCode::CREATED);
    let book: BookResponse = response.json();
    assert_eq!(book.year, 2016);
    assert_eq!(book.genre, "testGenre");
}

#[tokio::test]
async fn test_store_with_bad_data_returns_422() {
    let (app, _) = setup_app();

    for payload in common::bad_book_payloads() {
        let response = send(&app, json_request("POST", "/api/books", &payload)).await;

        assert_eq!(
            response.status,
            StatusCode::UNPROCESSABLE_ENTITY,
            "payload: {}",
            payload
        );
        let error: ErrorResponse = response.json();
        assert_eq!(error.error, "VALIDATION_FAILED");
        assert_eq!(error.details.len(), 1, "payload: {}", payload);
    }

    // 不正なデータは1件も保存されない
    let response = send(&app, empty_request("GET", "/api/books")).await;
    assert_eq!(response.json::<Value>(), json!([]));
}

#[tokio::test]
async fn test_store_reports_offending_field() {
    let (app, _) = setup_app();
    let payload = json!({"title": "testTitle", "author": "testAuthor", "genre": 15, "year": 999});

    let response = send(&app, json_request("POST", "/api/books", &payload)).await;

    let error: ErrorResponse = response.json();
    assert_eq!(
        error.details,
        vec![
            ErrorDetail {
                field: "genre".to_string(),
                reason: "not_a_string".to_string(),
            },
            ErrorDetail {
                field: "year".to_string(),
                reason: "out_of_range".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_store_with_malformed_body_returns_422() {
    let (app, _) = setup_app();

    let request = Request::builder()
        .method("POST")
        .uri("/api/books")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let response = send(&app, json_request("POST", "/api/books", &json!([1, 2, 3]))).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_store_with_bad_form_data_returns_422() {
    let (app, _) = setup_app();

    for body in [
        "title=testTitle&author=testAuthor&genre=testGenre&year=",
        "title=testTitle&author=testAuthor&genre=testGenre&year=999",
        "title=&author=testAuthor&genre=testGenre&year=2016",
        "title=testTitle&author=testAuthor&year=2016",
    ] {
        let response = send(&app, form_request("POST", "/api/books", body)).await;

        assert_eq!(
            response.status,
            StatusCode::UNPROCESSABLE_ENTITY,
            "body: {}",
            body
        );
    }
}

#[tokio::test]
async fn test_store_with_control_character_returns_422() {
    let (app, _) = setup_app();
    let payload = json!({"title": "a\u{0}b", "author": "x", "genre": "y", "year": 2016});

    let response = send(&app, json_request("POST", "/api/books", &payload)).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: ErrorResponse = response.json();
    assert_eq!(
        error.details,
        vec![ErrorDetail {
            field: "title".to_string(),
            reason: "invalid_characters".to_string(),
        }]
    );
}

// ============================================================================
// Show
// ============================================================================

#[tokio::test]
async fn test_show_returns_book() {
    let (app, _) = setup_app();
    let created = create_book(&app, common::valid_book_json()).await;

    let response = send(
        &app,
        empty_request("GET", &format!("/api/books/{}", created.id)),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let book: BookResponse = response.json();
    assert_eq!(book.id, created.id);
    assert_eq!(book.title, "testTitle");
    assert_eq!(book.author, "testAuthor");
    assert_eq!(book.genre, "testGenre");
    assert_eq!(book.year, 2016);
}

#[tokio::test]
async fn test_show_with_bad_id_returns_404() {
    let (app, _) = setup_app();

    let response = send(&app, empty_request("GET", "/api/books/9999999999999999")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    let error: ErrorResponse = response.json();
    assert_eq!(error.error, "BOOK_NOT_FOUND");

    let response = send(&app, empty_request("GET", "/api/books/not-a-number")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_changes_book() {
    let (app, state) = setup_app();
    let created = create_numbered_book(&app, 1).await;

    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/books/{}", created.id),
            &json!({
                "title": "updatedTitle",
                "author": "updatedAuthor",
                "genre": "updatedGenre",
                "year": 2016,
            }),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .text()
            .contains(&format!("Book with ID:{} successfully updated", created.id))
    );
    assert!(response.content_type.unwrap().starts_with("text/plain"));

    let stored = state
        .service_deps
        .book_repository
        .get_by_id(BookId::from_i64(created.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "updatedTitle");
    assert_eq!(stored.author, "updatedAuthor");
    assert_eq!(stored.genre, "updatedGenre");
    assert_eq!(stored.year.value(), 2016);
}

#[tokio::test]
async fn test_update_with_bad_data_returns_406() {
    let (app, state) = setup_app();
    let created = create_numbered_book(&app, 1).await;

    for payload in common::bad_book_payloads() {
        let response = send(
            &app,
            json_request("PUT", &format!("/api/books/{}", created.id), &payload),
        )
        .await;

        assert_eq!(
            response.status,
            StatusCode::NOT_ACCEPTABLE,
            "payload: {}",
            payload
        );
    }

    // 元のデータは変わらない
    let stored = state
        .service_deps
        .book_repository
        .get_by_id(BookId::from_i64(created.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, created.title);
    assert_eq!(stored.year.value(), created.year);
}

#[tokio::test]
async fn test_update_missing_book_returns_406() {
    let (app, _) = setup_app();

    let response = send(
        &app,
        json_request("PUT", "/api/books/12345", &common::valid_book_json()),
    )
    .await;

    assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(response.text(), no_such_book_message(12345));
}

#[tokio::test]
async fn test_update_accepts_form_body() {
    let (app, state) = setup_app();
    let created = create_numbered_book(&app, 1).await;

    let response = send(
        &app,
        form_request(
            "PUT",
            &format!("/api/books/{}", created.id),
            "title=updatedTitle&author=updatedAuthor&genre=updatedGenre&year=2016",
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), updated_message(created.id));

    let stored = state
        .service_deps
        .book_repository
        .get_by_id(BookId::from_i64(created.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.title, "updatedTitle");
    assert_eq!(stored.year.value(), 2016);
}

#[tokio::test]
async fn test_update_with_bad_form_data_returns_406() {
    let (app, _) = setup_app();
    let created = create_numbered_book(&app, 1).await;
    let uri = format!("/api/books/{}", created.id);

    for body in [
        "title=testTitle&author=testAuthor&genre=testGenre&year=",
        "title=testTitle&author=testAuthor&genre=testGenre&year=55555",
        "title=testTitle&author=&genre=testGenre&year=2016",
    ] {
        let response = send(&app, form_request("PUT", &uri, body)).await;

        assert_eq!(
            response.status,
            StatusCode::NOT_ACCEPTABLE,
            "body: {}",
            body
        );
    }
}

#[tokio::test]
async fn test_update_with_malformed_body_returns_406() {
    let (app, _) = setup_app();
    let created = create_numbered_book(&app, 1).await;
    let uri = format!("/api/books/{}", created.id);

    let request = Request::builder()
        .method("PUT")
        .uri(&uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);

    let response = send(&app, json_request("PUT", &uri, &json!("just a string"))).await;
    assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn test_update_with_control_character_returns_406() {
    let (app, _) = setup_app();
    let created = create_numbered_book(&app, 1).await;

    let response = send(
        &app,
        json_request(
            "PUT",
            &format!("/api/books/{}", created.id),
            &json!({"title": "t", "author": "a", "genre": "g\u{0}", "year": 2016}),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn test_destroy_removes_book() {
    let (app, state) = setup_app();
    let created = create_numbered_book(&app, 1).await;

    let response = send(
        &app,
        empty_request("DELETE", &format!("/api/books/{}", created.id)),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .text()
            .contains(&format!("Book with ID:{} Successfully deleted", created.id))
    );

    let stored = state
        .service_deps
        .book_repository
        .get_by_id(BookId::from_i64(created.id))
        .await
        .unwrap();
    assert!(stored.is_none());

    // 削除後は取得も再削除もできない
    let response = send(
        &app,
        empty_request("GET", &format!("/api/books/{}", created.id)),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = send(
        &app,
        empty_request("DELETE", &format!("/api/books/{}", created.id)),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);
}

#[tokio::test]
async fn test_destroy_with_bad_id_returns_406() {
    let (app, _) = setup_app();
    let created = create_numbered_book(&app, 1).await;
    let missing = created.id + 1;

    let response = send(
        &app,
        empty_request("DELETE", &format!("/api/books/{}", missing)),
    )
    .await;

    assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);
    assert!(
        response
            .text()
            .contains(&format!("ERROR: There is no Book with ID:{}", missing))
    );
}

// ============================================================================
// GiveBack
// ============================================================================

#[tokio::test]
async fn test_give_back_marks_book_returned() {
    let (app, state) = setup_app();
    let created = create_numbered_book(&app, 1).await;

    let response = send(
        &app,
        empty_request("GET", &format!("/api/books/{}/giveback", created.id)),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .text()
            .contains(&format!("Book with ID:{} has given back successfully", created.id))
    );

    let stored = state
        .service_deps
        .book_repository
        .get_by_id(BookId::from_i64(created.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, BorrowStatus::GivenBack);
    assert!(stored.given_back_at.is_some());
}

#[tokio::test]
async fn test_give_back_twice_succeeds() {
    let (app, _) = setup_app();
    let created = create_numbered_book(&app, 1).await;
    let uri = format!("/api/books/{}/giveback", created.id);

    let first = send(&app, empty_request("GET", &uri)).await;
    let second = send(&app, empty_request("GET", &uri)).await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(first.text(), second.text());
}

#[tokio::test]
async fn test_give_back_with_bad_id_returns_406() {
    let (app, _) = setup_app();
    let created = create_numbered_book(&app, 1).await;

    let response = send(
        &app,
        empty_request(
            "GET",
            &format!("/api/books/{}/giveback", created.id + 99_999_999),
        ),
    )
    .await;

    assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);
    assert!(response.text().contains("There is no book with id"));
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup_app();

    let response = send(&app, empty_request("GET", "/health")).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "OK");
}
