use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_book, delete_book, give_back_book, list_books, show_book, update_book,
};

/// Creates the API router with all book endpoints
///
/// - GET    /api/books              - List books (optional `status` filter)
/// - POST   /api/books              - Create a book
/// - GET    /api/books/:id          - Show a book
/// - PUT    /api/books/:id          - Update a book
/// - DELETE /api/books/:id          - Delete a book
/// - GET    /api/books/:id/giveback - Give a borrowed book back
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        .route("/api/books", get(list_books).post(create_book))
        .route(
            "/api/books/:id",
            get(show_book).put(update_book).delete(delete_book),
        )
        .route("/api/books/:id/giveback", get(give_back_book))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
