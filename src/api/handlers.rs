use crate::application::book::{
    ServiceDependencies, create_book as execute_create_book, delete_book as execute_delete_book,
    give_back_book as execute_give_back_book, list_books as execute_list_books,
    show_book as execute_show_book, update_book as execute_update_book,
};
use crate::domain::{
    BookId, ValidationError,
    commands::{CreateBook, DeleteBook, GiveBackBook, UpdateBook},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::{
    error::{ApiError, Operation},
    extract::{BookPayload, PayloadRejection},
    types::{
        BookResponse, ListBooksQuery, deleted_message, given_back_message, parse_status_filter,
        updated_message,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

/// パスのIDを読み取る。数値として読めないIDは存在しない書籍として扱う
fn parse_book_id(operation: Operation, raw_id: &str) -> Result<BookId, ApiError> {
    BookId::parse(raw_id).ok_or_else(|| ApiError::unknown_book(operation, raw_id))
}

fn payload_input(
    operation: Operation,
    payload: Result<BookPayload, PayloadRejection>,
) -> Result<crate::domain::BookInput, ApiError> {
    payload
        .map(|BookPayload(input)| input)
        .map_err(|rejection| ApiError::Validation {
            operation,
            error: ValidationError::from(rejection),
        })
}

// ============================================================================
// Command handlers
// ============================================================================

/// POST /api/books - 書籍を登録
///
/// 成功時は201と登録された書籍、検証エラーは422。
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    payload: Result<BookPayload, PayloadRejection>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let cmd = CreateBook {
        input: payload_input(Operation::Create, payload)?,
        created_at: chrono::Utc::now(),
    };

    let book = execute_create_book(&state.service_deps, cmd)
        .await
        .map_err(|e| ApiError::from_application(Operation::Create, e))?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// PUT /api/books/:id - 書籍を更新
///
/// 検証エラー・存在しない書籍はともに406（登録の422とは異なる）。
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    payload: Result<BookPayload, PayloadRejection>,
) -> Result<String, ApiError> {
    let input = payload_input(Operation::Update, payload)?;
    let book_id = parse_book_id(Operation::Update, &raw_id)?;

    let cmd = UpdateBook {
        book_id,
        input,
        updated_at: chrono::Utc::now(),
    };

    execute_update_book(&state.service_deps, cmd)
        .await
        .map_err(|e| ApiError::from_application(Operation::Update, e))?;

    Ok(updated_message(book_id))
}

/// DELETE /api/books/:id - 書籍を削除
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<String, ApiError> {
    let book_id = parse_book_id(Operation::Delete, &raw_id)?;

    execute_delete_book(&state.service_deps, DeleteBook { book_id })
        .await
        .map_err(|e| ApiError::from_application(Operation::Delete, e))?;

    Ok(deleted_message(book_id))
}

/// GET /api/books/:id/giveback - 書籍を返却
///
/// 返却済みの書籍に対しても成功を返す。
pub async fn give_back_book(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<String, ApiError> {
    let book_id = parse_book_id(Operation::GiveBack, &raw_id)?;

    let cmd = GiveBackBook {
        book_id,
        given_back_at: chrono::Utc::now(),
    };

    execute_give_back_book(&state.service_deps, cmd)
        .await
        .map_err(|e| ApiError::from_application(Operation::GiveBack, e))?;

    Ok(given_back_message(book_id))
}

// ============================================================================
// Query handlers
// ============================================================================

/// GET /api/books/:id - 書籍詳細をIDで取得
///
/// 見つかった場合は書籍情報を返し、見つからない場合は404を返す。
pub async fn show_book(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let book_id = parse_book_id(Operation::Show, &raw_id)?;

    let book = execute_show_book(&state.service_deps, book_id)
        .await
        .map_err(|e| ApiError::from_application(Operation::Show, e))?;

    Ok(Json(BookResponse::from(book)))
}

/// GET /api/books - 書籍一覧取得
///
/// クエリパラメータ:
/// - status: 貸出状態でフィルタリング（available, given_back）（オプション）
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBooksQuery>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(parse_status_filter)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let books = execute_list_books(&state.service_deps)
        .await
        .map_err(|e| ApiError::from_application(Operation::List, e))?;

    let books = books
        .into_iter()
        .filter(|book| status.is_none_or(|s| book.status == s))
        .map(BookResponse::from)
        .collect();

    Ok(Json(books))
}
