use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Book, BorrowStatus, FieldViolation};

/// 書籍一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    /// 貸出状態でフィルタリング（available, given_back）
    pub status: Option<String>,
}

/// 書籍レスポンス（GET /api/books, GET /api/books/:id, POST /api/books）
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year: i32,
    pub status: String,
    pub given_back_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.book_id.value(),
            title: book.title,
            author: book.author,
            genre: book.genre,
            year: book.year.value(),
            status: book.status.as_str().to_string(),
            given_back_at: book.given_back_at,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ErrorDetail>,
}

impl ErrorResponse {
    pub fn new(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error_type.into(),
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<ErrorDetail>) -> Self {
        self.details = details;
        self
    }
}

/// 項目ごとのバリデーションエラー
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub field: String,
    pub reason: String,
}

impl From<&FieldViolation> for ErrorDetail {
    fn from(violation: &FieldViolation) -> Self {
        Self {
            field: violation.field.to_string(),
            reason: violation.reason.as_str().to_string(),
        }
    }
}

/// ステータスクエリパラメータのパースとバリデーション
pub fn parse_status_filter(status: &str) -> Result<BorrowStatus, String> {
    status.parse::<BorrowStatus>()
}

// ============================================================================
// Plain-text messages
// ============================================================================

pub fn updated_message(id: impl std::fmt::Display) -> String {
    format!("Book with ID:{} successfully updated", id)
}

pub fn deleted_message(id: impl std::fmt::Display) -> String {
    format!("Book with ID:{} Successfully deleted", id)
}

pub fn given_back_message(id: impl std::fmt::Display) -> String {
    format!("Book with ID:{} has given back successfully", id)
}

pub fn no_such_book_message(id: impl std::fmt::Display) -> String {
    format!("ERROR: There is no Book with ID:{}", id)
}

pub fn no_book_to_give_back_message(id: impl std::fmt::Display) -> String {
    format!("There is no book with id {}", id)
}
