use crate::application::book::BookApplicationError;
use crate::domain::ValidationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::{ErrorDetail, ErrorResponse, no_book_to_give_back_message, no_such_book_message};

/// エラーが発生した操作
///
/// 同じエラーでも操作によってステータスコードと本文が異なるため、
/// レスポンスへの変換時に参照する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Show,
    Update,
    Delete,
    GiveBack,
}

/// API層のエラー型
///
/// アプリケーション層のエラーを操作と組にして、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub enum ApiError {
    /// 入力の検証に失敗
    Validation {
        operation: Operation,
        error: ValidationError,
    },
    /// 書籍が存在しない（パスに書かれたIDをそのまま保持する）
    NotFound { operation: Operation, id: String },
    /// クエリパラメータが不正
    BadRequest(String),
    /// システム障害
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
    pub fn from_application(operation: Operation, err: BookApplicationError) -> Self {
        match err {
            BookApplicationError::Validation(error) => ApiError::Validation { operation, error },
            BookApplicationError::BookNotFound(book_id) => ApiError::NotFound {
                operation,
                id: book_id.to_string(),
            },
            BookApplicationError::RepositoryError(e) => ApiError::Internal(e),
        }
    }

    /// 数値として読めないIDなど、存在し得ない書籍を指すリクエスト
    pub fn unknown_book(operation: Operation, raw_id: &str) -> Self {
        ApiError::NotFound {
            operation,
            id: raw_id.to_string(),
        }
    }

    /// ステータスコードの対応表
    ///
    /// - 検証エラー: 登録は422、更新は406
    /// - 存在しない書籍: 取得は404、更新・削除・返却は406
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation { operation, .. } => match operation {
                Operation::Update => StatusCode::NOT_ACCEPTABLE,
                _ => StatusCode::UNPROCESSABLE_ENTITY,
            },
            ApiError::NotFound { operation, .. } => match operation {
                Operation::Update | Operation::Delete | Operation::GiveBack => {
                    StatusCode::NOT_ACCEPTABLE
                }
                _ => StatusCode::NOT_FOUND,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            ApiError::Validation { operation, error } => {
                tracing::warn!(?operation, %error, "Book input rejected");
                let details = error.violations().iter().map(ErrorDetail::from).collect();
                let body = ErrorResponse::new("VALIDATION_FAILED", error.to_string())
                    .with_details(details);
                (status, Json(body)).into_response()
            }

            // 更新・削除・返却はプレーンテキストでIDを含むメッセージを返す
            ApiError::NotFound { operation, id } => match operation {
                Operation::Update | Operation::Delete => {
                    (status, no_such_book_message(&id)).into_response()
                }
                Operation::GiveBack => (status, no_book_to_give_back_message(&id)).into_response(),
                _ => {
                    let body =
                        ErrorResponse::new("BOOK_NOT_FOUND", format!("Book {} not found", id));
                    (status, Json(body)).into_response()
                }
            },

            ApiError::BadRequest(msg) => {
                (status, Json(ErrorResponse::new("BAD_REQUEST", msg))).into_response()
            }

            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApiError::Internal(e) => {
                tracing::error!("Book repository error: {}", e);
                let body = ErrorResponse::new("INTERNAL_ERROR", "An unexpected error occurred");
                (status, Json(body)).into_response()
            }
        }
    }
}
