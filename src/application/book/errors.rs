use crate::domain::{BookId, ValidationError};
use thiserror::Error;

/// 書籍管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum BookApplicationError {
    /// 入力が検証ルールに違反している
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// 書籍が見つからない
    #[error("Book {0} not found")]
    BookNotFound(BookId),

    /// BookRepositoryのエラー
    #[error("Book repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, BookApplicationError>;
