use chrono::{DateTime, Utc};

use super::BookId;

/// 未検証の書籍入力（項目名 → 値）
///
/// JSONでもフォームでも、リクエストボディはこの形に正規化される。
/// 型の検証は `book::validate_book_input` が行う。
pub type BookInput = serde_json::Map<String, serde_json::Value>;

/// コマンド：書籍を登録する
#[derive(Debug, Clone, PartialEq)]
pub struct CreateBook {
    pub input: BookInput,
    pub created_at: DateTime<Utc>,
}

/// コマンド：書籍を更新する
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateBook {
    pub book_id: BookId,
    pub input: BookInput,
    pub updated_at: DateTime<Utc>,
}

/// コマンド：書籍を削除する
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteBook {
    pub book_id: BookId,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GiveBackBook {
    pub book_id: BookId,
    pub given_back_at: DateTime<Utc>,
}
