use crate::domain::{Book, BookId, NewBook};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍リポジトリポート
///
/// booksテーブル（またはそれに相当する保存先）への永続化を抽象化する。
/// 各メソッドは保存先に対して1回の操作として原子的に実行される。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 全書籍をID順に取得する
    async fn list(&self) -> Result<Vec<Book>>;

    /// 新しい書籍を保存し、採番されたIDを含む集約を返す
    async fn insert(&self, new_book: NewBook) -> Result<Book>;

    /// IDで書籍を取得する
    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>>;

    /// 書籍の現在状態で上書き保存する
    ///
    /// 対象の行が存在しなかった場合は `false` を返す。
    async fn save(&self, book: &Book) -> Result<bool>;

    /// 書籍を削除する
    ///
    /// 対象の行が存在しなかった場合は `false` を返す。
    async fn delete(&self, book_id: BookId) -> Result<bool>;
}
