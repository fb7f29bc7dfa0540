use crate::domain::{self, Book, BookId, GiveBackOutcome, YearRange, commands::*};
use crate::ports::BookRepository;
use std::sync::Arc;

use super::errors::{BookApplicationError, Result};

/// サービスの依存関係
///
/// 起動時に一度だけ構築され、各操作に明示的に渡される。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
    /// 受け付ける出版年の範囲（設定値）
    pub year_range: YearRange,
}

/// リポジトリから書籍を取得し、存在しなければ BookNotFound とするヘルパー関数
///
/// show_book, update_book, give_back_book で共通利用される。
async fn load_book(repository: &Arc<dyn BookRepository>, book_id: BookId) -> Result<Book> {
    repository
        .get_by_id(book_id)
        .await
        .map_err(BookApplicationError::RepositoryError)?
        .ok_or(BookApplicationError::BookNotFound(book_id))
}

/// 全書籍を取得する
pub async fn list_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.book_repository
        .list()
        .await
        .map_err(BookApplicationError::RepositoryError)
}

/// 書籍を登録する
///
/// ビジネスルール：
/// - 入力が検証ルールを満たすこと（永続化の前に検証する）
/// - 登録直後の貸出状態は Available
///
/// # 戻り値
/// 採番されたIDを含む書籍
pub async fn create_book(deps: &ServiceDependencies, cmd: CreateBook) -> Result<Book> {
    // 1. 入力の検証
    let details = domain::validate_book_input(&cmd.input, &deps.year_range)?;

    // 2. ドメイン層の純粋関数を呼び出し
    let new_book = domain::register_book(details, cmd.created_at);

    // 3. 保存（IDはリポジトリが採番）
    let book = deps
        .book_repository
        .insert(new_book)
        .await
        .map_err(BookApplicationError::RepositoryError)?;

    tracing::info!(book_id = %book.book_id, title = %book.title, "Book created");

    Ok(book)
}

/// IDで書籍を取得する
pub async fn show_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    let book = load_book(&deps.book_repository, book_id).await?;
    tracing::debug!(book_id = %book_id, "Book loaded");
    Ok(book)
}

/// 書籍情報を更新する
///
/// ビジネスルール：
/// - 入力の検証が先（存在しないIDに不正な入力を送った場合も検証エラー）
/// - 書籍が存在すること
/// - IDと貸出状態は変わらない
pub async fn update_book(deps: &ServiceDependencies, cmd: UpdateBook) -> Result<Book> {
    // 1. 入力の検証
    let details = domain::validate_book_input(&cmd.input, &deps.year_range)?;

    // 2. 現在の状態を取得
    let book = load_book(&deps.book_repository, cmd.book_id).await?;

    // 3. ドメイン層の純粋関数を呼び出し
    let revised = domain::revise_book(book, details, cmd.updated_at);

    // 4. 保存（取得後に削除されていた場合は見つからない扱い）
    let saved = deps
        .book_repository
        .save(&revised)
        .await
        .map_err(BookApplicationError::RepositoryError)?;

    if !saved {
        return Err(BookApplicationError::BookNotFound(cmd.book_id));
    }

    tracing::info!(book_id = %cmd.book_id, "Book updated");

    Ok(revised)
}

/// 書籍を削除する
///
/// 削除後は取得・再削除ともに BookNotFound となる。
pub async fn delete_book(deps: &ServiceDependencies, cmd: DeleteBook) -> Result<()> {
    let deleted = deps
        .book_repository
        .delete(cmd.book_id)
        .await
        .map_err(BookApplicationError::RepositoryError)?;

    if !deleted {
        return Err(BookApplicationError::BookNotFound(cmd.book_id));
    }

    tracing::info!(book_id = %cmd.book_id, "Book deleted");

    Ok(())
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 書籍が存在すること
/// - 返却は一方向のフラグ。返却済みの書籍への再実行は成功扱いで、状態は変えない
pub async fn give_back_book(deps: &ServiceDependencies, cmd: GiveBackBook) -> Result<Book> {
    // 1. 現在の状態を取得
    let book = load_book(&deps.book_repository, cmd.book_id).await?;

    // 2. ドメイン層の純粋関数を呼び出し
    let returned = match domain::give_back(book, cmd.given_back_at) {
        GiveBackOutcome::Returned(returned) => returned,
        GiveBackOutcome::AlreadyGivenBack(book) => {
            tracing::debug!(book_id = %cmd.book_id, "Book was already given back");
            return Ok(book);
        }
    };

    // 3. 保存
    let saved = deps
        .book_repository
        .save(&returned)
        .await
        .map_err(BookApplicationError::RepositoryError)?;

    if !saved {
        return Err(BookApplicationError::BookNotFound(cmd.book_id));
    }

    tracing::info!(book_id = %cmd.book_id, "Book given back");

    Ok(returned)
}
