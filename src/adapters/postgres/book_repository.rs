use crate::domain::{Book, BookId, BorrowStatus, NewBook, Year};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

/// PostgreSQLの行データをBookに変換する
///
/// statusは文字列からの変換でエラーハンドリングを行う。
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let status_str: &str = row.get("status");
    let status = BorrowStatus::from_str(status_str).map_err(|e| {
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            as Box<dyn std::error::Error + Send + Sync>
    })?;

    Ok(Book {
        book_id: BookId::from_i64(row.get("id")),
        title: row.get("title"),
        author: row.get("author"),
        genre: row.get("genre"),
        year: Year::new(row.get("year")),
        status,
        given_back_at: row.get("given_back_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// BookRepositoryのPostgreSQL実装
///
/// IDはBIGSERIALで採番される。
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// PostgreSQLコネクションプールから新しいBookRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn list(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT
                id,
                title,
                author,
                genre,
                year,
                status,
                given_back_at,
                created_at,
                updated_at
            FROM books
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_book).collect()
    }

    /// INSERT ... RETURNINGで採番済みの行をそのまま読み戻す
    async fn insert(&self, new_book: NewBook) -> Result<Book> {
        let row = sqlx::query(
            r#"
            INSERT INTO books (
                title,
                author,
                genre,
                year,
                status,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id,
                title,
                author,
                genre,
                year,
                status,
                given_back_at,
                created_at,
                updated_at
            "#,
        )
        .bind(&new_book.details.title)
        .bind(&new_book.details.author)
        .bind(&new_book.details.genre)
        .bind(new_book.details.year.value())
        .bind(new_book.status.as_str())
        .bind(new_book.created_at)
        .bind(new_book.updated_at)
        .fetch_one(&self.pool)
        .await?;

        map_row_to_book(&row)
    }

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT
                id,
                title,
                author,
                genre,
                year,
                status,
                given_back_at,
                created_at,
                updated_at
            FROM books
            WHERE id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    /// 集約の完全な状態で上書きする（部分更新は行わない）
    ///
    /// idとcreated_atは作成後に変わらないため更新対象外。
    async fn save(&self, book: &Book) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET
                title = $2,
                author = $3,
                genre = $4,
                year = $5,
                status = $6,
                given_back_at = $7,
                updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.genre)
        .bind(book.year.value())
        .bind(book.status.as_str())
        .bind(book.given_back_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, book_id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
