use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{
    BookId, BookInput, BorrowStatus, FieldViolation, ValidationError, ViolationReason, Year,
    YearRange,
};

/// 文字列項目の最大文字数（booksテーブルの列幅）
pub const MAX_TEXT_LENGTH: usize = 255;

pub const FIELD_TITLE: &str = "title";
pub const FIELD_AUTHOR: &str = "author";
pub const FIELD_GENRE: &str = "genre";
pub const FIELD_YEAR: &str = "year";

/// 検証済みの書籍情報
///
/// `validate_book_input` を通過した値のみが存在する。
/// 登録・更新はこの型を受け取るため、未検証の入力は永続化されない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetails {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub year: Year,
}

/// 採番前の書籍
///
/// IDは永続化層が割り当てる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub details: BookDetails,
    pub status: BorrowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book集約
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    // 識別子（作成後は不変）
    pub book_id: BookId,

    pub title: String,
    pub author: String,
    pub genre: String,
    pub year: Year,

    // 貸出状態
    pub status: BorrowStatus,
    pub given_back_at: Option<DateTime<Utc>>,

    // 監査情報
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// 採番済みIDと組み合わせて集約を構築する
    pub fn from_new(book_id: BookId, new_book: NewBook) -> Self {
        let NewBook {
            details,
            status,
            created_at,
            updated_at,
        } = new_book;

        Self {
            book_id,
            title: details.title,
            author: details.author,
            genre: details.genre,
            year: details.year,
            status,
            given_back_at: None,
            created_at,
            updated_at,
        }
    }

    pub fn details(&self) -> BookDetails {
        BookDetails {
            title: self.title.clone(),
            author: self.author.clone(),
            genre: self.genre.clone(),
            year: self.year,
        }
    }
}

/// 返却の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GiveBackOutcome {
    /// 今回の操作で返却済みになった
    Returned(Book),
    /// 既に返却済みだった（状態は変わらない）
    AlreadyGivenBack(Book),
}

impl GiveBackOutcome {
    pub fn into_book(self) -> Book {
        match self {
            GiveBackOutcome::Returned(book) | GiveBackOutcome::AlreadyGivenBack(book) => book,
        }
    }
}

// ============================================================================
// バリデーション
// ============================================================================

/// 純粋関数：書籍入力を検証する
///
/// ビジネスルール：
/// - title, author, genre は空でない文字列（前後の空白は除去して保存）
/// - 文字列は制御文字（NUL、改行など）を含まず、255文字以内
/// - year は整数で、`years` の範囲内
///
/// 登録・更新で共通。違反はすべて集めて返す。
pub fn validate_book_input(
    input: &BookInput,
    years: &YearRange,
) -> Result<BookDetails, ValidationError> {
    let mut violations = Vec::new();

    let title = text_field(input, FIELD_TITLE, &mut violations);
    let author = text_field(input, FIELD_AUTHOR, &mut violations);
    let genre = text_field(input, FIELD_GENRE, &mut violations);
    let year = year_field(input, years, &mut violations);

    match (title, author, genre, year) {
        (Some(title), Some(author), Some(genre), Some(year)) => Ok(BookDetails {
            title,
            author,
            genre,
            year,
        }),
        _ => Err(ValidationError::InvalidFields(violations)),
    }
}

fn text_field(
    input: &BookInput,
    field: &'static str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    let result = match input.get(field) {
        None | Some(Value::Null) => Err(ViolationReason::Missing),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Err(ViolationReason::Empty)
            } else if trimmed.chars().any(char::is_control) {
                Err(ViolationReason::InvalidCharacters)
            } else if trimmed.chars().count() > MAX_TEXT_LENGTH {
                Err(ViolationReason::TooLong)
            } else {
                Ok(trimmed.to_string())
            }
        }
        Some(_) => Err(ViolationReason::NotAString),
    };

    result
        .map_err(|reason| violations.push(FieldViolation::new(field, reason)))
        .ok()
}

fn year_field(
    input: &BookInput,
    years: &YearRange,
    violations: &mut Vec<FieldViolation>,
) -> Option<Year> {
    let result = match input.get(FIELD_YEAR) {
        None | Some(Value::Null) => Err(ViolationReason::Missing),
        Some(Value::String(s)) if s.trim().is_empty() => Err(ViolationReason::Empty),
        Some(value) => match integer_value(value) {
            None => Err(ViolationReason::NotAnInteger),
            Some(n) => years.check(n).ok_or(ViolationReason::OutOfRange),
        },
    };

    result
        .map_err(|reason| violations.push(FieldViolation::new(FIELD_YEAR, reason)))
        .ok()
}

/// JSON整数、または10進数字の文字列（フォーム送信）を整数として読む
fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => {
            let digits = s.trim();
            let unsigned = digits.strip_prefix(['-', '+']).unwrap_or(digits);
            if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse::<i64>().ok()
        }
        _ => None,
    }
}

// ============================================================================
// 状態遷移
// ============================================================================

/// 純粋関数：書籍を登録する
///
/// 登録直後の状態は Available。
pub fn register_book(details: BookDetails, registered_at: DateTime<Utc>) -> NewBook {
    NewBook {
        details,
        status: BorrowStatus::Available,
        created_at: registered_at,
        updated_at: registered_at,
    }
}

/// 純粋関数：書籍情報を更新する
///
/// IDと貸出状態は変わらない。
pub fn revise_book(book: Book, details: BookDetails, revised_at: DateTime<Utc>) -> Book {
    Book {
        title: details.title,
        author: details.author,
        genre: details.genre,
        year: details.year,
        updated_at: revised_at,
        ..book
    }
}

/// 純粋関数：書籍を返却済みにする
///
/// 一方向のフラグ。返却済みの書籍に対しては何も変えずに
/// `AlreadyGivenBack` を返す（最初の返却日時を保持）。
pub fn give_back(book: Book, given_back_at: DateTime<Utc>) -> GiveBackOutcome {
    if book.status.is_given_back() {
        return GiveBackOutcome::AlreadyGivenBack(book);
    }

    GiveBackOutcome::Returned(Book {
        status: BorrowStatus::GivenBack,
        given_back_at: Some(given_back_at),
        updated_at: given_back_at,
        ..book
    })
}
