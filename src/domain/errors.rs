use thiserror::Error;

/// 項目ごとの違反理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationReason {
    /// 項目が送られていない
    Missing,
    /// 空文字列（前後の空白を除いて空の場合を含む）
    Empty,
    /// 文字列ではない
    NotAString,
    /// 文字数の上限を超えた
    TooLong,
    /// 整数ではない
    NotAnInteger,
    /// 受け付ける範囲外
    OutOfRange,
    /// 制御文字（NULなど）を含む
    InvalidCharacters,
}

impl ViolationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationReason::Missing => "missing",
            ViolationReason::Empty => "empty",
            ViolationReason::NotAString => "not_a_string",
            ViolationReason::TooLong => "too_long",
            ViolationReason::NotAnInteger => "not_an_integer",
            ViolationReason::OutOfRange => "out_of_range",
            ViolationReason::InvalidCharacters => "invalid_characters",
        }
    }
}

/// 1項目分の違反
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub reason: ViolationReason,
}

impl FieldViolation {
    pub fn new(field: &'static str, reason: ViolationReason) -> Self {
        Self { field, reason }
    }
}

/// 書籍入力のバリデーションエラー
///
/// 違反した項目をすべて保持する。項目ごとに最初の違反のみ。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("The given data was invalid")]
    InvalidFields(Vec<FieldViolation>),

    /// リクエストボディ自体を解釈できなかった
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

impl ValidationError {
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            ValidationError::InvalidFields(violations) => violations,
            ValidationError::MalformedBody(_) => &[],
        }
    }

    pub fn violates(&self, field: &str) -> bool {
        self.violations().iter().any(|v| v.field == field)
    }
}
