use thiserror::Error;

/// 書籍ID - サーバー側で採番される整数ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(i64);

impl BookId {
    pub fn from_i64(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    /// パスパラメータなどの文字列からIDを読み取る
    ///
    /// 数値でない、または範囲外の文字列は `None`。
    /// そのようなIDの書籍は存在し得ないため、呼び出し側は「見つからない」として扱う。
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().map(Self)
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 出版年
///
/// 範囲チェックは `YearRange::check` で行う。
/// 永続化済みの値は設定変更後も読み出せるよう、ここでは検証しない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Year(i32);

impl Year {
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

/// 年の範囲エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YearRangeError {
    /// 下限が上限より大きい
    #[error("year range is inverted: min {min} > max {max}")]
    Inverted { min: i32, max: i32 },
}

/// 受け付ける出版年の範囲（両端を含む）
///
/// 不変条件：min <= max
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    min: i32,
    max: i32,
}

impl YearRange {
    pub const DEFAULT_MIN: i32 = 1000;
    pub const DEFAULT_MAX: i32 = 9999;

    pub fn new(min: i32, max: i32) -> Result<Self, YearRangeError> {
        if min > max {
            return Err(YearRangeError::Inverted { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= i64::from(self.min) && value <= i64::from(self.max)
    }

    /// 範囲内であれば `Year` を返す
    pub fn check(&self, value: i64) -> Option<Year> {
        if !self.contains(value) {
            return None;
        }
        i32::try_from(value).ok().map(Year::new)
    }
}

impl Default for YearRange {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// 貸出状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorrowStatus {
    /// 登録直後の状態
    Available,
    /// 返却済み
    GivenBack,
}

impl BorrowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BorrowStatus::Available => "available",
            BorrowStatus::GivenBack => "given_back",
        }
    }

    pub fn is_given_back(&self) -> bool {
        matches!(self, BorrowStatus::GivenBack)
    }
}

impl std::str::FromStr for BorrowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(BorrowStatus::Available),
            "given_back" => Ok(BorrowStatus::GivenBack),
            _ => Err(format!("Invalid borrow status: {}", s)),
        }
    }
}
