//! セル値の正規化
//!
//! 表計算ソフトから読んだ生のセル値を整数・文字列に変換する。
//! 欠損値・前後の空白（全角スペース含む）・"nan" などの表記は
//! すべて既定値（0 / 空文字）に落とし、エラーにはしない。

use regex::Regex;

/// 生のセル値
#[derive(Debug, Clone, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    /// CSVのフィールドから生成（長さ0は Empty）
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(text.to_string())
        }
    }

    /// 空セル・欠損表記・空白のみか
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Float(f) => f.is_nan(),
            CellValue::Text(s) => is_na_text(trim_cell(s)),
            CellValue::Int(_) | CellValue::Bool(_) => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        CellValue::from_text(text)
    }
}

/// pandasが既定で欠損値として扱う表記
const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// 未記入を表すダッシュ
const PLACEHOLDERS: &[&str] = &["-", "－", "ー", "―", "‐"];

/// 前後の空白を除去（全角スペース U+3000 を含む）
pub fn trim_cell(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{3000}')
}

fn is_na_text(s: &str) -> bool {
    NA_VALUES.contains(&s)
}

/// 全角の数字・符号・小数点を半角に変換
pub fn fold_fullwidth_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
            '－' | '−' => '-',
            '＋' => '+',
            '．' => '.',
            _ => c,
        })
        .collect()
}

/// 数値テキストから整数を取り出す（"3", "3.0", "３" など）
///
/// 小数は float 経由で切り捨てる。数値でなければ None。
pub fn parse_int_text(text: &str) -> Option<i64> {
    lazy_static::lazy_static! {
        static ref NUMERIC_RE: Regex = Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap();
    }

    let folded = fold_fullwidth_digits(trim_cell(text));
    if let Ok(value) = folded.parse::<i64>() {
        return Some(value);
    }
    if !NUMERIC_RE.is_match(&folded) {
        return None;
    }
    folded.parse::<f64>().ok().and_then(float_to_int)
}

fn float_to_int(value: f64) -> Option<i64> {
    if value.is_finite() && value.abs() < i64::MAX as f64 {
        Some(value.trunc() as i64)
    } else {
        None
    }
}

/// セルを整数に正規化（空・欠損・非数値は 0）
pub fn normalize_int(cell: &CellValue) -> i64 {
    match cell {
        CellValue::Empty => 0,
        CellValue::Int(i) => *i,
        CellValue::Float(f) => float_to_int(*f).unwrap_or(0),
        CellValue::Bool(b) => i64::from(*b),
        CellValue::Text(s) => {
            let trimmed = trim_cell(s);
            if is_na_text(trimmed) {
                return 0;
            }
            parse_int_text(trimmed).unwrap_or(0)
        }
    }
}

/// セルを文字列に正規化（空・欠損は ""、それ以外は前後空白を除去）
pub fn normalize_string(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => String::new(),
        CellValue::Int(i) => i.to_string(),
        CellValue::Float(f) => {
            if !f.is_finite() {
                String::new()
            } else if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        CellValue::Bool(b) => b.to_string(),
        CellValue::Text(s) => {
            let trimmed = trim_cell(s);
            if is_na_text(trimmed) {
                String::new()
            } else {
                trimmed.to_string()
            }
        }
    }
}

/// 識別セルとして使えない値か（空・欠損・ダッシュ）
pub fn is_placeholder(cell: &CellValue) -> bool {
    if cell.is_blank() {
        return true;
    }
    let text = normalize_string(cell);
    text.is_empty() || PLACEHOLDERS.contains(&text.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_na_and_blank_map_to_defaults() {
        for raw in ["", " ", "\u{3000}", " \u{3000} ", "nan", "NaN", "None", "#N/A", " null "] {
            let cell = text(raw);
            assert_eq!(normalize_int(&cell), 0, "int: {:?}", raw);
            assert_eq!(normalize_string(&cell), "", "string: {:?}", raw);
        }
        assert_eq!(normalize_int(&CellValue::Empty), 0);
        assert_eq!(normalize_string(&CellValue::Float(f64::NAN)), "");
        assert_eq!(normalize_int(&CellValue::Float(f64::NAN)), 0);
    }

    #[test]
    fn test_normalize_int_float_text() {
        assert_eq!(normalize_int(&text("3.0")), 3);
        assert_eq!(normalize_int(&text("4.9")), 4);
        assert_eq!(normalize_int(&text(" 2 ")), 2);
        assert_eq!(normalize_int(&text("-1.5")), -1);
        assert_eq!(normalize_int(&CellValue::Float(5.0)), 5);
        assert_eq!(normalize_int(&CellValue::Int(7)), 7);
    }

    #[test]
    fn test_normalize_int_fullwidth() {
        assert_eq!(normalize_int(&text("３")), 3);
        assert_eq!(normalize_int(&text("\u{3000}１２\u{3000}")), 12);
        assert_eq!(normalize_int(&text("２．０")), 2);
    }

    #[test]
    fn test_normalize_int_garbage_is_zero() {
        assert_eq!(normalize_int(&text("abc")), 0);
        assert_eq!(normalize_int(&text("3年")), 0);
        assert_eq!(normalize_int(&text("inf")), 0);
        assert_eq!(normalize_int(&CellValue::Float(f64::INFINITY)), 0);
    }

    #[test]
    fn test_normalize_string_trims() {
        assert_eq!(normalize_string(&text("\u{3000}東京 ")), "東京");
        assert_eq!(normalize_string(&CellValue::Float(12.0)), "12");
        assert_eq!(normalize_string(&CellValue::Float(1.5)), "1.5");
        assert_eq!(normalize_string(&CellValue::Int(42)), "42");
    }

    #[test]
    fn test_is_placeholder() {
        assert!(is_placeholder(&text("-")));
        assert!(is_placeholder(&text(" － ")));
        assert!(is_placeholder(&text("   ")));
        assert!(is_placeholder(&CellValue::Empty));
        assert!(is_placeholder(&text("nan")));
        assert!(!is_placeholder(&text("1001")));
        assert!(!is_placeholder(&CellValue::Int(0)));
    }
}
