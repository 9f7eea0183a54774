//! 自己紹介マトリクス（行=項目、列=社員）と転置ビュー
//!
//! 列0はラベル、列1は補足、列2以降が社員1人ずつ。
//! 転置後の i 番目の社員は元の列 `2 + i` に必ず対応する。

use crate::cell::{is_placeholder, normalize_string, CellValue};
use crate::error::{Error, Result};

/// 社員データが始まる列
pub const FIRST_PERSON_COLUMN: usize = 2;

/// マトリクスの1行
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow {
    /// 列0の文字列（正規化済み）
    pub label: String,
    pub cells: Vec<CellValue>,
}

/// 読み込んだままのマトリクス
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMatrix {
    header: Vec<CellValue>,
    rows: Vec<MatrixRow>,
}

impl RawMatrix {
    /// 先頭行をヘッダーとして構築する
    ///
    /// 各行はヘッダーと同じ列数に揃える（不足は空セルで補い、超過は切り捨て）。
    pub fn from_rows(mut grid: Vec<Vec<CellValue>>) -> Result<Self> {
        if grid.is_empty() {
            return Err(Error::Parse("シートが空です".into()));
        }
        let header = grid.remove(0);
        let width = header.len();
        if width == 0 {
            return Err(Error::Parse("ヘッダー行が空です".into()));
        }

        let rows = grid
            .into_iter()
            .enumerate()
            .map(|(i, mut cells)| {
                if cells.len() != width {
                    tracing::debug!(row = i + 1, cells = cells.len(), width, "列数をヘッダーに揃えます");
                    cells.resize(width, CellValue::Empty);
                }
                let label = cells.first().map(normalize_string).unwrap_or_default();
                MatrixRow { label, cells }
            })
            .collect();

        Ok(Self { header, rows })
    }

    /// 文字列グリッドから構築（テスト・CSV用）
    pub fn from_text_rows<S: AsRef<str>>(grid: &[Vec<S>]) -> Result<Self> {
        let cells = grid
            .iter()
            .map(|row| row.iter().map(|s| CellValue::from_text(s.as_ref())).collect())
            .collect();
        Self::from_rows(cells)
    }

    pub fn header(&self) -> &[CellValue] {
        &self.header
    }

    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    /// 行ラベルを上から順に返す
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.label.as_str())
    }

    /// 列数（ヘッダー基準）
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// 社員列の数
    pub fn person_count(&self) -> usize {
        self.width().saturating_sub(FIRST_PERSON_COLUMN)
    }

    /// ラベル完全一致で最初の行番号を探す
    pub fn find_row(&self, label: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.label == label)
    }

    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.cells.get(column))
            .unwrap_or(&EMPTY)
    }
}

/// 転置後の社員1人分のビュー
#[derive(Debug, Clone, Copy)]
pub struct PersonColumn<'a> {
    matrix: &'a RawMatrix,
    /// 社員の通し番号（スキップ前）
    pub index: usize,
    /// 元マトリクスの列番号（= 2 + index）
    pub column: usize,
}

impl<'a> PersonColumn<'a> {
    /// 行番号でセルを取得
    pub fn cell(&self, row: usize) -> &'a CellValue {
        self.matrix.cell(row, self.column)
    }

    /// 行ラベルでセルを取得
    pub fn by_label(&self, label: &str) -> Option<&'a CellValue> {
        self.matrix.find_row(label).map(|row| self.cell(row))
    }
}

/// 社員ごとのビューに転置する
///
/// `identity_row` のセルが空・ダッシュの列は丸ごと除外する。
/// 識別行がない場合は誰も識別できないため空を返す。
pub fn transpose(matrix: &RawMatrix, identity_row: Option<usize>) -> Vec<PersonColumn<'_>> {
    let Some(identity_row) = identity_row else {
        tracing::warn!("識別行（社員番号・氏名）が見つかりません");
        return Vec::new();
    };

    (0..matrix.person_count())
        .map(|index| PersonColumn {
            matrix,
            index,
            column: FIRST_PERSON_COLUMN + index,
        })
        .filter(|person| {
            let keep = !is_placeholder(person.cell(identity_row));
            if !keep {
                tracing::debug!(column = person.column, "識別セルが空のため列をスキップ");
            }
            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawMatrix {
        RawMatrix::from_text_rows(&[
            vec!["項目", "備考", "A", "B", "C"],
            vec!["社員番号", "", "101", "-", "103"],
            vec!["氏名", "", "山田", "鈴木", "佐藤"],
            vec!["所属営業所", "", "東京", "大阪"],
        ])
        .unwrap()
    }

    #[test]
    fn test_rows_padded_to_header_width() {
        let matrix = sample();
        assert_eq!(matrix.width(), 5);
        assert_eq!(matrix.rows()[2].cells.len(), 5);
        assert_eq!(matrix.cell(2, 4), &CellValue::Empty);
    }

    #[test]
    fn test_transpose_skips_placeholder_and_keeps_alignment() {
        let matrix = sample();
        let people = transpose(&matrix, matrix.find_row("社員番号"));
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].index, 0);
        assert_eq!(people[0].column, 2);
        assert_eq!(people[1].index, 2);
        assert_eq!(people[1].column, 4);
        assert_eq!(normalize_string(people[1].by_label("氏名").unwrap()), "佐藤");
    }

    #[test]
    fn test_transpose_without_identity_row() {
        let matrix = sample();
        assert!(transpose(&matrix, None).is_empty());
    }

    #[test]
    fn test_empty_grid_is_error() {
        let grid: Vec<Vec<&str>> = Vec::new();
        assert!(RawMatrix::from_text_rows(&grid).is_err());
    }
}
