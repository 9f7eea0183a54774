//! 入力ファイルの読み込み
//!
//! CSV/TSV は csv クレート、Excel/ODS は calamine で読み、
//! 同じセルグリッド（`Vec<Vec<CellValue>>`）に揃える。

mod csv_source;
mod workbook;

use crate::error::{Result, SkillMatrixError};
use skill_matrix_common::cell::normalize_string;
use skill_matrix_common::{CellValue, RawMatrix};
use std::path::Path;

/// 入力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Tsv,
    Workbook,
}

impl SourceFormat {
    /// 拡張子から判定
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "tsv" | "txt" => Ok(SourceFormat::Tsv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Ok(SourceFormat::Workbook),
            _ => Err(SkillMatrixError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// ファイルをセルグリッドとして読み込む
pub fn read_grid(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<CellValue>>> {
    if !path.exists() {
        return Err(SkillMatrixError::FileNotFound(path.display().to_string()));
    }

    let grid = match SourceFormat::from_path(path)? {
        SourceFormat::Csv => csv_source::read_delimited(path, b',')?,
        SourceFormat::Tsv => csv_source::read_delimited(path, b'\t')?,
        SourceFormat::Workbook => workbook::read_sheet(path, sheet)?,
    };
    tracing::debug!(path = %path.display(), rows = grid.len(), "入力を読み込みました");
    Ok(grid)
}

/// 自己紹介マトリクスを読み込む（先頭行はヘッダー）
pub fn load_matrix(path: &Path, sheet: Option<&str>) -> Result<RawMatrix> {
    let grid = read_grid(path, sheet)?;
    Ok(RawMatrix::from_rows(grid)?)
}

/// 2列の一覧（カテゴリ, スキル）を読み込む（先頭行はヘッダー、空行は除外）
pub fn load_listing(path: &Path, sheet: Option<&str>) -> Result<Vec<(String, String)>> {
    let grid = read_grid(path, sheet)?;
    let rows = grid
        .iter()
        .skip(1)
        .filter_map(|row| {
            let category = row.first().map(normalize_string).unwrap_or_default();
            let skill = row.get(1).map(normalize_string).unwrap_or_default();
            if category.is_empty() || skill.is_empty() {
                None
            } else {
                Some((category, skill))
            }
        })
        .collect();
    Ok(rows)
}
