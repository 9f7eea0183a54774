use crate::error::{Result, SkillMatrixError};
use calamine::{open_workbook_auto, Data, Reader};
use skill_matrix_common::CellValue;
use std::path::Path;

fn to_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::from_text(s),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) => CellValue::Text(ndt.format("%Y-%m-%d").to_string()),
            None => CellValue::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_text(s),
        Data::Error(e) => {
            tracing::debug!(error = ?e, "エラーセルは空として扱います");
            CellValue::Empty
        }
    }
}

/// シートを読む（名前指定がなければ先頭シート）
pub(super) fn read_sheet(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<CellValue>>> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| SkillMatrixError::SheetNotFound(path.display().to_string()))?,
    };
    if !workbook.sheet_names().iter().any(|n| *n == sheet_name) {
        return Err(SkillMatrixError::SheetNotFound(sheet_name));
    }

    let range = workbook.worksheet_range(&sheet_name)?;

    // Range は最初の使用セルから始まるので、A列基準に戻して列位置を保つ
    let first_col = range.start().map(|(_, col)| col).unwrap_or(0);
    let mut grid: Vec<Vec<CellValue>> = Vec::with_capacity(range.height());
    for row in range.rows() {
        let mut cells = vec![CellValue::Empty; first_col as usize];
        cells.extend(row.iter().map(to_cell));
        grid.push(cells);
    }
    Ok(grid)
}
