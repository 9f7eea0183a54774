use crate::error::Result;
use skill_matrix_common::CellValue;
use std::path::Path;

const BOM: char = '\u{feff}';

/// 区切り文字ファイルを読む（行ごとの列数は揃えない）
pub(super) fn read_delimited(path: &Path, delimiter: u8) -> Result<Vec<Vec<CellValue>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)?;

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Vec<CellValue> = record
            .iter()
            .enumerate()
            .map(|(i, field)| {
                // Excelで保存したCSVの先頭にBOMが残ることがある
                let field = if grid.is_empty() && i == 0 {
                    field.trim_start_matches(BOM)
                } else {
                    field
                };
                CellValue::from_text(field)
            })
            .collect();
        grid.push(row);
    }
    Ok(grid)
}
