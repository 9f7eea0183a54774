use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkillMatrixError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("未対応のファイル形式です: {0}（csv/tsv/xlsx/xlsm/xls/xlsb/ods）")]
    UnsupportedFormat(String),

    #[error("シートが見つかりません: {0}")]
    SheetNotFound(String),

    #[error("Excel読み込みエラー: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV読み込みエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("キャッシュがありません: {0}")]
    CacheMissing(String),

    #[error("社員が見つかりません: id={0}")]
    EmployeeNotFound(u64),

    #[error(transparent)]
    Common(#[from] skill_matrix_common::Error),
}

pub type Result<T> = std::result::Result<T, SkillMatrixError>;
