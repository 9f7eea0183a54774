//! Skill Matrix Common Library
//!
//! 自己紹介マトリクスを社員・スキル・営業所のJSONレコードに変換するコア。
//! ファイル入出力は持たない（CLI側で行う）。

pub mod types;
pub mod error;
pub mod cell;
pub mod matrix;
pub mod classifier;
pub mod extractor;
pub mod assembler;
pub mod category;
pub mod query;

pub use types::{
    default_offices, EmployeeRecord, OfficeRecord, PersonalInfo, ProjectRecord, Skill,
    SkillCategory, SkillCategoryTree, SkillMap, TraitMap, TwoTypeRatio,
};
pub use error::{Error, Result};
pub use cell::{normalize_int, normalize_string, CellValue};
pub use matrix::{transpose, PersonColumn, RawMatrix};
pub use classifier::{classify_rows, ClassifierRules, RowClass, RowClassification, RowLabel};
pub use extractor::{parse_projects, parse_traits, parse_two_type_ratio};
pub use assembler::{
    assemble, assemble_matrix, count_office_employees, AssemblyMode, AssemblyOptions,
    AssemblyIssue, AssemblyResult, AssemblyStats, IssueField, LegacyDefaults, MetadataLabels,
};
pub use category::{CategoryTreeBuilder, TopSkillPolicy};
