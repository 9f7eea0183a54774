//! 行ラベルの分類
//!
//! 列0のラベル文字列を見て、スキル行・資格行・メタデータ行に振り分ける。
//! 判定は「述語 → 分類」の規則表を上から順に評価し、最初に一致した分類を採用する。
//!
//! ## 既定の規則表
//! 1. 自由記述マーカーを含む → メタデータ
//! 2. 予約ラベル（性格タイプ・業務キャパシティ）に一致 → メタデータ
//! 3. 区切り文字と資格マーカーを含む → 資格
//! 4. 区切り文字を含む → スキル
//! 5. それ以外 → メタデータ

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// カテゴリとスキルの区切り文字
pub const SEPARATOR: &str = "_";
/// 自由記述行のマーカー
pub const FREE_TEXT_MARKER: &str = "自由記述";
/// 資格行のマーカー
pub const CERTIFICATION_MARKER: &str = "資格";
/// 性格タイプ行（区切り文字を含むがスキルではない）
pub const PERSONALITY_TYPE_LABEL: &str = "性格_タイプ";
/// 業務キャパシティ行（区切り文字を含むがスキルではない）
pub const BUSINESS_CAPACITY_LABEL: &str = "業務_キャパシティ";

/// 行ラベルを区切り文字で分解したもの
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowLabel<'a> {
    pub raw: &'a str,
    /// 最初の区切りより前
    pub category: Option<&'a str>,
    /// 最初の区切りより後ろ全部
    pub rest: Option<&'a str>,
}

impl<'a> RowLabel<'a> {
    pub fn parse(raw: &'a str, separator: &str) -> Self {
        match raw.split_once(separator) {
            Some((category, rest)) if !separator.is_empty() => Self {
                raw,
                category: Some(category.trim()),
                rest: Some(rest.trim()),
            },
            _ => Self {
                raw,
                category: None,
                rest: None,
            },
        }
    }

    /// 最後の区切り以降（スキル名・資格名の表示用）
    pub fn leaf(&self, separator: &str) -> &'a str {
        if separator.is_empty() {
            return self.raw.trim();
        }
        self.raw
            .rsplit(separator)
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| self.raw.trim())
    }
}

/// 行の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowClass {
    Skill,
    Certification,
    Metadata,
}

/// ラベルに対する述語
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum LabelPredicate {
    /// 区切り文字を含む
    HasSeparator,
    Contains(String),
    Equals(String),
    OneOf(Vec<String>),
    AllOf(Vec<LabelPredicate>),
    Not(Box<LabelPredicate>),
}

impl LabelPredicate {
    pub fn matches(&self, label: &str, separator: &str) -> bool {
        match self {
            LabelPredicate::HasSeparator => !separator.is_empty() && label.contains(separator),
            LabelPredicate::Contains(s) => label.contains(s.as_str()),
            LabelPredicate::Equals(s) => label == s,
            LabelPredicate::OneOf(list) => list.iter().any(|s| s == label),
            LabelPredicate::AllOf(preds) => preds.iter().all(|p| p.matches(label, separator)),
            LabelPredicate::Not(pred) => !pred.matches(label, separator),
        }
    }
}

/// 規則表の1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRule {
    pub when: LabelPredicate,
    pub class: RowClass,
}

/// 分類規則
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
    pub separator: String,
    pub rules: Vec<ClassRule>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            separator: SEPARATOR.into(),
            rules: vec![
                ClassRule {
                    when: LabelPredicate::Contains(FREE_TEXT_MARKER.into()),
                    class: RowClass::Metadata,
                },
                ClassRule {
                    when: LabelPredicate::OneOf(vec![
                        PERSONALITY_TYPE_LABEL.into(),
                        BUSINESS_CAPACITY_LABEL.into(),
                    ]),
                    class: RowClass::Metadata,
                },
                ClassRule {
                    when: LabelPredicate::AllOf(vec![
                        LabelPredicate::HasSeparator,
                        LabelPredicate::Contains(CERTIFICATION_MARKER.into()),
                    ]),
                    class: RowClass::Certification,
                },
                ClassRule {
                    when: LabelPredicate::HasSeparator,
                    class: RowClass::Skill,
                },
            ],
        }
    }
}

impl ClassifierRules {
    pub fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(Error::Config("区切り文字が空です".into()));
        }
        Ok(())
    }

    /// 1ラベルを分類（どの規則にも一致しなければメタデータ）
    pub fn classify_label(&self, label: &str) -> RowClass {
        self.rules
            .iter()
            .find(|rule| rule.when.matches(label, &self.separator))
            .map(|rule| rule.class)
            .unwrap_or(RowClass::Metadata)
    }
}

/// 分類結果（行番号の集合、互いに素）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowClassification {
    pub skill_rows: Vec<usize>,
    pub certification_rows: Vec<usize>,
    pub metadata_rows: Vec<usize>,
}

/// 行ラベルを上から順に分類する
pub fn classify_rows<'a>(
    labels: impl IntoIterator<Item = &'a str>,
    rules: &ClassifierRules,
) -> RowClassification {
    let mut result = RowClassification::default();
    for (row, label) in labels.into_iter().enumerate() {
        match rules.classify_label(label) {
            RowClass::Skill => result.skill_rows.push(row),
            RowClass::Certification => result.certification_rows.push(row),
            RowClass::Metadata => result.metadata_rows.push(row),
        }
    }
    tracing::debug!(
        skills = result.skill_rows.len(),
        certifications = result.certification_rows.len(),
        metadata = result.metadata_rows.len(),
        "行分類完了"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: &[&str] = &[
        "社員番号",
        "氏名",
        "システム開発_基幹",
        "ITインフラ_クラウド_AWS",
        "資格_基本情報技術者",
        "自由記述_進行中案件",
        "性格_タイプ",
        "業務_キャパシティ",
        "2タイプ診断",
    ];

    #[test]
    fn test_default_rules_partition() {
        let result = classify_rows(LABELS.iter().copied(), &ClassifierRules::default());
        assert_eq!(result.skill_rows, vec![2, 3]);
        assert_eq!(result.certification_rows, vec![4]);
        assert_eq!(result.metadata_rows, vec![0, 1, 5, 6, 7, 8]);
    }

    #[test]
    fn test_certification_marker_requires_separator() {
        let rules = ClassifierRules::default();
        // 区切りのない「資格」行は資格行ではない
        assert_eq!(rules.classify_label("保有資格"), RowClass::Metadata);
        assert_eq!(rules.classify_label("資格_応用情報"), RowClass::Certification);
    }

    #[test]
    fn test_free_text_with_certification_is_metadata() {
        let rules = ClassifierRules::default();
        assert_eq!(rules.classify_label("自由記述_資格メモ"), RowClass::Metadata);
    }

    #[test]
    fn test_row_label_first_and_last_split() {
        let label = RowLabel::parse("ITインフラ_クラウド_AWS", "_");
        assert_eq!(label.category, Some("ITインフラ"));
        assert_eq!(label.rest, Some("クラウド_AWS"));
        assert_eq!(label.leaf("_"), "AWS");

        let plain = RowLabel::parse("氏名", "_");
        assert_eq!(plain.category, None);
        assert_eq!(plain.leaf("_"), "氏名");
    }

    #[test]
    fn test_leaf_skips_trailing_empty_segment() {
        let label = RowLabel::parse("資格_応用情報_", "_");
        assert_eq!(label.leaf("_"), "応用情報");
    }

    #[test]
    fn test_custom_rule_table() {
        let rules = ClassifierRules {
            separator: "/".into(),
            rules: vec![ClassRule {
                when: LabelPredicate::AllOf(vec![
                    LabelPredicate::HasSeparator,
                    LabelPredicate::Not(Box::new(LabelPredicate::Contains("メモ".into()))),
                ]),
                class: RowClass::Skill,
            }],
        };
        assert_eq!(rules.classify_label("言語/Rust"), RowClass::Skill);
        assert_eq!(rules.classify_label("言語/メモ"), RowClass::Metadata);
        assert_eq!(rules.classify_label("システム開発_基幹"), RowClass::Metadata);
    }

    #[test]
    fn test_rules_roundtrip_json() {
        let rules = ClassifierRules::default();
        let json = serde_json::to_string(&rules).unwrap();
        let parsed: ClassifierRules = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, rules);
    }

    #[test]
    fn test_validate_empty_separator() {
        let rules = ClassifierRules {
            separator: String::new(),
            ..Default::default()
        };
        assert!(rules.validate().is_err());
    }
}
