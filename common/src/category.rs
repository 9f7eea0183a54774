//! スキル分類ツリーの構築
//!
//! カテゴリ → スキルの2階層と、絞り込み用の「主要スキル」一覧を作る。
//! 入力は2列の一覧（カテゴリ, スキル）か、分類済みマトリクスのスキル行。
//! スキルIDは1つのカウンタから単調増加で振るため、主要スキルとして
//! 後から補ったスキルとも重複しない。

use crate::cell::trim_cell;
use crate::classifier::{RowClassification, RowLabel};
use crate::matrix::RawMatrix;
use crate::types::{Skill, SkillCategory, SkillCategoryTree};
use serde::{Deserialize, Serialize};

/// 主要スキルの選び方
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopSkillPolicy {
    /// 指定があればこの名前だけを順に採用
    pub allow_list: Vec<String>,
    /// 指定がないときは出現順の先頭N件
    pub top_n: usize,
    /// 一度も出現しなかった指定スキルの追加先
    pub fallback_category: String,
}

impl Default for TopSkillPolicy {
    fn default() -> Self {
        Self {
            allow_list: ["基幹", "Web", "クラウド", "データベース", "ネットワーク", "セキュリティ"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            top_n: 12,
            fallback_category: "その他".into(),
        }
    }
}

/// ツリー構築用のビルダー
#[derive(Debug, Default)]
pub struct CategoryTreeBuilder {
    categories: Vec<SkillCategory>,
    /// 出現順のスキル（主要スキル選定用）
    encountered: Vec<Skill>,
    last_category_id: u32,
    last_skill_id: u32,
}

impl CategoryTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_skill_id(&mut self) -> u32 {
        self.last_skill_id += 1;
        self.last_skill_id
    }

    fn category_index(&mut self, name: &str) -> usize {
        if let Some(pos) = self.categories.iter().position(|c| c.name == name) {
            return pos;
        }
        self.last_category_id += 1;
        self.categories.push(SkillCategory {
            id: self.last_category_id,
            name: name.to_string(),
            skills: Vec::new(),
        });
        self.categories.len() - 1
    }

    /// スキルを追加（空の名前は無視、同じカテゴリ内の重複は最初の1件）
    pub fn push(&mut self, category: &str, skill: &str) -> Option<&Skill> {
        let category = trim_cell(category);
        let skill = trim_cell(skill);
        if category.is_empty() || skill.is_empty() {
            return None;
        }

        let idx = self.category_index(category);
        if let Some(pos) = self.categories[idx].skills.iter().position(|s| s.name == skill) {
            return self.categories[idx].skills.get(pos);
        }

        let entry = Skill {
            id: self.next_skill_id(),
            name: skill.to_string(),
        };
        self.encountered.push(entry.clone());
        self.categories[idx].skills.push(entry);
        self.categories[idx].skills.last()
    }

    /// 主要スキルを選んでツリーを確定する
    pub fn finish(mut self, policy: &TopSkillPolicy) -> SkillCategoryTree {
        let top_skills = if policy.allow_list.is_empty() {
            self.encountered.iter().take(policy.top_n).cloned().collect()
        } else {
            let mut top = Vec::with_capacity(policy.allow_list.len());
            for name in &policy.allow_list {
                let name = trim_cell(name);
                if name.is_empty() || top.iter().any(|s: &Skill| s.name == name) {
                    continue;
                }
                let skill = match self.encountered.iter().find(|s| s.name == name) {
                    Some(found) => found.clone(),
                    None => {
                        let synthesized = Skill {
                            id: self.next_skill_id(),
                            name: name.to_string(),
                        };
                        let idx = self.category_index(&policy.fallback_category);
                        self.categories[idx].skills.push(synthesized.clone());
                        tracing::debug!(skill = %name, id = synthesized.id, "主要スキルを補完");
                        synthesized
                    }
                };
                top.push(skill);
            }
            top
        };

        SkillCategoryTree {
            categories: self.categories,
            top_skills,
        }
    }
}

/// 2列の一覧（カテゴリ, スキル）から構築
pub fn from_listing<C, S>(rows: &[(C, S)], policy: &TopSkillPolicy) -> SkillCategoryTree
where
    C: AsRef<str>,
    S: AsRef<str>,
{
    let mut builder = CategoryTreeBuilder::new();
    for (category, skill) in rows {
        builder.push(category.as_ref(), skill.as_ref());
    }
    builder.finish(policy)
}

/// 分類済みマトリクスのスキル行から構築（カテゴリ = 最初の区切りの前、スキル = 後ろ全部）
pub fn from_classification(
    matrix: &RawMatrix,
    classification: &RowClassification,
    separator: &str,
    policy: &TopSkillPolicy,
) -> SkillCategoryTree {
    let mut builder = CategoryTreeBuilder::new();
    for &row in &classification.skill_rows {
        let Some(matrix_row) = matrix.rows().get(row) else {
            continue;
        };
        let label = RowLabel::parse(&matrix_row.label, separator);
        if let (Some(category), Some(rest)) = (label.category, label.rest) {
            builder.push(category, rest);
        }
    }
    builder.finish(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{classify_rows, ClassifierRules};
    use std::collections::HashSet;

    fn assert_unique_ids(tree: &SkillCategoryTree) {
        let mut seen = HashSet::new();
        for skill in tree.all_skills() {
            assert!(seen.insert(skill.id), "ID重複: {}", skill.id);
        }
        // 主要スキルは既存エントリと同じIDを共有する
        for skill in &tree.top_skills {
            let found = tree.all_skills().find(|s| s.id == skill.id).unwrap();
            assert_eq!(found.name, skill.name);
        }
    }

    #[test]
    fn test_from_listing_first_n() {
        let rows = vec![
            ("システム開発", "基幹"),
            ("システム開発", "Web"),
            ("", "孤立"),
            ("ITインフラ", "クラウド"),
            ("ITインフラ", " "),
        ];
        let policy = TopSkillPolicy {
            allow_list: Vec::new(),
            top_n: 2,
            ..Default::default()
        };
        let tree = from_listing(&rows, &policy);
        assert_eq!(tree.categories.len(), 2);
        assert_eq!(tree.categories[0].id, 1);
        assert_eq!(tree.categories[1].skills[0].id, 3);
        let names: Vec<&str> = tree.top_skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["基幹", "Web"]);
        assert_unique_ids(&tree);
    }

    #[test]
    fn test_allow_list_synthesizes_missing() {
        let rows = vec![("システム開発", "基幹"), ("ITインフラ", "クラウド")];
        let policy = TopSkillPolicy {
            allow_list: vec!["クラウド".into(), "AI".into(), "基幹".into()],
            top_n: 12,
            fallback_category: "その他".into(),
        };
        let tree = from_listing(&rows, &policy);

        let top: Vec<(u32, &str)> = tree.top_skills.iter().map(|s| (s.id, s.name.as_str())).collect();
        assert_eq!(top, vec![(2, "クラウド"), (3, "AI"), (1, "基幹")]);
        let other = tree.categories.iter().find(|c| c.name == "その他").unwrap();
        assert_eq!(other.skills[0].name, "AI");
        assert_eq!(other.id, 3);
        assert_unique_ids(&tree);
    }

    #[test]
    fn test_allow_list_into_existing_fallback_category() {
        let rows = vec![("その他", "Excel"), ("保守", "Web")];
        let policy = TopSkillPolicy {
            allow_list: vec!["Rust".into(), "Go".into()],
            ..Default::default()
        };
        let tree = from_listing(&rows, &policy);
        assert_eq!(tree.categories.len(), 2);
        let names: Vec<&str> = tree.categories[0].skills.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Excel", "Rust", "Go"]);
        assert_unique_ids(&tree);
    }

    #[test]
    fn test_same_skill_name_in_two_categories() {
        let rows = vec![("システム開発", "Web"), ("保守", "Web"), ("保守", "Web")];
        let tree = from_listing(&rows, &TopSkillPolicy::default());
        assert_eq!(tree.categories[1].skills.len(), 1);
        assert_eq!(tree.all_skills().count(), 2 + 5);
        // 主要スキル "Web" は最初に出現したエントリ
        let web = tree.top_skills.iter().find(|s| s.name == "Web").unwrap();
        assert_eq!(web.id, 1);
        assert_unique_ids(&tree);
    }

    #[test]
    fn test_from_classification_uses_rest_of_label() {
        let matrix = RawMatrix::from_text_rows(&[
            vec!["項目", "備考", "P1"],
            vec!["社員番号", "", "1"],
            vec!["システム開発_基幹", "", "3"],
            vec!["ITインフラ_クラウド_AWS", "", "2"],
            vec!["資格_基本情報技術者", "", "1"],
        ])
        .unwrap();
        let rules = ClassifierRules::default();
        let classification = classify_rows(matrix.labels(), &rules);
        let policy = TopSkillPolicy {
            allow_list: Vec::new(),
            ..Default::default()
        };
        let tree = from_classification(&matrix, &classification, &rules.separator, &policy);

        assert_eq!(tree.categories.len(), 2);
        assert_eq!(tree.categories[1].name, "ITインフラ");
        assert_eq!(tree.categories[1].skills[0].name, "クラウド_AWS");
        assert!(tree.all_skills().all(|s| s.name != "基本情報技術者"));
        assert_eq!(tree.top_skills.len(), 2);
    }

    #[test]
    fn test_ids_unique_for_many_policies() {
        let rows: Vec<(String, String)> = (0..20)
            .map(|i| (format!("カテゴリ{}", i % 3), format!("スキル{}", i % 7)))
            .collect();
        for allow in [vec![], vec!["スキル1".to_string()], vec!["新規".to_string(), "スキル6".to_string(), "新規".to_string()]] {
            for top_n in [0, 3, 50] {
                let policy = TopSkillPolicy {
                    allow_list: allow.clone(),
                    top_n,
                    fallback_category: "カテゴリ0".into(),
                };
                assert_unique_ids(&from_listing(&rows, &policy));
            }
        }
    }
}
