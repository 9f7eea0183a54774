//! 出力レコードの型定義
//!
//! ダッシュボードが読むJSONと同じ形:
//! - EmployeeRecord: 社員1人分（employees.json の要素）
//! - SkillCategoryTree: スキル分類（skills.json）
//! - OfficeRecord: 営業所（offices.json の要素）

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// スキル名 → レベル（0以下は出力しない）
pub type SkillMap = BTreeMap<String, i64>;

/// 性格特性名 → スコア
pub type TraitMap = BTreeMap<String, i64>;

/// 2タイプ診断の名前 → 割合(%)
pub type TwoTypeRatio = BTreeMap<String, i64>;

/// 進行中案件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub name: String,
    pub role: String,
    /// 顧客名（6項目形式のみ）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    /// 進捗率 0..=100
    pub progress: u8,
    pub phase: String,
    pub deadline: String,
}

/// 個人情報
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    pub birthplace: String,
    pub hobbies: Vec<String>,
    pub languages: Vec<String>,
    pub joined_date: String,
    pub gender: String,
    pub age: String,
    pub lifestyle: String,
    pub work_style: String,
    pub self_pr: String,
}

/// 社員レコード
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub id: u64,
    pub name: String,
    pub office: String,
    #[serde(default)]
    pub business_capacity: i64,
    #[serde(default)]
    pub skills: SkillMap,
    /// 資格
    #[serde(default)]
    pub shikaku: SkillMap,
    #[serde(default)]
    pub ongoing_projects: Vec<ProjectRecord>,
    #[serde(default)]
    pub personality_traits: TraitMap,
    #[serde(default)]
    pub personality_type: String,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub two_type_ratio: Option<TwoTypeRatio>,
}

impl EmployeeRecord {
    /// スキル（資格は含まない）を保有しているか
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains_key(skill)
    }
}

/// スキル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: u32,
    pub name: String,
}

/// スキルカテゴリ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategory {
    pub id: u32,
    pub name: String,
    pub skills: Vec<Skill>,
}

/// スキル分類ツリー
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillCategoryTree {
    pub categories: Vec<SkillCategory>,
    pub top_skills: Vec<Skill>,
}

impl SkillCategoryTree {
    /// カテゴリ内の全スキルを出現順に返す
    pub fn all_skills(&self) -> impl Iterator<Item = &Skill> {
        self.categories.iter().flat_map(|c| c.skills.iter())
    }
}

/// 営業所
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficeRecord {
    pub id: u32,
    pub name: String,
    pub location: String,
    /// 所属社員数（社員データから毎回集計する）
    #[serde(default)]
    pub employees_count: usize,
}

impl OfficeRecord {
    pub fn new(id: u32, name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            location: location.into(),
            employees_count: 0,
        }
    }
}

/// 既定の営業所一覧
pub fn default_offices() -> Vec<OfficeRecord> {
    vec![
        OfficeRecord::new(1, "東京", "東京都渋谷区"),
        OfficeRecord::new(2, "大阪", "大阪府大阪市"),
        OfficeRecord::new(3, "沖縄", "沖縄県那覇市"),
    ]
}
