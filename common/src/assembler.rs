//! 社員レコードの組み立て
//!
//! 転置した社員列ごとに、メタデータ行（ラベル完全一致）・スキル行・資格行・
//! 自由記述セルを読み、EmployeeRecord を1件作る。
//!
//! ## 処理フロー
//! 1. 識別行（社員番号、なければ氏名）が空の列を除外
//! 2. メタデータをラベルで引いて正規化
//! 3. スキル・資格マップ（キーはラベル末尾、0以下は除外）
//! 4. 案件・性格特性・2タイプ診断を抽出
//!
//! 形式違反のセルは既定値にして続行し、内容を `issues` に記録する。

use crate::cell::{fold_fullwidth_digits, normalize_int, normalize_string};
use crate::classifier::{
    classify_rows, ClassifierRules, RowClassification, RowLabel, BUSINESS_CAPACITY_LABEL,
    PERSONALITY_TYPE_LABEL,
};
use crate::extractor::{parse_list, parse_projects_detailed, parse_traits, parse_two_type_ratio};
use crate::matrix::{transpose, PersonColumn, RawMatrix};
use crate::types::{EmployeeRecord, OfficeRecord, PersonalInfo, SkillMap};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// メタデータ行のラベル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataLabels {
    pub id: String,
    pub name: String,
    pub office: String,
    pub age: String,
    pub gender: String,
    pub birthplace: String,
    pub lifestyle: String,
    pub work_style: String,
    pub hobbies: String,
    pub languages: String,
    pub joined_date: String,
    pub personality_type: String,
    pub business_capacity: String,
    pub two_type_ratio: String,
    pub projects: String,
    pub traits: String,
    pub self_pr: String,
}

impl Default for MetadataLabels {
    fn default() -> Self {
        Self {
            id: "社員番号".into(),
            name: "氏名".into(),
            office: "所属営業所".into(),
            age: "年齢層".into(),
            gender: "男女比".into(),
            birthplace: "出身地".into(),
            lifestyle: "暮らしのスタイル".into(),
            work_style: "ワークスタイル".into(),
            hobbies: "趣味".into(),
            languages: "言語".into(),
            joined_date: "入社日".into(),
            personality_type: PERSONALITY_TYPE_LABEL.into(),
            business_capacity: BUSINESS_CAPACITY_LABEL.into(),
            two_type_ratio: "2タイプ診断".into(),
            projects: "自由記述_進行中案件".into(),
            traits: "自由記述_性格特性".into(),
            self_pr: "自由記述_自己PR".into(),
        }
    }
}

/// 組み立てモード
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssemblyMode {
    /// 欠損項目に既定値を入れる旧形式
    Legacy,
    /// 欠損項目は空文字のまま
    #[default]
    Rich,
}

impl std::str::FromStr for AssemblyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "legacy" | "simple" => Ok(AssemblyMode::Legacy),
            "rich" | "full" => Ok(AssemblyMode::Rich),
            _ => Err(format!("Unknown mode: {}. Use legacy or rich", s)),
        }
    }
}

impl std::fmt::Display for AssemblyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssemblyMode::Legacy => write!(f, "legacy"),
            AssemblyMode::Rich => write!(f, "rich"),
        }
    }
}

/// 旧形式の既定値
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyDefaults {
    pub office: String,
    pub age: String,
    pub gender: String,
    pub birthplace: String,
    pub lifestyle: String,
    pub work_style: String,
}

impl Default for LegacyDefaults {
    fn default() -> Self {
        Self {
            office: "東京".into(),
            age: "30代".into(),
            gender: "男性".into(),
            birthplace: "関西".into(),
            lifestyle: "一人暮らし".into(),
            work_style: "テレワーク".into(),
        }
    }
}

/// 組み立てオプション
#[derive(Debug, Clone, Default)]
pub struct AssemblyOptions {
    pub mode: AssemblyMode,
    pub labels: MetadataLabels,
    pub rules: ClassifierRules,
    pub legacy_defaults: LegacyDefaults,
    /// 旧形式でこれ以外の営業所は既定値に置き換える（空なら置き換えない）
    pub known_offices: Vec<String>,
}

/// 記録対象のフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueField {
    Id,
    Projects,
    Traits,
    TwoTypeRatio,
}

impl std::fmt::Display for IssueField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueField::Id => write!(f, "社員番号"),
            IssueField::Projects => write!(f, "進行中案件"),
            IssueField::Traits => write!(f, "性格特性"),
            IssueField::TwoTypeRatio => write!(f, "2タイプ診断"),
        }
    }
}

/// 形式違反の記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyIssue {
    /// 元マトリクスの列番号
    pub column: usize,
    pub field: IssueField,
    pub raw: String,
    pub reason: String,
}

/// 組み立ての統計情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    /// 社員列の総数
    pub person_columns: usize,
    /// 出力したレコード数
    pub employees: usize,
    /// 識別セルが空で除外した列数
    pub skipped_columns: usize,
    /// 捨てた案件項目数
    pub rejected_project_items: usize,
    /// テンプレートに合わなかった2タイプ診断の数
    pub malformed_ratio_blocks: usize,
    /// 有効な項目がなかった性格特性の数
    pub malformed_trait_blocks: usize,
}

/// 組み立て結果
#[derive(Debug, Clone, Default)]
pub struct AssemblyResult {
    pub employees: Vec<EmployeeRecord>,
    pub stats: AssemblyStats,
    pub issues: Vec<AssemblyIssue>,
}

/// 1人分の読み取り
struct PersonReader<'a> {
    person: PersonColumn<'a>,
    metadata: &'a HashMap<&'a str, usize>,
}

impl PersonReader<'_> {
    fn text(&self, label: &str) -> String {
        self.metadata
            .get(label)
            .map(|&row| normalize_string(self.person.cell(row)))
            .unwrap_or_default()
    }

    fn int(&self, label: &str) -> i64 {
        self.metadata
            .get(label)
            .map(|&row| normalize_int(self.person.cell(row)))
            .unwrap_or(0)
    }

    fn skill_map(&self, matrix: &RawMatrix, rows: &[usize], separator: &str) -> SkillMap {
        let mut map = SkillMap::new();
        for &row in rows {
            let Some(matrix_row) = matrix.rows().get(row) else {
                continue;
            };
            let level = normalize_int(self.person.cell(row));
            if level <= 0 {
                continue;
            }
            let key = RowLabel::parse(&matrix_row.label, separator).leaf(separator);
            map.insert(key.to_string(), level);
        }
        map
    }
}

fn or_default(value: String, mode: AssemblyMode, default: &str) -> String {
    if value.is_empty() && mode == AssemblyMode::Legacy {
        default.to_string()
    } else {
        value
    }
}

/// 分類済みマトリクスから社員レコードを組み立てる
pub fn assemble(
    matrix: &RawMatrix,
    classification: &RowClassification,
    options: &AssemblyOptions,
) -> AssemblyResult {
    let labels = &options.labels;
    let separator = options.rules.separator.as_str();
    let mode = options.mode;

    // メタデータ行はラベル完全一致（同名は最初の行）、範囲外の行番号は無視
    let mut metadata: HashMap<&str, usize> = HashMap::new();
    for &row in &classification.metadata_rows {
        if let Some(matrix_row) = matrix.rows().get(row) {
            metadata.entry(matrix_row.label.as_str()).or_insert(row);
        }
    }

    let identity_row = metadata
        .get(labels.id.as_str())
        .or_else(|| metadata.get(labels.name.as_str()))
        .copied();
    let people = transpose(matrix, identity_row);

    let mut stats = AssemblyStats {
        person_columns: matrix.person_count(),
        skipped_columns: matrix.person_count() - people.len(),
        ..Default::default()
    };
    let mut issues = Vec::new();
    let mut employees = Vec::with_capacity(people.len());

    for person in people {
        let reader = PersonReader {
            person,
            metadata: &metadata,
        };
        let column = person.column;

        // 社員番号: 数字のみなら採用、それ以外は通し番号+1
        let raw_id = fold_fullwidth_digits(&reader.text(&labels.id));
        let numeric_id = if !raw_id.is_empty() && raw_id.chars().all(|c| c.is_ascii_digit()) {
            raw_id.parse::<u64>().ok()
        } else {
            None
        };
        if numeric_id.is_none() && !raw_id.is_empty() {
            issues.push(AssemblyIssue {
                column,
                field: IssueField::Id,
                raw: raw_id.clone(),
                reason: "数値でないため通し番号を使用".into(),
            });
        }
        let id = numeric_id.unwrap_or(person.index as u64 + 1);

        let mut name = reader.text(&labels.name);
        if name.is_empty() && mode == AssemblyMode::Legacy {
            let shown = if raw_id.is_empty() { id.to_string() } else { raw_id.clone() };
            name = format!("社員{}", shown);
        }

        let mut office = reader.text(&labels.office);
        if mode == AssemblyMode::Legacy
            && (office.is_empty()
                || (!options.known_offices.is_empty() && !options.known_offices.contains(&office)))
        {
            office = options.legacy_defaults.office.clone();
        }

        let projects_text = reader.text(&labels.projects);
        let parsed = parse_projects_detailed(&projects_text);
        if parsed.rejected > 0 {
            stats.rejected_project_items += parsed.rejected;
            issues.push(AssemblyIssue {
                column,
                field: IssueField::Projects,
                raw: projects_text.clone(),
                reason: format!("{}件の項目を破棄", parsed.rejected),
            });
        }

        let traits_text = reader.text(&labels.traits);
        let personality_traits = parse_traits(&traits_text);
        if personality_traits.is_empty() && !traits_text.is_empty() {
            stats.malformed_trait_blocks += 1;
            issues.push(AssemblyIssue {
                column,
                field: IssueField::Traits,
                raw: traits_text,
                reason: "名前:点数 の項目がありません".into(),
            });
        }

        let ratio_text = reader.text(&labels.two_type_ratio);
        let two_type_ratio = if ratio_text.is_empty() {
            None
        } else {
            let ratio = parse_two_type_ratio(&ratio_text);
            if ratio.is_empty() {
                stats.malformed_ratio_blocks += 1;
                issues.push(AssemblyIssue {
                    column,
                    field: IssueField::TwoTypeRatio,
                    raw: ratio_text,
                    reason: "テンプレートの行数・割合が一致しません".into(),
                });
                None
            } else {
                Some(ratio)
            }
        };

        let defaults = &options.legacy_defaults;
        let personal_info = PersonalInfo {
            birthplace: or_default(reader.text(&labels.birthplace), mode, &defaults.birthplace),
            hobbies: parse_list(&reader.text(&labels.hobbies)),
            languages: parse_list(&reader.text(&labels.languages)),
            joined_date: reader.text(&labels.joined_date),
            gender: or_default(reader.text(&labels.gender), mode, &defaults.gender),
            age: or_default(reader.text(&labels.age), mode, &defaults.age),
            lifestyle: or_default(reader.text(&labels.lifestyle), mode, &defaults.lifestyle),
            work_style: or_default(reader.text(&labels.work_style), mode, &defaults.work_style),
            self_pr: reader.text(&labels.self_pr),
        };

        employees.push(EmployeeRecord {
            id,
            name,
            office,
            business_capacity: reader.int(&labels.business_capacity),
            skills: reader.skill_map(matrix, &classification.skill_rows, separator),
            shikaku: reader.skill_map(matrix, &classification.certification_rows, separator),
            ongoing_projects: parsed.projects,
            personality_traits,
            personality_type: reader.text(&labels.personality_type),
            personal_info,
            two_type_ratio,
        });
    }

    stats.employees = employees.len();

    for issue in &issues {
        tracing::warn!(
            column = issue.column,
            field = %issue.field,
            raw = %issue.raw,
            "{}",
            issue.reason
        );
    }
    tracing::info!(
        employees = stats.employees,
        skipped = stats.skipped_columns,
        issues = issues.len(),
        "社員レコードを組み立てました"
    );

    AssemblyResult {
        employees,
        stats,
        issues,
    }
}

/// 行分類から組み立てまでを一括で行う
pub fn assemble_matrix(matrix: &RawMatrix, options: &AssemblyOptions) -> AssemblyResult {
    let classification = classify_rows(matrix.labels(), &options.rules);
    assemble(matrix, &classification, options)
}

/// 営業所ごとの所属社員数を集計する（参照されない営業所は 0）
pub fn count_office_employees(
    offices: &[OfficeRecord],
    employees: &[EmployeeRecord],
) -> Vec<OfficeRecord> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for employee in employees {
        *counts.entry(employee.office.as_str()).or_insert(0) += 1;
    }

    offices
        .iter()
        .map(|office| OfficeRecord {
            employees_count: counts.get(office.name.as_str()).copied().unwrap_or(0),
            ..office.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[Vec<&str>]) -> RawMatrix {
        RawMatrix::from_text_rows(rows).unwrap()
    }

    fn sample() -> RawMatrix {
        matrix(&[
            vec!["項目", "備考", "P1", "P2", "P3"],
            vec!["社員番号", "", "101", "-", "x7"],
            vec!["氏名", "", "山田", "鈴木", "佐藤"],
            vec!["所属営業所", "", "東京", "大阪", "福岡"],
            vec!["システム開発_基幹", "", "3", "2", "0"],
            vec!["ITインフラ_クラウド_AWS", "", "2.0", "", "nan"],
            vec!["資格_基本情報技術者", "", "1", "", "0"],
            vec!["業務_キャパシティ", "", "80", "", ""],
            vec!["性格_タイプ", "", "論理型", "", ""],
            vec!["自由記述_進行中案件", "", "A|B|70|C|D;壊れ|た", "", ""],
            vec!["自由記述_性格特性", "", "協調性:4", "", "なし"],
            vec!["2タイプ診断", "", "診断\nA: 論理\n60%\nB: 感覚\n40%", "", "崩れた"],
            vec!["趣味", "", "読書、旅行", "", ""],
        ])
    }

    #[test]
    fn test_assemble_skips_placeholder_column() {
        let result = assemble_matrix(&sample(), &AssemblyOptions::default());
        assert_eq!(result.employees.len(), 2);
        assert_eq!(result.employees[0].name, "山田");
        assert_eq!(result.employees[1].name, "佐藤");
        assert_eq!(result.stats.skipped_columns, 1);
        assert_eq!(result.stats.person_columns, 3);
    }

    #[test]
    fn test_assemble_id_fallback_uses_column_index() {
        let result = assemble_matrix(&sample(), &AssemblyOptions::default());
        assert_eq!(result.employees[0].id, 101);
        // 3列目（index 2）で社員番号が数値でない
        assert_eq!(result.employees[1].id, 3);
        assert!(result.issues.iter().any(|i| i.field == IssueField::Id));
    }

    #[test]
    fn test_assemble_skill_maps() {
        let result = assemble_matrix(&sample(), &AssemblyOptions::default());
        let yamada = &result.employees[0];
        assert_eq!(yamada.skills.get("基幹"), Some(&3));
        assert_eq!(yamada.skills.get("AWS"), Some(&2));
        assert_eq!(yamada.shikaku.get("基本情報技術者"), Some(&1));
        assert!(!yamada.skills.contains_key("基本情報技術者"));

        let sato = &result.employees[1];
        assert!(sato.skills.is_empty());
        assert!(sato.shikaku.is_empty());
    }

    #[test]
    fn test_assemble_extracted_fields() {
        let result = assemble_matrix(&sample(), &AssemblyOptions::default());
        let yamada = &result.employees[0];
        assert_eq!(yamada.business_capacity, 80);
        assert_eq!(yamada.personality_type, "論理型");
        assert_eq!(yamada.ongoing_projects.len(), 1);
        assert_eq!(yamada.personality_traits.get("協調性"), Some(&4));
        let ratio = yamada.two_type_ratio.as_ref().unwrap();
        assert_eq!(ratio["論理"], 60);
        assert_eq!(ratio["感覚"], 40);
        assert_eq!(yamada.personal_info.hobbies, vec!["読書", "旅行"]);

        assert_eq!(result.stats.rejected_project_items, 1);
        assert_eq!(result.stats.malformed_ratio_blocks, 1);
        assert!(result.employees[1].two_type_ratio.is_none());
    }

    #[test]
    fn test_rich_mode_leaves_missing_empty() {
        let result = assemble_matrix(&sample(), &AssemblyOptions::default());
        let sato = &result.employees[1];
        assert_eq!(sato.office, "福岡");
        assert_eq!(sato.personal_info.age, "");
        assert_eq!(sato.personal_info.gender, "");
    }

    #[test]
    fn test_legacy_mode_defaults() {
        let options = AssemblyOptions {
            mode: AssemblyMode::Legacy,
            known_offices: vec!["東京".into(), "大阪".into(), "沖縄".into()],
            ..Default::default()
        };
        let result = assemble_matrix(&sample(), &options);
        let sato = &result.employees[1];
        assert_eq!(sato.office, "東京");
        assert_eq!(sato.personal_info.age, "30代");
        assert_eq!(sato.personal_info.work_style, "テレワーク");
    }

    #[test]
    fn test_legacy_name_default() {
        let m = matrix(&[
            vec!["項目", "備考", "P1"],
            vec!["社員番号", "", "205"],
            vec!["氏名", "", ""],
        ]);
        let options = AssemblyOptions {
            mode: AssemblyMode::Legacy,
            ..Default::default()
        };
        let result = assemble_matrix(&m, &options);
        assert_eq!(result.employees[0].name, "社員205");
    }

    #[test]
    fn test_zero_skills_not_reintroduced_after_json() {
        let result = assemble_matrix(&sample(), &AssemblyOptions::default());
        let json = serde_json::to_string(&result.employees).unwrap();
        let parsed: Vec<EmployeeRecord> = serde_json::from_str(&json).unwrap();
        for employee in &parsed {
            assert!(employee.skills.values().all(|&v| v > 0));
            assert!(employee.shikaku.values().all(|&v| v > 0));
        }
        assert_eq!(parsed, result.employees);
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let m = sample();
        let a = serde_json::to_string(&assemble_matrix(&m, &AssemblyOptions::default()).employees).unwrap();
        let b = serde_json::to_string(&assemble_matrix(&m, &AssemblyOptions::default()).employees).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_name_row_as_identity_when_no_id_row() {
        let m = matrix(&[
            vec!["項目", "備考", "P1", "P2"],
            vec!["氏名", "", "", "高橋"],
        ]);
        let result = assemble_matrix(&m, &AssemblyOptions::default());
        assert_eq!(result.employees.len(), 1);
        assert_eq!(result.employees[0].id, 2);
    }

    #[test]
    fn test_count_office_employees() {
        let employees: Vec<EmployeeRecord> = ["A", "A", "B"]
            .iter()
            .enumerate()
            .map(|(i, office)| EmployeeRecord {
                id: i as u64 + 1,
                office: office.to_string(),
                ..Default::default()
            })
            .collect();
        let offices = vec![
            OfficeRecord::new(1, "A", "a"),
            OfficeRecord::new(2, "B", "b"),
            OfficeRecord::new(3, "C", "c"),
        ];

        let counted = count_office_employees(&offices, &employees);
        let counts: Vec<usize> = counted.iter().map(|o| o.employees_count).collect();
        assert_eq!(counts, vec![2, 1, 0]);

        // 社員が変われば再集計で変わる
        let counted = count_office_employees(&counted, &employees[..1]);
        let counts: Vec<usize> = counted.iter().map(|o| o.employees_count).collect();
        assert_eq!(counts, vec![1, 0, 0]);
    }

    #[test]
    fn test_classification_from_other_matrix_is_ignored() {
        let m = RawMatrix::from_text_rows(&[
            vec!["項目", "備考", "P1"],
            vec!["社員番号", "", "5"],
            vec!["Web_React", "", "3"],
        ])
        .unwrap();
        // 別のマトリクスで作った分類（行番号が範囲外）
        let classification = RowClassification {
            skill_rows: vec![1, 40],
            certification_rows: vec![41],
            metadata_rows: vec![0, 42],
        };

        let result = assemble(&m, &classification, &AssemblyOptions::default());
        assert_eq!(result.employees.len(), 1);
        assert_eq!(result.employees[0].id, 5);
        assert_eq!(result.employees[0].skills["React"], 3);
        assert!(result.employees[0].shikaku.is_empty());
    }
}
