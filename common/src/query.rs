//! 読み取り専用の絞り込み
//!
//! ダッシュボードのAPIが行う検索と同じ条件:
//! - 営業所名の完全一致
//! - スキルマップにそのスキル名があるか
//! - ID指定の1件取得
//!
//! `None` と `"all"` は絞り込みなしとして扱う。

use crate::types::EmployeeRecord;

const ALL: &str = "all";

fn is_unfiltered(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => v.is_empty() || v == ALL,
    }
}

/// 営業所で絞り込み
pub fn filter_by_office<'a>(
    employees: &'a [EmployeeRecord],
    office: Option<&str>,
) -> Vec<&'a EmployeeRecord> {
    if is_unfiltered(office) {
        return employees.iter().collect();
    }
    employees
        .iter()
        .filter(|e| Some(e.office.as_str()) == office)
        .collect()
}

/// スキル保有者で絞り込み
pub fn filter_by_skill<'a>(
    employees: &'a [EmployeeRecord],
    skill: Option<&str>,
) -> Vec<&'a EmployeeRecord> {
    match skill {
        Some(name) if !is_unfiltered(skill) => {
            employees.iter().filter(|e| e.has_skill(name)).collect()
        }
        _ => employees.iter().collect(),
    }
}

/// 営業所・スキルの両方で絞り込み
pub fn filter_employees<'a>(
    employees: &'a [EmployeeRecord],
    office: Option<&str>,
    skill: Option<&str>,
) -> Vec<&'a EmployeeRecord> {
    filter_by_office(employees, office)
        .into_iter()
        .filter(|e| is_unfiltered(skill) || skill.is_some_and(|s| e.has_skill(s)))
        .collect()
}

/// IDで1件取得
pub fn find_by_id(employees: &[EmployeeRecord], id: u64) -> Option<&EmployeeRecord> {
    employees.iter().find(|e| e.id == id)
}
