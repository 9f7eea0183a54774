//! セル内テキストからの構造抽出
//!
//! 1セルに詰め込まれた区切り文字列を構造化する。どの関数も任意の入力で
//! 失敗せず、形式が合わない部分は黙って捨てる。
//!
//! - 進行中案件: `案件名|役割|進捗|フェーズ|期限;...`（顧客名入りの6項目形式も可）
//! - 性格特性: `名前:点数;...`
//! - 2タイプ診断: 固定テンプレートの複数行テキスト

use crate::cell::{fold_fullwidth_digits, parse_int_text, trim_cell};
use crate::types::{ProjectRecord, TraitMap, TwoTypeRatio};
use regex::Regex;

/// 顧客名なしの案件項目数
pub const PROJECT_FIELDS: usize = 5;
/// 顧客名ありの案件項目数
pub const PROJECT_FIELDS_WITH_CLIENT: usize = 6;

/// 案件リストの解析結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectParse {
    pub projects: Vec<ProjectRecord>,
    /// 捨てた項目数（空項目は数えない）
    pub rejected: usize,
}

/// 進捗率を 0..=100 の整数に（"70", "70%", "７０％"）
fn parse_progress(text: &str) -> Option<u8> {
    let text = trim_cell(text);
    let text = text
        .strip_suffix('%')
        .or_else(|| text.strip_suffix('％'))
        .unwrap_or(text);
    parse_int_text(text).map(|p| p.clamp(0, 100) as u8)
}

fn parse_project(item: &str) -> Option<ProjectRecord> {
    let fields: Vec<&str> = item.split('|').map(trim_cell).collect();
    let (name, role, client, progress, phase, deadline) = match fields.len() {
        PROJECT_FIELDS => (fields[0], fields[1], None, fields[2], fields[3], fields[4]),
        PROJECT_FIELDS_WITH_CLIENT => (
            fields[0],
            fields[1],
            Some(fields[2]),
            fields[3],
            fields[4],
            fields[5],
        ),
        _ => return None,
    };

    Some(ProjectRecord {
        name: name.to_string(),
        role: role.to_string(),
        client: client.filter(|c| !c.is_empty()).map(str::to_string),
        progress: parse_progress(progress)?,
        phase: phase.to_string(),
        deadline: deadline.to_string(),
    })
}

/// 進行中案件リストを解析し、捨てた件数も返す
pub fn parse_projects_detailed(text: &str) -> ProjectParse {
    let mut result = ProjectParse::default();
    for item in text.split(';').map(trim_cell).filter(|s| !s.is_empty()) {
        match parse_project(item) {
            Some(project) => result.projects.push(project),
            None => result.rejected += 1,
        }
    }
    result
}

/// 進行中案件リストを解析
pub fn parse_projects(text: &str) -> Vec<ProjectRecord> {
    parse_projects_detailed(text).projects
}

/// 性格特性マップを解析（`名前:点数` 以外の項目は捨てる）
pub fn parse_traits(text: &str) -> TraitMap {
    text.split(';')
        .filter_map(|item| {
            let (name, value) = item.split_once([':', '：'])?;
            let name = trim_cell(name);
            if name.is_empty() {
                return None;
            }
            let value = parse_int_text(value)?;
            Some((name.to_string(), value))
        })
        .collect()
}

/// 2タイプ診断の行位置（空行を除いた後の添字）
const RATIO_NAME_LINES: [usize; 2] = [1, 3];
const RATIO_PERCENT_LINES: [usize; 2] = [2, 4];

fn parse_percent(line: &str) -> Option<i64> {
    lazy_static::lazy_static! {
        static ref PERCENT_RE: Regex = Regex::new(r"(\d+(?:\.\d+)?)\s*[%％]?").unwrap();
    }

    let folded = fold_fullwidth_digits(line);
    let cap = PERCENT_RE.captures(&folded)?;
    parse_int_text(&cap[1])
}

fn ratio_name(line: &str) -> &str {
    let name = match line.rfind([':', '：']) {
        Some(pos) => {
            let delimiter_len = line[pos..].chars().next().map_or(1, char::len_utf8);
            &line[pos + delimiter_len..]
        }
        None => line,
    };
    trim_cell(name)
}

/// 2タイプ診断ブロックを解析
///
/// 想定テンプレート（空行は無視）:
/// ```text
/// 2タイプ診断
/// タイプA: 論理型
/// 60%
/// タイプB: 感覚型
/// 40%
/// ```
/// 行数や割合が合わなければ空のマップを返す。
pub fn parse_two_type_ratio(text: &str) -> TwoTypeRatio {
    let lines: Vec<&str> = text
        .lines()
        .map(trim_cell)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.len() <= RATIO_PERCENT_LINES[1] {
        return TwoTypeRatio::new();
    }

    let mut ratio = TwoTypeRatio::new();
    for (name_line, percent_line) in RATIO_NAME_LINES.iter().zip(RATIO_PERCENT_LINES.iter()) {
        let name = ratio_name(lines[*name_line]);
        let Some(percent) = parse_percent(lines[*percent_line]) else {
            return TwoTypeRatio::new();
        };
        if name.is_empty() {
            return TwoTypeRatio::new();
        }
        ratio.insert(name.to_string(), percent);
    }

    // 同名2つは1件に潰れるのでテンプレート違反とみなす
    if ratio.len() != RATIO_NAME_LINES.len() {
        return TwoTypeRatio::new();
    }
    ratio
}

/// 趣味・言語などの列挙を分割
///
/// 区切りは `、` `,` `，` `;` と改行のみ。`C/C++` や `組込・制御` のように
/// 値の中に現れる `/` `・` では分割しない。
pub fn parse_list(text: &str) -> Vec<String> {
    text.split(['、', ',', '，', '\n', ';'])
        .map(trim_cell)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
