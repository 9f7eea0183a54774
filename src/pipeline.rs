//! 変換パイプライン
//!
//! 1回の実行 = 入力ファイル1つの読み込み → 行分類 → 組み立て → 集計。
//! 共有する可変状態はなく、毎回新しい結果を作って返す。
//! キャッシュへの書き出しは成功後の副作用で、失敗しても結果は返す。

use crate::cache::{compute_file_hash, CacheMeta, JsonCacheDir, OutputPort};
use crate::config::Config;
use crate::error::Result;
use crate::loader;
use skill_matrix_common::category::{from_classification, from_listing};
use skill_matrix_common::{
    assemble, classify_rows, count_office_employees, AssemblyIssue, AssemblyStats,
    EmployeeRecord, OfficeRecord, RawMatrix, SkillCategoryTree,
};
use std::path::Path;

/// 変換結果一式
#[derive(Debug, Clone, Default)]
pub struct BuildOutput {
    pub employees: Vec<EmployeeRecord>,
    pub skills: SkillCategoryTree,
    pub offices: Vec<OfficeRecord>,
    pub stats: AssemblyStats,
    pub issues: Vec<AssemblyIssue>,
}

/// マトリクスを変換する（ファイル入出力なし）
pub fn transform(matrix: &RawMatrix, config: &Config) -> BuildOutput {
    let options = config.assembly_options();
    let classification = classify_rows(matrix.labels(), &options.rules);
    let assembled = assemble(matrix, &classification, &options);
    let skills = from_classification(
        matrix,
        &classification,
        &options.rules.separator,
        &config.top_skills,
    );
    let offices = count_office_employees(&config.offices, &assembled.employees);

    BuildOutput {
        employees: assembled.employees,
        skills,
        offices,
        stats: assembled.stats,
        issues: assembled.issues,
    }
}

/// 書き出し結果をログに残し、成功したかを返す
fn report(file: &str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(file, error = %e, "キャッシュの書き込みに失敗しました");
            false
        }
    }
}

/// 変換結果を出力先に書き出す（失敗はログのみ）
pub fn publish(port: &dyn OutputPort, output: &BuildOutput, meta: Option<&CacheMeta>) -> bool {
    let mut ok = report("employees", port.publish_employees(&output.employees));
    ok &= report("skills", port.publish_skills(&output.skills));
    ok &= report("offices", port.publish_offices(&output.offices));
    if let Some(meta) = meta {
        ok &= report("meta", port.publish_meta(meta));
    }
    ok
}

/// 入力ファイルを変換して書き出す
pub fn run_build(source: &Path, config: &Config, port: &dyn OutputPort) -> Result<BuildOutput> {
    let matrix = loader::load_matrix(source, config.sheet.as_deref())?;
    let output = transform(&matrix, config);

    let meta = match (compute_file_hash(source), config.fingerprint()) {
        (Ok(source_hash), Ok(config_hash)) => Some(CacheMeta::new(
            source,
            source_hash,
            config_hash,
            output.employees.len(),
        )),
        (Err(e), _) | (_, Err(e)) => {
            tracing::warn!(error = %e, "指紋の計算に失敗しました");
            None
        }
    };
    publish(port, &output, meta.as_ref());
    Ok(output)
}

/// スキル分類だけを作って書き出す
///
/// `listing` なら2列一覧、そうでなければマトリクスのスキル行から作る。
pub fn run_skills(
    source: &Path,
    listing: bool,
    config: &Config,
    port: &dyn OutputPort,
) -> Result<SkillCategoryTree> {
    let tree = if listing {
        let rows = loader::load_listing(source, config.sheet.as_deref())?;
        from_listing(&rows, &config.top_skills)
    } else {
        let matrix = loader::load_matrix(source, config.sheet.as_deref())?;
        let classification = classify_rows(matrix.labels(), &config.classifier);
        from_classification(
            &matrix,
            &classification,
            &config.classifier.separator,
            &config.top_skills,
        )
    };
    report("skills", port.publish_skills(&tree));
    Ok(tree)
}

/// データの出どころ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataOrigin {
    /// 今回変換した
    Fresh,
    /// 既存キャッシュ
    Cache,
    /// どちらも無い
    Empty,
}

impl std::fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataOrigin::Fresh => write!(f, "変換結果"),
            DataOrigin::Cache => write!(f, "キャッシュ"),
            DataOrigin::Empty => write!(f, "データなし"),
        }
    }
}

/// 問い合わせ用のスナップショット
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub employees: Vec<EmployeeRecord>,
    pub skills: SkillCategoryTree,
    pub offices: Vec<OfficeRecord>,
    pub origin: DataOrigin,
}

impl Snapshot {
    fn from_output(output: BuildOutput) -> Self {
        Self {
            employees: output.employees,
            skills: output.skills,
            offices: output.offices,
            origin: DataOrigin::Fresh,
        }
    }

    fn from_cache(cache: &JsonCacheDir, config: &Config) -> Self {
        match cache.load_employees() {
            Some(employees) => {
                let offices = cache.load_offices().unwrap_or_else(|| config.offices.clone());
                Self {
                    offices: count_office_employees(&offices, &employees),
                    skills: cache.load_skills().unwrap_or_default(),
                    employees,
                    origin: DataOrigin::Cache,
                }
            }
            None => Self {
                employees: Vec::new(),
                skills: SkillCategoryTree::default(),
                offices: count_office_employees(&config.offices, &[]),
                origin: DataOrigin::Empty,
            },
        }
    }
}

/// キャッシュの指紋が入力ファイル・設定の両方と一致するか
pub fn cache_is_fresh(source: &Path, config: &Config, cache: &JsonCacheDir) -> bool {
    let Some(meta) = cache.load_meta() else {
        return false;
    };
    match (compute_file_hash(source), config.fingerprint()) {
        (Ok(source_hash), Ok(config_hash)) => {
            source_hash == meta.source_sha256 && config_hash == meta.config_sha256
        }
        _ => false,
    }
}

/// スナップショットを取得する
///
/// 入力ファイルがあれば変換（`reuse_cache` かつ指紋一致ならキャッシュを再利用）、
/// 変換できなければキャッシュ、キャッシュも無ければ空を返す。
pub fn load_snapshot(
    source: Option<&Path>,
    config: &Config,
    cache: &JsonCacheDir,
    reuse_cache: bool,
) -> Snapshot {
    if let Some(source) = source {
        if reuse_cache && cache_is_fresh(source, config, cache) {
            let snapshot = Snapshot::from_cache(cache, config);
            if snapshot.origin == DataOrigin::Cache {
                tracing::info!(path = %source.display(), "入力に変更がないためキャッシュを使用");
                return snapshot;
            }
        }

        match run_build(source, config, cache) {
            Ok(output) => return Snapshot::from_output(output),
            Err(e) => {
                tracing::warn!(path = %source.display(), error = %e, "変換に失敗したためキャッシュを使用します");
            }
        }
    }

    let snapshot = Snapshot::from_cache(cache, config);
    if snapshot.origin == DataOrigin::Empty {
        tracing::warn!(dir = %cache.dir().display(), "キャッシュがありません");
    }
    snapshot
}
