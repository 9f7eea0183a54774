//! JSONキャッシュ（出力ポート）
//!
//! 変換結果をダッシュボードが読む JSON ファイルとして書き出す。
//! キャッシュは派生物なので、書き込み失敗は呼び出し側でログに残すだけでよい。
//! 同時実行時は後勝ち（ロックなし）。

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use skill_matrix_common::{EmployeeRecord, OfficeRecord, SkillCategoryTree};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

pub const EMPLOYEES_FILE: &str = "employees.json";
pub const SKILLS_FILE: &str = "skills.json";
pub const OFFICES_FILE: &str = "offices.json";
pub const META_FILE: &str = ".cache-meta.json";

/// 変換結果の書き出し先
pub trait OutputPort {
    fn publish_employees(&self, employees: &[EmployeeRecord]) -> Result<()>;
    fn publish_skills(&self, tree: &SkillCategoryTree) -> Result<()>;
    fn publish_offices(&self, offices: &[OfficeRecord]) -> Result<()>;
    fn publish_meta(&self, meta: &CacheMeta) -> Result<()>;
}

/// 何も書き出さない出力先
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPort;

impl OutputPort for NullPort {
    fn publish_employees(&self, _: &[EmployeeRecord]) -> Result<()> {
        Ok(())
    }

    fn publish_skills(&self, _: &SkillCategoryTree) -> Result<()> {
        Ok(())
    }

    fn publish_offices(&self, _: &[OfficeRecord]) -> Result<()> {
        Ok(())
    }

    fn publish_meta(&self, _: &CacheMeta) -> Result<()> {
        Ok(())
    }
}

/// 入力ファイルと設定の指紋
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMeta {
    /// バージョン（互換性チェック用）
    pub version: u32,
    pub source_file: String,
    pub source_sha256: String,
    /// 変換結果に影響する設定のハッシュ
    pub config_sha256: String,
    pub employees: usize,
}

impl CacheMeta {
    pub const CURRENT_VERSION: u32 = 2;

    pub fn new(
        source: &Path,
        source_sha256: String,
        config_sha256: String,
        employees: usize,
    ) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            source_file: source
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            source_sha256,
            config_sha256,
            employees,
        }
    }
}

/// JSONキャッシュディレクトリ
#[derive(Debug, Clone)]
pub struct JsonCacheDir {
    dir: PathBuf,
}

impl JsonCacheDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn write_json<T: Serialize + ?Sized>(&self, file: &str, value: &T) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        // 非ASCIIはそのまま、末尾改行付きで同じ入力なら同じバイト列になる
        let mut content = serde_json::to_string_pretty(value)?;
        content.push('\n');
        let path = self.path(file);
        std::fs::write(&path, content)?;
        tracing::debug!(path = %path.display(), "キャッシュを書き込みました");
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, file: &str) -> Option<T> {
        let path = self.path(file);
        if !path.exists() {
            return None;
        }
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "キャッシュを開けません");
                return None;
            }
        };
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "キャッシュが破損しています");
                None
            }
        }
    }

    pub fn load_employees(&self) -> Option<Vec<EmployeeRecord>> {
        self.read_json(EMPLOYEES_FILE)
    }

    pub fn load_skills(&self) -> Option<SkillCategoryTree> {
        self.read_json(SKILLS_FILE)
    }

    pub fn load_offices(&self) -> Option<Vec<OfficeRecord>> {
        self.read_json(OFFICES_FILE)
    }

    /// メタ情報を読む（バージョン不一致は無いものとする）
    pub fn load_meta(&self) -> Option<CacheMeta> {
        let meta: CacheMeta = self.read_json(META_FILE)?;
        if meta.version != CacheMeta::CURRENT_VERSION {
            tracing::info!(version = meta.version, "キャッシュバージョン不一致、再生成します");
            return None;
        }
        Some(meta)
    }

    /// キャッシュファイルを削除し、削除した件数を返す
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        for file in [EMPLOYEES_FILE, SKILLS_FILE, OFFICES_FILE, META_FILE] {
            let path = self.path(file);
            if path.exists() {
                std::fs::remove_file(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

impl OutputPort for JsonCacheDir {
    fn publish_employees(&self, employees: &[EmployeeRecord]) -> Result<()> {
        self.write_json(EMPLOYEES_FILE, employees)
    }

    fn publish_skills(&self, tree: &SkillCategoryTree) -> Result<()> {
        self.write_json(SKILLS_FILE, tree)
    }

    fn publish_offices(&self, offices: &[OfficeRecord]) -> Result<()> {
        self.write_json(OFFICES_FILE, offices)
    }

    fn publish_meta(&self, meta: &CacheMeta) -> Result<()> {
        self.write_json(META_FILE, meta)
    }
}

/// 入力ファイルのSHA-256を計算
pub fn compute_file_hash(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
