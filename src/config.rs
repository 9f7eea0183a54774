use crate::error::{Result, SkillMatrixError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use skill_matrix_common::{
    default_offices, AssemblyMode, AssemblyOptions, ClassifierRules, LegacyDefaults,
    MetadataLabels, OfficeRecord, TopSkillPolicy,
};
use std::path::PathBuf;

/// キャッシュ出力先の既定値（ダッシュボードが読む場所）
const DEFAULT_DATA_DIR: &str = "static/data";
const DATA_DIR_ENV: &str = "SKILL_MATRIX_DATA_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mode: AssemblyMode,
    /// 読み込むシート名（省略時は先頭シート）
    pub sheet: Option<String>,
    pub data_dir: PathBuf,
    pub labels: MetadataLabels,
    pub classifier: ClassifierRules,
    pub legacy_defaults: LegacyDefaults,
    pub top_skills: TopSkillPolicy,
    pub offices: Vec<OfficeRecord>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: AssemblyMode::default(),
            sheet: None,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            labels: MetadataLabels::default(),
            classifier: ClassifierRules::default(),
            legacy_defaults: LegacyDefaults::default(),
            top_skills: TopSkillPolicy::default(),
            offices: default_offices(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "設定を読み込みました");
            config
        } else {
            Self::default()
        };

        // 環境変数を優先
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.data_dir = PathBuf::from(dir);
            }
        }

        config.classifier.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SkillMatrixError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("skill-matrix").join("config.json"))
    }

    /// 組み立てオプションに変換
    pub fn assembly_options(&self) -> AssemblyOptions {
        AssemblyOptions {
            mode: self.mode,
            labels: self.labels.clone(),
            rules: self.classifier.clone(),
            legacy_defaults: self.legacy_defaults.clone(),
            known_offices: self.offices.iter().map(|o| o.name.clone()).collect(),
        }
    }

    /// 変換結果に影響する設定のSHA-256（出力先 `data_dir` は含めない）
    pub fn fingerprint(&self) -> Result<String> {
        let mut relevant = self.clone();
        relevant.data_dir = PathBuf::new();
        let bytes = serde_json::to_vec(&relevant)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }

    pub fn set_top_skills(&mut self, skills: &str) -> Result<PathBuf> {
        self.top_skills.allow_list = skills
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self.save()
    }
}
