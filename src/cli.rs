use clap::{Parser, Subcommand};
use skill_matrix_common::AssemblyMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "skill-matrix")]
#[command(about = "自己紹介マトリクスを社員・スキル・営業所JSONに変換するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// マトリクスを変換して employees/skills/offices のJSONを出力
    Build {
        /// 自己紹介マトリクス（csv/xlsx など）
        #[arg(required = true)]
        source: PathBuf,

        /// 出力ディレクトリ（デフォルト: 設定の data_dir）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 組み立てモード (legacy/rich)
        #[arg(short, long)]
        mode: Option<AssemblyMode>,

        /// 読み込むシート名
        #[arg(long)]
        sheet: Option<String>,

        /// 入力に変更がなければキャッシュを再利用
        #[arg(long)]
        use_cache: bool,
    },

    /// スキル分類（skills.json）だけを出力
    Skills {
        /// 入力ファイル
        #[arg(required = true)]
        source: PathBuf,

        /// 入力が2列の一覧（カテゴリ, スキル）
        #[arg(short, long)]
        listing: bool,

        /// 出力ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 読み込むシート名
        #[arg(long)]
        sheet: Option<String>,

        /// 主要スキルの件数（指定すると許可リストを使わない）
        #[arg(long)]
        top_n: Option<usize>,
    },

    /// キャッシュ済み社員データから営業所の人数を再集計
    Offices {
        /// データディレクトリ
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },

    /// 社員・スキル・営業所を検索してJSONで表示
    Query {
        /// 対象 (employees/skills/offices)
        #[arg(default_value = "employees")]
        target: QueryTarget,

        /// 再変換する入力ファイル（省略時はキャッシュのみ）
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// データディレクトリ
        #[arg(short, long)]
        data_dir: Option<PathBuf>,

        /// 営業所名で絞り込み（all で全件）
        #[arg(long)]
        office: Option<String>,

        /// スキル名で絞り込み（all で全件）
        #[arg(long)]
        skill: Option<String>,

        /// 社員IDで1件取得
        #[arg(long)]
        id: Option<u64>,

        /// 入力に変更がなければキャッシュを再利用
        #[arg(long)]
        use_cache: bool,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象ディレクトリ（省略時は設定の data_dir）
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },

    /// 設定を表示/編集
    Config {
        /// 主要スキルの許可リストを設定（カンマ区切り）
        #[arg(long)]
        set_top_skills: Option<String>,

        /// 既定値で設定ファイルを作成
        #[arg(long)]
        init: bool,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 検索対象
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueryTarget {
    #[default]
    Employees,
    Skills,
    Offices,
}

impl std::str::FromStr for QueryTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "employees" | "employee" | "e" => Ok(QueryTarget::Employees),
            "skills" | "skill" | "s" => Ok(QueryTarget::Skills),
            "offices" | "office" | "o" => Ok(QueryTarget::Offices),
            _ => Err(format!("Unknown target: {}. Use employees, skills, or offices", s)),
        }
    }
}

impl std::fmt::Display for QueryTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryTarget::Employees => write!(f, "employees"),
            QueryTarget::Skills => write!(f, "skills"),
            QueryTarget::Offices => write!(f, "offices"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_command() {
        let cli = Cli::parse_from(["skill-matrix", "build", "matrix.csv", "--mode", "legacy", "-v"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Build { source, mode, use_cache, .. } => {
                assert_eq!(source, PathBuf::from("matrix.csv"));
                assert_eq!(mode, Some(AssemblyMode::Legacy));
                assert!(!use_cache);
            }
            _ => panic!("build として解釈されませんでした"),
        }
    }

    #[test]
    fn test_parse_query_defaults() {
        let cli = Cli::parse_from(["skill-matrix", "query", "--office", "東京"]);
        match cli.command {
            Commands::Query { target, office, id, .. } => {
                assert_eq!(target, QueryTarget::Employees);
                assert_eq!(office.as_deref(), Some("東京"));
                assert!(id.is_none());
            }
            _ => panic!("query として解釈されませんでした"),
        }
    }

    #[test]
    fn test_query_target_from_str() {
        assert_eq!("Skills".parse::<QueryTarget>().unwrap(), QueryTarget::Skills);
        assert!("people".parse::<QueryTarget>().is_err());
    }
}
