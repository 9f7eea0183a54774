use clap::Parser;
use skill_matrix_common::query::{filter_employees, find_by_id};
use skill_matrix_common::count_office_employees;
use skill_matrix_rust::{cache, cli, config, error, logging, pipeline};
use cache::{JsonCacheDir, OutputPort};
use cli::{Cli, Commands, QueryTarget};
use config::Config;
use error::{Result, SkillMatrixError};
use std::path::PathBuf;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("エラー: {}", e);
        std::process::exit(1);
    }
}

fn data_dir(arg: Option<PathBuf>, config: &Config) -> PathBuf {
    arg.unwrap_or_else(|| config.data_dir.clone())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;

    match cli.command {
        Commands::Build { source, output, mode, sheet, use_cache } => {
            println!("📊 skill-matrix - 変換\n");

            if let Some(mode) = mode {
                config.mode = mode;
            }
            if sheet.is_some() {
                config.sheet = sheet;
            }
            let target = JsonCacheDir::new(data_dir(output, &config));

            if use_cache && pipeline::cache_is_fresh(&source, &config, &target) {
                println!("✔ 入力に変更がないためキャッシュを再利用: {}", target.dir().display());
                return Ok(());
            }

            // 1. 読み込み・変換
            println!("[1/2] マトリクスを変換中... (モード: {})", config.mode);
            let output = pipeline::run_build(&source, &config, &target)?;
            println!(
                "✔ {}名を変換（除外 {}列 / 形式違反 {}件）\n",
                output.stats.employees,
                output.stats.skipped_columns,
                output.issues.len()
            );

            // 2. 結果
            println!("[2/2] 結果");
            println!("  スキルカテゴリ: {}", output.skills.categories.len());
            println!("  主要スキル: {}", output.skills.top_skills.len());
            for office in &output.offices {
                println!("  {}: {}名", office.name, office.employees_count);
            }
            println!("✔ 出力先: {}", target.dir().display());

            println!("\n✅ 変換完了");
        }

        Commands::Skills { source, listing, output, sheet, top_n } => {
            println!("🗂 skill-matrix - スキル分類\n");

            if sheet.is_some() {
                config.sheet = sheet;
            }
            if let Some(n) = top_n {
                config.top_skills.allow_list.clear();
                config.top_skills.top_n = n;
            }
            let target = JsonCacheDir::new(data_dir(output, &config));

            let tree = pipeline::run_skills(&source, listing, &config, &target)?;
            for category in &tree.categories {
                println!("  {} ({}件)", category.name, category.skills.len());
            }
            let top: Vec<&str> = tree.top_skills.iter().map(|s| s.name.as_str()).collect();
            println!("  主要スキル: {}", top.join(", "));
            println!("✔ 出力先: {}", target.path(cache::SKILLS_FILE).display());
        }

        Commands::Offices { data_dir: dir } => {
            let target = JsonCacheDir::new(data_dir(dir, &config));
            let employees = target
                .load_employees()
                .ok_or_else(|| SkillMatrixError::CacheMissing(target.path(cache::EMPLOYEES_FILE).display().to_string()))?;
            let offices = target.load_offices().unwrap_or_else(|| config.offices.clone());

            let offices = count_office_employees(&offices, &employees);
            target.publish_offices(&offices)?;
            for office in &offices {
                println!("  {}: {}名", office.name, office.employees_count);
            }
            println!("✔ 営業所を再集計しました: {}", target.path(cache::OFFICES_FILE).display());
        }

        Commands::Query { target, source, data_dir: dir, office, skill, id, use_cache } => {
            let cache_dir = JsonCacheDir::new(data_dir(dir, &config));
            let snapshot = pipeline::load_snapshot(source.as_deref(), &config, &cache_dir, use_cache);
            tracing::info!(origin = %snapshot.origin, employees = snapshot.employees.len(), "データを取得");

            match target {
                QueryTarget::Employees => {
                    if let Some(id) = id {
                        let employee = find_by_id(&snapshot.employees, id)
                            .ok_or(SkillMatrixError::EmployeeNotFound(id))?;
                        print_json(employee)?;
                    } else {
                        let filtered = filter_employees(&snapshot.employees, office.as_deref(), skill.as_deref());
                        print_json(&filtered)?;
                    }
                }
                QueryTarget::Skills => print_json(&snapshot.skills)?,
                QueryTarget::Offices => print_json(&snapshot.offices)?,
            }
        }

        Commands::Cache { clear, dir, info } => {
            let target = JsonCacheDir::new(data_dir(dir, &config));

            if info || !clear {
                // デフォルトまたは--info: 情報表示
                println!("キャッシュ情報:");
                println!("  ディレクトリ: {}", target.dir().display());
                for file in [cache::EMPLOYEES_FILE, cache::SKILLS_FILE, cache::OFFICES_FILE] {
                    let path = target.path(file);
                    match std::fs::metadata(&path) {
                        Ok(meta) => {
                            let modified = meta
                                .modified()
                                .map(|t| chrono::DateTime::<chrono::Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string())
                                .unwrap_or_else(|_| "不明".into());
                            println!("  {}: {} bytes（更新 {}）", file, meta.len(), modified);
                        }
                        Err(_) => println!("  {}: なし", file),
                    }
                }
                match target.load_meta() {
                    Some(meta) => {
                        println!("  入力: {}", meta.source_file);
                        println!("  SHA-256: {}", meta.source_sha256);
                println!("  設定SHA-256: {}", meta.config_sha256);
                        println!("  件数: {}", meta.employees);
                    }
                    None => println!("  メタ情報: なし"),
                }
            }

            if clear {
                match target.clear() {
                    Ok(0) => println!("キャッシュファイルが存在しません"),
                    Ok(n) => println!("✔ キャッシュを削除しました: {}件", n),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }

        Commands::Config { set_top_skills, init, show } => {
            if init {
                let path = config.save()?;
                println!("✔ 設定ファイルを作成しました: {}", path.display());
            }

            if let Some(skills) = set_top_skills {
                config.set_top_skills(&skills)?;
                println!("✔ 主要スキルを設定しました");
            }

            if show {
                println!("設定:");
                println!("  パス: {}", Config::config_path()?.display());
                println!("  モード: {}", config.mode);
                println!("  データディレクトリ: {}", config.data_dir.display());
                println!("  シート: {}", config.sheet.as_deref().unwrap_or("（先頭シート）"));
                println!("  区切り文字: {}", config.classifier.separator);
                println!("  分類規則: {}件", config.classifier.rules.len());
                println!("  主要スキル: {}", config.top_skills.allow_list.join(", "));
                println!("  主要スキル件数（許可リストなし時）: {}", config.top_skills.top_n);
                let offices: Vec<&str> = config.offices.iter().map(|o| o.name.as_str()).collect();
                println!("  営業所: {}", offices.join(", "));
            }
        }
    }

    Ok(())
}
