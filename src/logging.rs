use tracing_subscriber::{fmt, EnvFilter};

/// ログ出力を初期化（`RUST_LOG` があればそちらを優先）
///
/// 標準出力は JSON 出力に使うので、ログは標準エラーに出す。
pub fn init(verbose: bool) {
    let filter = if verbose {
        "skill_matrix_rust=debug,skill_matrix_common=debug"
    } else {
        "skill_matrix_rust=info,skill_matrix_common=info"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // テストなどで二重に初期化されても無視する
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
