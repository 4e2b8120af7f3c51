// src/logging.rs

use tracing_subscriber::EnvFilter;

/// tracing サブスクライバを初期化する。
/// RUST_LOG が未設定の場合は kita_backend=info をデフォルトにする。
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kita_backend=info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
