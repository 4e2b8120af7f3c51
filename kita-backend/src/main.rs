// src/main.rs

use kita_backend::config::AppConfig;
use kita_backend::db::create_db_pool;
use kita_backend::service::audit_log_service::AuditLogService;
use kita_backend::service::deletion_service::DeletionService;
use kita_backend::service::retention_service::RetentionService;
use kita_backend::utils::clock::SystemClock;
use migration::{Migrator, MigratorTrait};
use std::sync::Arc;
use std::time::Duration;

/// 保持期間スイープの実行間隔（秒）。既定は1時間。
const DEFAULT_CLEANUP_INTERVAL_SECS: u64 = 3600;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    kita_backend::logging::init();

    tracing::info!("Starting kita-backend lifecycle worker...");

    let config = AppConfig::from_env()?;
    let db = create_db_pool(&config).await?;
    tracing::info!("Database pool created successfully.");

    Migrator::up(&db, None).await?;
    tracing::info!("Migrations applied.");

    let clock = Arc::new(SystemClock);
    let audit = Arc::new(AuditLogService::new(db.clone()));
    let deletion = Arc::new(DeletionService::new(
        db.clone(),
        clock.clone(),
        config.retention.clone(),
        audit.clone(),
    ));
    let retention = Arc::new(RetentionService::new(deletion, audit, clock));

    let interval = std::env::var("CLEANUP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_CLEANUP_INTERVAL_SECS);
    tracing::info!(interval_secs = interval, "Retention scheduler starting");

    let handle = retention.spawn(Duration::from_secs(interval));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping scheduler.");
    handle.abort();

    Ok(())
}
