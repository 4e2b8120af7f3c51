// src/service/audit_log_service.rs

use crate::db::DbPool;
use crate::domain::activity_log_model::{AuditAction, Model};
use crate::error::AppResult;
use crate::repository::activity_log_repository::{ActivityLogFilter, ActivityLogRepository};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

/// 特権的な状態変更の追記専用ログ。
///
/// 監査書き込みの失敗で業務処理を失敗させてはならない。失敗は ERROR ログと
/// 失敗カウンタで運用側に可視化し、呼び出し元へは伝播しない。
pub struct AuditLogService {
    activity_log_repo: Arc<ActivityLogRepository>,
    failed_writes: AtomicU64,
}

impl AuditLogService {
    pub fn new(db: DbPool) -> Self {
        Self {
            activity_log_repo: Arc::new(ActivityLogRepository::new(db)),
            failed_writes: AtomicU64::new(0),
        }
    }

    /// 監査エントリを記録する。挿入失敗は飲み込み、フォールバックとして
    /// tracing 経由で全フィールドを出力する。
    pub async fn record(
        &self,
        actor_id: Option<Uuid>,
        action: AuditAction,
        entity_type: &str,
        entity_id: Option<Uuid>,
        details: Option<serde_json::Value>,
    ) {
        let log = Model::new(
            actor_id,
            action,
            entity_type.to_string(),
            entity_id,
            details.clone(),
        );

        debug!(
            action = action.as_str(),
            entity_type, ?entity_id, "Recording audit log"
        );

        if let Err(e) = self.activity_log_repo.create(&log).await {
            let failures = self.failed_writes.fetch_add(1, Ordering::Relaxed) + 1;
            error!(
                error = %e,
                action = action.as_str(),
                entity_type,
                ?entity_id,
                ?actor_id,
                ?details,
                consecutive_failures = failures,
                "Failed to persist audit log entry"
            );
        }
    }

    /// これまでに失敗した監査書き込みの件数（運用監視用）
    pub fn failed_writes(&self) -> u64 {
        self.failed_writes.load(Ordering::Relaxed)
    }

    /// 監査ログの検索（読み取り専用）
    pub async fn list(
        &self,
        filter: ActivityLogFilter,
    ) -> AppResult<(Vec<Model>, u64)> {
        self.activity_log_repo.find_with_query(filter).await
    }
}
