// src/service/retention_service.rs

use crate::domain::activity_log_model::AuditAction;
use crate::domain::entity_kind::EntityKind;
use crate::error::AppResult;
use crate::utils::clock::Clock;
use std::sync::Arc;
use tracing::{error, info};

/// 1回のクリーンアップ実行の結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub purged_users: u64,
    pub purged_children: u64,
    pub purged_groups: u64,
    pub purged_institutions: u64,
}

impl CleanupSummary {
    pub fn total(&self) -> u64 {
        self.purged_users + self.purged_children + self.purged_groups + self.purged_institutions
    }

    fn add(&mut self, kind: EntityKind, count: u64) {
        match kind {
            EntityKind::User => self.purged_users += count,
            EntityKind::Child => self.purged_children += count,
            EntityKind::Group => self.purged_groups += count,
            EntityKind::Institution => self.purged_institutions += count,
        }
    }
}

/// 保持期限を過ぎたソフト削除済み行を定期的に物理削除するスケジューラ。
///
/// 1エンティティ種別の失敗が他の種別の処理を止めないよう、種別ごとに
/// 独立して実行する。どの1回の実行も冪等で、重複起動しても安全。
pub struct RetentionService {
    deletion: Arc<super::deletion_service::DeletionService>,
    audit: Arc<super::audit_log_service::AuditLogService>,
    clock: Arc<dyn Clock>,
}

impl RetentionService {
    pub fn new(
        deletion: Arc<super::deletion_service::DeletionService>,
        audit: Arc<super::audit_log_service::AuditLogService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            deletion,
            audit,
            clock,
        }
    }

    /// 全エンティティ種別に対して保持期限パージを1回実行する
    pub async fn run_cleanup(&self) -> AppResult<CleanupSummary> {
        let now = self.clock.now();
        let mut summary = CleanupSummary::default();
        let mut first_error = None;

        for kind in EntityKind::ALL {
            let cutoff = now - self.deletion.policy().period_for(kind);
            match self.deletion.purge_expired(kind, cutoff).await {
                Ok(count) => {
                    if count > 0 {
                        info!(
                            entity_type = kind.as_str(),
                            purged = count,
                            cutoff = %cutoff,
                            "retention purge removed expired rows"
                        );
                    }
                    summary.add(kind, count);
                }
                Err(err) => {
                    error!(
                        entity_type = kind.as_str(),
                        error = %err,
                        "retention purge failed for entity type"
                    );
                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        // システム実行なので actor は無し。何も消えなかった実行は記録しない。
        if summary.total() > 0 {
            self.audit
                .record(
                    None,
                    AuditAction::RetentionPurge,
                    "RETENTION",
                    None,
                    Some(serde_json::json!({
                        "purged_users": summary.purged_users,
                        "purged_children": summary.purged_children,
                        "purged_groups": summary.purged_groups,
                        "purged_institutions": summary.purged_institutions,
                    })),
                )
                .await;
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(summary),
        }
    }

    /// 指定間隔でクリーンアップを繰り返すバックグラウンドタスクを起動する
    pub fn spawn(self: Arc<Self>, period: std::time::Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if let Err(err) = self.run_cleanup().await {
                    error!(error = %err, "scheduled retention cleanup failed");
                }
            }
        })
    }
}
