// src/service/export_service.rs

use crate::db::DbPool;
use crate::domain::activity_log_model::AuditAction;
use crate::domain::entity_kind::EntityKind;
use crate::domain::principal::Principal;
use crate::domain::{
    activity_log_model, child_model, message_model, notification_model, personal_task_model,
    user_model,
};
use crate::error::{AppError, AppResult};
use crate::repository::activity_log_repository::ActivityLogRepository;
use crate::repository::child_repository::ChildRepository;
use crate::repository::user_repository::UserRepository;
use crate::utils::clock::Clock;
use crate::utils::permission::PermissionChecker;
use chrono::{DateTime, Utc};
use sea_orm::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// DSGVO Art. 15 に基づくデータ主体向けエクスポート。
/// ソフト削除済みの行は本人にも開示しない。
#[derive(Debug, Clone, Serialize)]
pub struct PersonalDataExport {
    pub exported_at: DateTime<Utc>,
    pub user: user_model::Model,
    pub children: Vec<child_model::Model>,
    pub messages: Vec<message_model::Model>,
    pub notes: Vec<crate::domain::note_model::Model>,
    pub notifications: Vec<notification_model::Model>,
    pub personal_tasks: Vec<personal_task_model::Model>,
    pub activity_logs: Vec<activity_log_model::Model>,
}

pub struct ExportService {
    db: DbPool,
    user_repo: Arc<UserRepository>,
    child_repo: Arc<ChildRepository>,
    activity_log_repo: Arc<ActivityLogRepository>,
    audit: Arc<super::audit_log_service::AuditLogService>,
    clock: Arc<dyn Clock>,
}

impl ExportService {
    pub fn new(
        db: DbPool,
        clock: Arc<dyn Clock>,
        audit: Arc<super::audit_log_service::AuditLogService>,
    ) -> Self {
        Self {
            db: db.clone(),
            user_repo: Arc::new(UserRepository::new(db.clone())),
            child_repo: Arc::new(ChildRepository::new(db.clone())),
            activity_log_repo: Arc::new(ActivityLogRepository::new(db)),
            audit,
            clock,
        }
    }

    /// 対象ユーザーの個人データを1つの構造体に集約する。
    /// 本人、または管理権限を持つアクターのみ実行できる。
    pub async fn export_subject(
        &self,
        actor: &Principal,
        user_id: Uuid,
    ) -> AppResult<PersonalDataExport> {
        if actor.id != user_id && !PermissionChecker::is_privileged(actor.role) {
            return Err(AppError::Forbidden(
                "Not authorized to export this user's data".to_string(),
            ));
        }

        let user = self
            .user_repo
            .find_active(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let children = self
            .child_repo
            .find_active_by_guardian(&self.db, user_id)
            .await?;

        // 送受信どちらの側でも本人のメッセージは対象
        let messages = message_model::Entity::find()
            .filter(
                Condition::any()
                    .add(message_model::Column::SenderId.eq(user_id))
                    .add(message_model::Column::RecipientId.eq(user_id)),
            )
            .filter(message_model::Column::DeletedAt.is_null())
            .order_by_desc(message_model::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let notes = crate::domain::note_model::Entity::find()
            .filter(crate::domain::note_model::Column::AuthorId.eq(user_id))
            .filter(crate::domain::note_model::Column::DeletedAt.is_null())
            .order_by_desc(crate::domain::note_model::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let notifications = notification_model::Entity::find()
            .filter(notification_model::Column::UserId.eq(user_id))
            .filter(notification_model::Column::DeletedAt.is_null())
            .order_by_desc(notification_model::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let personal_tasks = personal_task_model::Entity::find()
            .filter(personal_task_model::Column::UserId.eq(user_id))
            .filter(personal_task_model::Column::DeletedAt.is_null())
            .order_by_desc(personal_task_model::Column::CreatedAt)
            .all(&self.db)
            .await?;

        // 監査ログは追記専用なのでそのまま含める
        let activity_logs = self.activity_log_repo.find_by_actor(user_id).await?;

        let export = PersonalDataExport {
            exported_at: self.clock.now(),
            user,
            children,
            messages,
            notes,
            notifications,
            personal_tasks,
            activity_logs,
        };

        info!(
            subject_id = %user_id,
            actor_id = %actor.id,
            children = export.children.len(),
            messages = export.messages.len(),
            "personal data export assembled"
        );

        self.audit
            .record(
                Some(actor.id),
                AuditAction::ExportPersonalData,
                EntityKind::User.as_str(),
                Some(user_id),
                None,
            )
            .await;

        Ok(export)
    }
}
