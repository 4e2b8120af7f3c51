// src/service/attendance_service.rs

use crate::db::DbPool;
use crate::domain::activity_log_model::AuditAction;
use crate::domain::attendance_model::{ActiveModel, Column, Entity, Model};
use crate::domain::principal::Principal;
use crate::error::{AppError, AppResult};
use crate::repository::child_repository::ChildRepository;
use crate::utils::clock::Clock;
use crate::utils::permission::PermissionChecker;
use sea_orm::*;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::consent_service::{ConsentService, SensitiveOperation};

/// 登園／降園の記録。子どもの記録を作るので必ず同意ゲートを通す。
pub struct AttendanceService {
    db: DbPool,
    child_repo: Arc<ChildRepository>,
    consent: Arc<ConsentService>,
    audit: Arc<super::audit_log_service::AuditLogService>,
    clock: Arc<dyn Clock>,
}

impl AttendanceService {
    pub fn new(
        db: DbPool,
        clock: Arc<dyn Clock>,
        consent: Arc<ConsentService>,
        audit: Arc<super::audit_log_service::AuditLogService>,
    ) -> Self {
        Self {
            db: db.clone(),
            child_repo: Arc::new(ChildRepository::new(db)),
            consent,
            audit,
            clock,
        }
    }

    pub async fn check_in(&self, actor: &Principal, child_id: Uuid) -> AppResult<Model> {
        // 削除済みの子どもは同意判定より先に NotFound で弾く
        let child = self
            .child_repo
            .find_active(child_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Child not found".to_string()))?;

        if !PermissionChecker::can_work_with_children(actor, child.institution_id) {
            return Err(AppError::Forbidden(
                "Not authorized to record attendance for this child".to_string(),
            ));
        }

        self.consent
            .require_consent(child_id, SensitiveOperation::CheckIn)
            .await?;

        if self.find_open(child_id).await?.is_some() {
            return Err(AppError::Conflict(
                "Child is already checked in".to_string(),
            ));
        }

        let now = self.clock.now();
        let attendance = ActiveModel {
            id: Set(Uuid::new_v4()),
            child_id: Set(child_id),
            recorded_by: Set(actor.id),
            checked_in_at: Set(now),
            checked_out_at: Set(None),
            created_at: Set(now),
        };
        let created = attendance.insert(&self.db).await?;

        info!(child_id = %child_id, attendance_id = %created.id, "child checked in");

        self.audit
            .record(
                Some(actor.id),
                AuditAction::ChildCheckIn,
                "ATTENDANCE",
                Some(created.id),
                Some(serde_json::json!({ "child_id": child_id })),
            )
            .await;

        Ok(created)
    }

    pub async fn check_out(&self, actor: &Principal, child_id: Uuid) -> AppResult<Model> {
        let child = self
            .child_repo
            .find_active(child_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Child not found".to_string()))?;

        if !PermissionChecker::can_work_with_children(actor, child.institution_id) {
            return Err(AppError::Forbidden(
                "Not authorized to record attendance for this child".to_string(),
            ));
        }

        self.consent
            .require_consent(child_id, SensitiveOperation::CheckOut)
            .await?;

        let open = self.find_open(child_id).await?.ok_or_else(|| {
            AppError::Conflict("Child is not currently checked in".to_string())
        })?;

        let attendance_id = open.id;
        let mut active_model: ActiveModel = open.into_active_model();
        active_model.checked_out_at = Set(Some(self.clock.now()));
        let updated = active_model.update(&self.db).await?;

        info!(child_id = %child_id, attendance_id = %attendance_id, "child checked out");

        self.audit
            .record(
                Some(actor.id),
                AuditAction::ChildCheckOut,
                "ATTENDANCE",
                Some(attendance_id),
                Some(serde_json::json!({ "child_id": child_id })),
            )
            .await;

        Ok(updated)
    }

    async fn find_open(&self, child_id: Uuid) -> AppResult<Option<Model>> {
        let open = Entity::find()
            .filter(Column::ChildId.eq(child_id))
            .filter(Column::CheckedOutAt.is_null())
            .one(&self.db)
            .await?;
        Ok(open)
    }
}
