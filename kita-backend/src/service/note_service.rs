// src/service/note_service.rs

use crate::db::DbPool;
use crate::domain::activity_log_model::AuditAction;
use crate::domain::note_model::{ActiveModel, Model};
use crate::domain::principal::Principal;
use crate::error::{AppError, AppResult};
use crate::repository::child_repository::ChildRepository;
use crate::utils::clock::Clock;
use crate::utils::permission::PermissionChecker;
use sea_orm::{ActiveModelTrait, Set};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::consent_service::{ConsentService, SensitiveOperation};

#[derive(Clone, Debug, Validate)]
pub struct CreateNoteRequest {
    pub child_id: Uuid,
    #[validate(length(min = 1, max = 10000, message = "Der Inhalt der Notiz darf nicht leer sein"))]
    pub content: String,
}

/// 保育記録の作成。子どもの個人データを生むので同意ゲートが前提。
pub struct NoteService {
    db: DbPool,
    child_repo: Arc<ChildRepository>,
    consent: Arc<ConsentService>,
    audit: Arc<super::audit_log_service::AuditLogService>,
    clock: Arc<dyn Clock>,
}

impl NoteService {
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

    pub async fn create(&self, actor: &Principal, payload: CreateNoteRequest) -> AppResult<Model> {
        payload.validate()?;

        let child = self
            .child_repo
            .find_active(payload.child_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Child not found".to_string()))?;

        if !PermissionChecker::can_work_with_children(actor, child.institution_id) {
            return Err(AppError::Forbidden(
                "Not authorized to write notes for this child".to_string(),
            ));
        }

        self.consent
            .require_consent(payload.child_id, SensitiveOperation::NoteCreate)
            .await?;

        let now = self.clock.now();
        let note = ActiveModel {
            id: Set(Uuid::new_v4()),
            child_id: Set(payload.child_id),
            author_id: Set(actor.id),
            content: Set(payload.content),
            deleted_at: Set(None),
            created_at: Set(now),
        };
        let created = note.insert(&self.db).await?;

        info!(child_id = %created.child_id, note_id = %created.id, "note created");

        self.audit
            .record(
                Some(actor.id),
                AuditAction::NoteCreated,
                "NOTE",
                Some(created.id),
                Some(serde_json::json!({ "child_id": created.child_id })),
            )
            .await;

        Ok(created)
    }
}
