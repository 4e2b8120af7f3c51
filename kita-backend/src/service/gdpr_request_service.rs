// src/service/gdpr_request_service.rs

use crate::db::DbPool;
use crate::domain::activity_log_model::AuditAction;
use crate::domain::entity_kind::EntityKind;
use crate::domain::gdpr_request_model::{ActiveModel, Model, RequestStatus};
use crate::domain::principal::Principal;
use crate::error::{AppError, AppResult};
use crate::repository::gdpr_request_repository::{GdprRequestFilter, GdprRequestRepository};
use crate::repository::user_repository::UserRepository;
use crate::utils::clock::Clock;
use crate::utils::permission::PermissionChecker;
use sea_orm::{IntoActiveModel, Set, TransactionTrait};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// 削除申請の作成ペイロード
#[derive(Clone, Debug, Validate)]
pub struct CreateDeletionRequest {
    pub user_id: Uuid,
    #[validate(length(min = 1, message = "Ein Grund für die Löschanfrage ist erforderlich"))]
    pub reason: String,
}

/// 却下ペイロード。理由は必須。
#[derive(Clone, Debug, Validate)]
pub struct RejectDeletionRequest {
    #[validate(length(min = 1, message = "Ein Ablehnungsgrund ist erforderlich"))]
    pub reason: String,
}

/// 「忘れられる権利」行使のための申請・承認ワークフロー。
///
/// 状態機械: PENDING -> APPROVED | REJECTED。両終端状態からの遷移は無い。
/// 承認時は同一トランザクション内で対象ユーザーをソフト削除する。
pub struct GdprRequestService {
    db: DbPool,
    user_repo: Arc<UserRepository>,
    request_repo: Arc<GdprRequestRepository>,
    deletion: Arc<super::deletion_service::DeletionService>,
    audit: Arc<super::audit_log_service::AuditLogService>,
    clock: Arc<dyn Clock>,
}

impl GdprRequestService {
    pub fn new(
        db: DbPool,
        clock: Arc<dyn Clock>,
        deletion: Arc<super::deletion_service::DeletionService>,
        audit: Arc<super::audit_log_service::AuditLogService>,
    ) -> Self {
        Self {
            db: db.clone(),
            user_repo: Arc::new(UserRepository::new(db.clone())),
            request_repo: Arc::new(GdprRequestRepository::new(db)),
            deletion,
            audit,
            clock,
        }
    }

    /// 申請を PENDING で作成する。
    /// 「ユーザーごとに PENDING は高々1件」の検査は挿入と同一トランザクション内で
    /// 行う（事前チェックだと check と insert の間の競合に負ける）。
    pub async fn create(
        &self,
        actor: &Principal,
        payload: CreateDeletionRequest,
    ) -> AppResult<Model> {
        if !PermissionChecker::can_review_deletion_requests(actor) {
            return Err(AppError::Forbidden(
                "Not authorized to create deletion requests".to_string(),
            ));
        }

        payload.validate()?;

        let now = self.clock.now();
        let txn = self.db.begin().await?;

        self.user_repo
            .find_active_in(&txn, payload.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let pending = self
            .request_repo
            .count_pending_for_user_in(&txn, payload.user_id)
            .await?;
        if pending > 0 {
            return Err(AppError::Conflict(
                "Für diesen Benutzer existiert bereits eine ausstehende Löschanfrage".to_string(),
            ));
        }

        let request = Model {
            id: Uuid::new_v4(),
            user_id: payload.user_id,
            reason: payload.reason,
            status: RequestStatus::Pending.as_str().to_string(),
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        };
        let created = self.request_repo.create_in(&txn, &request).await?;

        txn.commit().await?;

        info!(request_id = %created.id, user_id = %created.user_id, "GDPR deletion request created");

        self.audit
            .record(
                Some(actor.id),
                AuditAction::GdprDeleteRequestCreated,
                "GDPR_REQUEST",
                Some(created.id),
                Some(serde_json::json!({ "user_id": created.user_id })),
            )
            .await;

        Ok(created)
    }

    /// 申請を承認し、同一トランザクション内で対象ユーザーをソフト削除する
    pub async fn approve(&self, actor: &Principal, request_id: Uuid) -> AppResult<Model> {
        if !PermissionChecker::can_review_deletion_requests(actor) {
            return Err(AppError::Forbidden(
                "Not authorized to review deletion requests".to_string(),
            ));
        }

        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let request = self
            .request_repo
            .find_by_id_in(&txn, request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Deletion request not found".to_string()))?;

        if !request.is_pending() {
            return Err(AppError::Conflict(
                "Anfrage kann nur genehmigt werden, wenn sie ausstehend ist".to_string(),
            ));
        }

        let subject_id = request.user_id;
        self.deletion
            .soft_delete_user_in(&txn, subject_id, now)
            .await?;

        let mut active_model: ActiveModel = request.into_active_model();
        active_model.status = Set(RequestStatus::Approved.as_str().to_string());
        active_model.reviewed_by = Set(Some(actor.id));
        active_model.reviewed_at = Set(Some(now));
        let updated = self.request_repo.update_in(&txn, active_model).await?;

        txn.commit().await?;

        info!(request_id = %request_id, user_id = %subject_id, "GDPR deletion request approved");

        self.audit
            .record(
                Some(actor.id),
                AuditAction::GdprDeleteUser,
                EntityKind::User.as_str(),
                Some(subject_id),
                Some(serde_json::json!({ "request_id": request_id })),
            )
            .await;

        Ok(updated)
    }

    /// 申請を却下する。元の申請理由は保持し、却下根拠を追記する。
    pub async fn reject(
        &self,
        actor: &Principal,
        request_id: Uuid,
        payload: RejectDeletionRequest,
    ) -> AppResult<Model> {
        if !PermissionChecker::can_review_deletion_requests(actor) {
            return Err(AppError::Forbidden(
                "Not authorized to review deletion requests".to_string(),
            ));
        }

        payload.validate()?;

        let now = self.clock.now();
        let txn = self.db.begin().await?;

        let request = self
            .request_repo
            .find_by_id_in(&txn, request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Deletion request not found".to_string()))?;

        if !request.is_pending() {
            return Err(AppError::Conflict(
                "Anfrage kann nur abgelehnt werden, wenn sie ausstehend ist".to_string(),
            ));
        }

        let combined_reason = format!("{}\nABGELEHNT: {}", request.reason, payload.reason);

        let mut active_model: ActiveModel = request.into_active_model();
        active_model.reason = Set(combined_reason);
        active_model.status = Set(RequestStatus::Rejected.as_str().to_string());
        active_model.reviewed_by = Set(Some(actor.id));
        active_model.reviewed_at = Set(Some(now));
        let updated = self.request_repo.update_in(&txn, active_model).await?;

        txn.commit().await?;

        info!(request_id = %request_id, "GDPR deletion request rejected");

        self.audit
            .record(
                Some(actor.id),
                AuditAction::GdprDeleteRequestRejected,
                "GDPR_REQUEST",
                Some(request_id),
                None,
            )
            .await;

        Ok(updated)
    }

    pub async fn get(&self, request_id: Uuid) -> AppResult<Model> {
        self.request_repo
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Deletion request not found".to_string()))
    }

    /// ステータス絞り込みとページネーション付きの一覧。状態は変更しない。
    pub async fn list(&self, filter: GdprRequestFilter) -> AppResult<(Vec<Model>, u64)> {
        self.request_repo.find_with_filter(filter).await
    }
}
