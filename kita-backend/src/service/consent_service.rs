// src/service/consent_service.rs

use crate::db::DbPool;
use crate::domain::activity_log_model::AuditAction;
use crate::domain::principal::Principal;
use crate::domain::{child_model, user_model};
use crate::error::{AppError, AppResult};
use crate::repository::child_repository::ChildRepository;
use crate::repository::user_repository::UserRepository;
use crate::utils::clock::Clock;
use crate::utils::permission::PermissionChecker;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// 同意ゲートの対象となるセンシティブな操作
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SensitiveOperation {
    CheckIn,
    CheckOut,
    NoteCreate,
    PhotoUpload,
}

impl SensitiveOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SensitiveOperation::CheckIn => "check_in",
            SensitiveOperation::CheckOut => "check_out",
            SensitiveOperation::NoteCreate => "note_create",
            SensitiveOperation::PhotoUpload => "photo_upload",
        }
    }
}

/// 同意評価と同意ゲート。
///
/// 有効な同意は次の論理和で成立する（意図的に許容的なOR結合）:
/// (a) 職員が記録した紙の同意書、または
/// (b) 紐づく保護者のうち少なくとも一人のアプリ同意。
pub struct ConsentService {
    db: DbPool,
    child_repo: Arc<ChildRepository>,
    user_repo: Arc<UserRepository>,
    audit: Arc<super::audit_log_service::AuditLogService>,
    clock: Arc<dyn Clock>,
}

impl ConsentService {
    pub fn new(
        db: DbPool,
        clock: Arc<dyn Clock>,
        audit: Arc<super::audit_log_service::AuditLogService>,
    ) -> Self {
        Self {
            db: db.clone(),
            child_repo: Arc::new(ChildRepository::new(db.clone())),
            user_repo: Arc::new(UserRepository::new(db)),
            audit,
            clock,
        }
    }

    /// 副作用のない純粋な読み取り。
    /// 子どもが存在しない（またはソフト削除済み）の場合は NotFound。
    pub async fn has_valid_consent(&self, child_id: Uuid) -> AppResult<bool> {
        let child = self
            .child_repo
            .find_active(child_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Child not found".to_string()))?;

        if child.manual_consent_given {
            return Ok(true);
        }

        let guardians = self
            .user_repo
            .find_guardians_of_child(&self.db, child_id)
            .await?;

        Ok(guardians.iter().any(|g| g.consent_given))
    }

    /// センシティブな操作の前に同期的に呼ばれるゲート。
    /// 拒否はログに残さない（記録は呼び出し元の責務、二重計上を避ける）。
    pub async fn require_consent(
        &self,
        child_id: Uuid,
        operation: SensitiveOperation,
    ) -> AppResult<()> {
        if self.has_valid_consent(child_id).await? {
            return Ok(());
        }

        Err(AppError::ConsentRequired(format!(
            "No valid privacy consent on file for this child (operation: {})",
            operation.as_str()
        )))
    }

    /// 保護者が自分のアプリ同意を付与・撤回する。
    /// 紐づく子どものキャッシュ値もここで再計算する（ゲート自体は常に
    /// 保護者の行をライブで参照するため、キャッシュは表示用途）。
    pub async fn set_app_consent(
        &self,
        actor: &Principal,
        given: bool,
    ) -> AppResult<user_model::Model> {
        let user = self
            .user_repo
            .find_active(actor.id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let date = given.then(|| self.clock.now());
        let updated = self.user_repo.update_consent(user, given, date).await?;

        let children = self
            .child_repo
            .find_active_by_guardian(&self.db, actor.id)
            .await?;
        for child in children {
            let guardians = self
                .user_repo
                .find_guardians_of_child(&self.db, child.id)
                .await?;
            let derived = guardians.iter().any(|g| g.consent_given);
            if child.consent_given != derived {
                let date = derived.then(|| self.clock.now());
                self.child_repo
                    .set_cached_consent(child, derived, date)
                    .await?;
            }
        }

        info!(user_id = %actor.id, given, "App consent updated");

        Ok(updated)
    }

    /// 紙の同意書の記録・取り消し（管理者操作）
    pub async fn set_manual_consent(
        &self,
        actor: &Principal,
        child_id: Uuid,
        given: bool,
    ) -> AppResult<child_model::Model> {
        let child = self
            .child_repo
            .find_active(child_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Child not found".to_string()))?;

        if !PermissionChecker::can_record_manual_consent(actor, child.institution_id) {
            return Err(AppError::Forbidden(
                "Not authorized to record consent for this institution".to_string(),
            ));
        }

        let date = given.then(|| self.clock.now());
        let updated = self.child_repo.set_manual_consent(child, given, date).await?;

        info!(child_id = %child_id, given, "Manual consent updated");

        self.audit
            .record(
                Some(actor.id),
                AuditAction::ManualConsentSet,
                "CHILD",
                Some(child_id),
                Some(serde_json::json!({ "given": given })),
            )
            .await;

        Ok(updated)
    }
}
