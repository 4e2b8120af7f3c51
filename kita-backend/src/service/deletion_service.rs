// src/service/deletion_service.rs

use crate::config::RetentionPolicy;
use crate::db::DbPool;
use crate::domain::activity_log_model::AuditAction;
use crate::domain::entity_kind::EntityKind;
use crate::domain::{child_model, group_model, institution_model, user_model};
use crate::error::{AppError, AppResult};
use crate::repository::child_repository::ChildRepository;
use crate::repository::group_repository::GroupRepository;
use crate::repository::institution_repository::InstitutionRepository;
use crate::repository::user_repository::UserRepository;
use crate::utils::clock::Clock;
use chrono::{DateTime, Utc};
use sea_orm::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// ソフト削除の結果。カスケードの副作用も含めて返す。
#[derive(Clone, Debug, Serialize)]
pub struct DeletionOutcome {
    pub kind: EntityKind,
    pub entity_id: Uuid,
    pub deleted_at: DateTime<Utc>,
    /// グループ削除でリンク解除された子どもの数
    pub unlinked_children: u64,
}

/// ソフト削除カスケードと物理パージ。
///
/// 認可は呼び出し元の責務。ここでは状態遷移とカスケードの整合性のみを扱う。
/// 唯一の例外が SUPER_ADMIN の削除保護で、これはアクターによらない絶対条件。
pub struct DeletionService {
    db: DbPool,
    user_repo: Arc<UserRepository>,
    child_repo: Arc<ChildRepository>,
    group_repo: Arc<GroupRepository>,
    institution_repo: Arc<InstitutionRepository>,
    audit: Arc<super::audit_log_service::AuditLogService>,
    clock: Arc<dyn Clock>,
    policy: RetentionPolicy,
}

impl DeletionService {
    pub fn new(
        db: DbPool,
        clock: Arc<dyn Clock>,
        policy: RetentionPolicy,
        audit: Arc<super::audit_log_service::AuditLogService>,
    ) -> Self {
        Self {
            db: db.clone(),
            user_repo: Arc::new(UserRepository::new(db.clone())),
            child_repo: Arc::new(ChildRepository::new(db.clone())),
            group_repo: Arc::new(GroupRepository::new(db.clone())),
            institution_repo: Arc::new(InstitutionRepository::new(db)),
            audit,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    pub async fn soft_delete(
        &self,
        kind: EntityKind,
        entity_id: Uuid,
        actor_id: Uuid,
    ) -> AppResult<DeletionOutcome> {
        match kind {
            EntityKind::User => self.soft_delete_user(entity_id, actor_id).await,
            EntityKind::Child => self.soft_delete_child(entity_id, actor_id).await,
            EntityKind::Group => self.soft_delete_group(entity_id, actor_id).await,
            EntityKind::Institution => self.soft_delete_institution(entity_id, actor_id).await,
        }
    }

    /// GDPR承認フローが自身のトランザクション内で再利用する。
    /// SUPER_ADMIN は経路を問わず削除できない。
    pub async fn soft_delete_user_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
        deleted_at: DateTime<Utc>,
    ) -> AppResult<user_model::Model> {
        let user = self
            .user_repo
            .find_active_in(conn, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if user.is_super_admin() {
            return Err(AppError::Forbidden(
                "Super admin accounts can never be deleted".to_string(),
            ));
        }

        self.user_repo.soft_delete_in(conn, user, deleted_at).await
    }

    async fn soft_delete_user(&self, user_id: Uuid, actor_id: Uuid) -> AppResult<DeletionOutcome> {
        let now = self.clock.now();
        let user = self.soft_delete_user_in(&self.db, user_id, now).await?;

        info!(user_id = %user_id, "User soft-deleted");

        self.audit
            .record(
                Some(actor_id),
                AuditAction::GdprDeleteUser,
                EntityKind::User.as_str(),
                Some(user.id),
                None,
            )
            .await;

        Ok(DeletionOutcome {
            kind: EntityKind::User,
            entity_id: user_id,
            deleted_at: now,
            unlinked_children: 0,
        })
    }

    /// 子どもには下位の依存エンティティが無いため、これ以上のカスケードはしない
    async fn soft_delete_child(&self, child_id: Uuid, actor_id: Uuid) -> AppResult<DeletionOutcome> {
        let child = self
            .child_repo
            .find_active(child_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Child not found".to_string()))?;

        let now = self.clock.now();
        self.child_repo
            .soft_delete_in(&self.db, child, now)
            .await?;

        info!(child_id = %child_id, "Child soft-deleted");

        self.audit
            .record(
                Some(actor_id),
                AuditAction::GdprDeleteChild,
                EntityKind::Child.as_str(),
                Some(child_id),
                None,
            )
            .await;

        Ok(DeletionOutcome {
            kind: EntityKind::Child,
            entity_id: child_id,
            deleted_at: now,
            unlinked_children: 0,
        })
    }

    /// グループ削除は所属する子どものリンク解除まで同一トランザクションで行う。
    /// 子どもが削除済みグループを参照したままになる時間窓を作らないこと。
    async fn soft_delete_group(&self, group_id: Uuid, actor_id: Uuid) -> AppResult<DeletionOutcome> {
        let now = self.clock.now();

        let txn = self.db.begin().await?;

        let group = self
            .group_repo
            .find_active_in(&txn, group_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Group not found".to_string()))?;

        self.group_repo.soft_delete_in(&txn, group, now).await?;
        let unlinked = self
            .child_repo
            .unlink_group_members_in(&txn, group_id)
            .await?;

        txn.commit().await?;

        info!(group_id = %group_id, unlinked, "Group soft-deleted, members unlinked");

        self.audit
            .record(
                Some(actor_id),
                AuditAction::GdprDeleteGroup,
                EntityKind::Group.as_str(),
                Some(group_id),
                Some(serde_json::json!({ "unlinked_children": unlinked })),
            )
            .await;

        Ok(DeletionOutcome {
            kind: EntityKind::Group,
            entity_id: group_id,
            deleted_at: now,
            unlinked_children: unlinked,
        })
    }

    /// 施設削除は冪等。配下への一括カスケードは明示的な確認を伴う
    /// 別の管理オペレーションとして扱う。
    async fn soft_delete_institution(
        &self,
        institution_id: Uuid,
        actor_id: Uuid,
    ) -> AppResult<DeletionOutcome> {
        let institution = self
            .institution_repo
            .find_by_id(institution_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Institution not found".to_string()))?;

        // 既に削除済みなら何もしない
        if let Some(deleted_at) = institution.deleted_at {
            return Ok(DeletionOutcome {
                kind: EntityKind::Institution,
                entity_id: institution_id,
                deleted_at,
                unlinked_children: 0,
            });
        }

        let now = self.clock.now();
        self.institution_repo
            .soft_delete_in(&self.db, institution, now)
            .await?;

        info!(institution_id = %institution_id, "Institution soft-deleted");

        self.audit
            .record(
                Some(actor_id),
                AuditAction::GdprDeleteInstitution,
                EntityKind::Institution.as_str(),
                Some(institution_id),
                None,
            )
            .await;

        Ok(DeletionOutcome {
            kind: EntityKind::Institution,
            entity_id: institution_id,
            deleted_at: now,
            unlinked_children: 0,
        })
    }

    /// 単一エンティティの物理パージ。
    /// deleted_at が打たれていて保持期間を過ぎている場合のみ削除する。
    /// deleted_at が null の行は決して消さない（誤った物理削除への防御）。
    pub async fn purge(&self, kind: EntityKind, entity_id: Uuid) -> AppResult<bool> {
        let cutoff = self.clock.now() - self.policy.period_for(kind);
        let purged = self.purge_one(kind, entity_id, cutoff).await?;
        Ok(purged > 0)
    }

    /// 保持期間を過ぎたソフト削除済み行をまとめて物理削除する。
    /// 条件が deleted_at の経過時間のみなので、同時実行しても安全。
    pub async fn purge_expired(&self, kind: EntityKind, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let rows_affected = match kind {
            EntityKind::User => {
                user_model::Entity::delete_many()
                    .filter(user_model::Column::DeletedAt.is_not_null())
                    .filter(user_model::Column::DeletedAt.lt(cutoff))
                    .exec(&self.db)
                    .await?
                    .rows_affected
            }
            EntityKind::Child => {
                child_model::Entity::delete_many()
                    .filter(child_model::Column::DeletedAt.is_not_null())
                    .filter(child_model::Column::DeletedAt.lt(cutoff))
                    .exec(&self.db)
                    .await?
                    .rows_affected
            }
            EntityKind::Group => {
                group_model::Entity::delete_many()
                    .filter(group_model::Column::DeletedAt.is_not_null())
                    .filter(group_model::Column::DeletedAt.lt(cutoff))
                    .exec(&self.db)
                    .await?
                    .rows_affected
            }
            EntityKind::Institution => {
                institution_model::Entity::delete_many()
                    .filter(institution_model::Column::DeletedAt.is_not_null())
                    .filter(institution_model::Column::DeletedAt.lt(cutoff))
                    .exec(&self.db)
                    .await?
                    .rows_affected
            }
        };

        Ok(rows_affected)
    }

    async fn purge_one(
        &self,
        kind: EntityKind,
        entity_id: Uuid,
        cutoff: DateTime<Utc>,
    ) -> AppResult<u64> {
        let rows_affected = match kind {
            EntityKind::User => {
                user_model::Entity::delete_many()
                    .filter(user_model::Column::Id.eq(entity_id))
                    .filter(user_model::Column::DeletedAt.is_not_null())
                    .filter(user_model::Column::DeletedAt.lt(cutoff))
                    .exec(&self.db)
                    .await?
                    .rows_affected
            }
            EntityKind::Child => {
                child_model::Entity::delete_many()
                    .filter(child_model::Column::Id.eq(entity_id))
                    .filter(child_model::Column::DeletedAt.is_not_null())
                    .filter(child_model::Column::DeletedAt.lt(cutoff))
                    .exec(&self.db)
                    .await?
                    .rows_affected
            }
            EntityKind::Group => {
                group_model::Entity::delete_many()
                    .filter(group_model::Column::Id.eq(entity_id))
                    .filter(group_model::Column::DeletedAt.is_not_null())
                    .filter(group_model::Column::DeletedAt.lt(cutoff))
                    .exec(&self.db)
                    .await?
                    .rows_affected
            }
            EntityKind::Institution => {
                institution_model::Entity::delete_many()
                    .filter(institution_model::Column::Id.eq(entity_id))
                    .filter(institution_model::Column::DeletedAt.is_not_null())
                    .filter(institution_model::Column::DeletedAt.lt(cutoff))
                    .exec(&self.db)
                    .await?
                    .rows_affected
            }
        };

        Ok(rows_affected)
    }
}
