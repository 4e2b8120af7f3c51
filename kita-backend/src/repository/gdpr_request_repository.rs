// src/repository/gdpr_request_repository.rs

use crate::db::DbPool;
use crate::domain::gdpr_request_model::{ActiveModel, Column, Entity, Model, RequestStatus};
use crate::error::AppResult;
use sea_orm::*;
use uuid::Uuid;

/// 削除申請の検索用フィルタ
#[derive(Debug, Clone)]
pub struct GdprRequestFilter {
    pub status: Option<RequestStatus>,
    pub page: u64,
    pub per_page: u64,
}

impl Default for GdprRequestFilter {
    fn default() -> Self {
        Self {
            status: None,
            page: 1,
            per_page: 20,
        }
    }
}

#[derive(Clone)]
pub struct GdprRequestRepository {
    db: DbPool,
}

impl GdprRequestRepository {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Model>> {
        self.find_by_id_in(&self.db, id).await
    }

    pub async fn find_by_id_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> AppResult<Option<Model>> {
        Ok(Entity::find_by_id(id).one(conn).await?)
    }

    /// 挿入と同一トランザクション内で呼び、check-then-insert の競合を防ぐ
    pub async fn count_pending_for_user_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
    ) -> AppResult<u64> {
        let count = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::Status.eq(RequestStatus::Pending.as_str()))
            .count(conn)
            .await?;
        Ok(count)
    }

    pub async fn create_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        request: &Model,
    ) -> AppResult<Model> {
        let active_model = ActiveModel {
            id: Set(request.id),
            user_id: Set(request.user_id),
            reason: Set(request.reason.clone()),
            status: Set(request.status.clone()),
            reviewed_by: Set(request.reviewed_by),
            reviewed_at: Set(request.reviewed_at),
            created_at: Set(request.created_at),
            updated_at: Set(request.updated_at),
        };
        let result = active_model.insert(conn).await?;
        Ok(result)
    }

    pub async fn update_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        active_model: ActiveModel,
    ) -> AppResult<Model> {
        let updated = active_model.update(conn).await?;
        Ok(updated)
    }

    /// ステータスでの絞り込みとページネーション。状態は変更しない。
    pub async fn find_with_filter(&self, filter: GdprRequestFilter) -> AppResult<(Vec<Model>, u64)> {
        let mut query = Entity::find();

        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }

        let total = query.clone().count(&self.db).await?;

        let page = Ord::max(filter.page, 1);
        let per_page = filter.per_page.clamp(1, 100);
        let requests = query
            .order_by_desc(Column::CreatedAt)
            .limit(per_page)
            .offset((page - 1) * per_page)
            .all(&self.db)
            .await?;

        Ok((requests, total))
    }
}
