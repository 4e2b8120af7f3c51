// src/repository/activity_log_repository.rs

use crate::db::DbPool;
use crate::domain::activity_log_model::{ActiveModel, Column, Entity, Model};
use crate::error::AppResult;
use chrono::{DateTime, Utc};
use sea_orm::*;
use uuid::Uuid;

/// 監査ログ検索用フィルタ
#[derive(Debug, Clone)]
pub struct ActivityLogFilter {
    pub user_id: Option<Uuid>,
    pub entity_type: Option<String>,
    pub action: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub page: u64,
    pub per_page: u64,
}

impl Default for ActivityLogFilter {
    fn default() -> Self {
        Self {
            user_id: None,
            entity_type: None,
            action: None,
            created_after: None,
            created_before: None,
            page: 1,
            per_page: 20,
        }
    }
}

#[derive(Clone)]
pub struct ActivityLogRepository {
    db: DbPool,
}

impl ActivityLogRepository {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// 監査エントリを追記する。更新APIは意図的に提供しない。
    pub async fn create(&self, log: &Model) -> AppResult<Model> {
        let active_model = ActiveModel {
            id: Set(log.id),
            user_id: Set(log.user_id),
            action: Set(log.action.clone()),
            entity_type: Set(log.entity_type.clone()),
            entity_id: Set(log.entity_id),
            details: Set(log.details.clone()),
            created_at: Set(log.created_at),
        };

        let result = active_model.insert(&self.db).await?;
        Ok(result)
    }

    /// データ主体（アクター）のエントリをエクスポート用に取得
    pub async fn find_by_actor(&self, user_id: Uuid) -> AppResult<Vec<Model>> {
        let logs = Entity::find()
            .filter(Column::UserId.eq(user_id))
            .order_by_desc(Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(logs)
    }

    /// 監査ログをクエリで検索
    pub async fn find_with_query(&self, filter: ActivityLogFilter) -> AppResult<(Vec<Model>, u64)> {
        let mut query = Entity::find();

        if let Some(user_id) = filter.user_id {
            query = query.filter(Column::UserId.eq(user_id));
        }
        if let Some(entity_type) = filter.entity_type {
            query = query.filter(Column::EntityType.eq(entity_type));
        }
        if let Some(action) = filter.action {
            query = query.filter(Column::Action.eq(action));
        }
        if let Some(from) = filter.created_after {
            query = query.filter(Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.created_before {
            query = query.filter(Column::CreatedAt.lte(to));
        }

        let total = query.clone().count(&self.db).await?;

        let page = Ord::max(filter.page, 1);
        let per_page = filter.per_page.clamp(1, 100);
        let logs = query
            .order_by_desc(Column::CreatedAt)
            .limit(per_page)
            .offset((page - 1) * per_page)
            .all(&self.db)
            .await?;

        Ok((logs, total))
    }
}
