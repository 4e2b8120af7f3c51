// src/repository/group_repository.rs

use crate::db::DbPool;
use crate::domain::group_model::{Column, Entity, Model};
use crate::error::AppResult;
use chrono::{DateTime, Utc};
use sea_orm::*;
use uuid::Uuid;

#[derive(Clone)]
pub struct GroupRepository {
    db: DbPool,
}

impl GroupRepository {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Model>> {
        Ok(Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn find_active(&self, id: Uuid) -> AppResult<Option<Model>> {
        self.find_active_in(&self.db, id).await
    }

    pub async fn find_active_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> AppResult<Option<Model>> {
        let group = Entity::find_by_id(id)
            .filter(Column::DeletedAt.is_null())
            .one(conn)
            .await?;
        Ok(group)
    }

    pub async fn soft_delete_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        group: Model,
        deleted_at: DateTime<Utc>,
    ) -> AppResult<Model> {
        let mut active_model = group.into_active_model();
        active_model.deleted_at = Set(Some(deleted_at));
        let updated = active_model.update(conn).await?;
        Ok(updated)
    }
}
