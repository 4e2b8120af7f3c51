// src/repository/institution_repository.rs

use crate::db::DbPool;
use crate::domain::institution_model::{Column, Entity, Model};
use crate::error::AppResult;
use chrono::{DateTime, Utc};
use sea_orm::*;
use uuid::Uuid;

#[derive(Clone)]
pub struct InstitutionRepository {
    db: DbPool,
}

impl InstitutionRepository {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// ソフト削除済みを含めて検索。
    /// 施設削除は冪等のため、削除済み行も見えている必要がある。
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Model>> {
        Ok(Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn find_active(&self, id: Uuid) -> AppResult<Option<Model>> {
        let institution = Entity::find_by_id(id)
            .filter(Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;
        Ok(institution)
    }

    pub async fn soft_delete_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        institution: Model,
        deleted_at: DateTime<Utc>,
    ) -> AppResult<Model> {
        let mut active_model = institution.into_active_model();
        active_model.deleted_at = Set(Some(deleted_at));
        let updated = active_model.update(conn).await?;
        Ok(updated)
    }
}
