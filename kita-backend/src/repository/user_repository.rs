// src/repository/user_repository.rs

use crate::db::DbPool;
use crate::domain::child_guardian_model;
use crate::domain::user_model::{ActiveModel, Column, Entity, Model};
use crate::error::AppResult;
use chrono::{DateTime, Utc};
use sea_orm::*;
use uuid::Uuid;

#[derive(Clone)]
pub struct UserRepository {
    db: DbPool,
}

impl UserRepository {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// ソフト削除済みを含めて検索
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Model>> {
        Ok(Entity::find_by_id(id).one(&self.db).await?)
    }

    /// ソフト削除済みを除いて検索
    pub async fn find_active(&self, id: Uuid) -> AppResult<Option<Model>> {
        self.find_active_in(&self.db, id).await
    }

    pub async fn find_active_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        id: Uuid,
    ) -> AppResult<Option<Model>> {
        let user = Entity::find_by_id(id)
            .filter(Column::DeletedAt.is_null())
            .one(conn)
            .await?;
        Ok(user)
    }

    /// 子どもに紐づく保護者（ソフト削除済みを除く）
    pub async fn find_guardians_of_child<C: ConnectionTrait>(
        &self,
        conn: &C,
        child_id: Uuid,
    ) -> AppResult<Vec<Model>> {
        let guardians = Entity::find()
            .join(
                JoinType::InnerJoin,
                child_guardian_model::Relation::User.def().rev(),
            )
            .filter(child_guardian_model::Column::ChildId.eq(child_id))
            .filter(Column::DeletedAt.is_null())
            .all(conn)
            .await?;
        Ok(guardians)
    }

    /// deleted_at を打ってソフト削除する。物理削除はしない。
    pub async fn soft_delete_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        user: Model,
        deleted_at: DateTime<Utc>,
    ) -> AppResult<Model> {
        let mut active_model = user.into_active_model();
        active_model.deleted_at = Set(Some(deleted_at));
        let updated = active_model.update(conn).await?;
        Ok(updated)
    }

    pub async fn update_consent(
        &self,
        user: Model,
        consent_given: bool,
        consent_date: Option<DateTime<Utc>>,
    ) -> AppResult<Model> {
        let mut active_model: ActiveModel = user.into_active_model();
        active_model.consent_given = Set(consent_given);
        active_model.consent_date = Set(consent_date);
        let updated = active_model.update(&self.db).await?;
        Ok(updated)
    }
}
