// src/repository/child_repository.rs

use crate::db::DbPool;
use crate::domain::child_guardian_model;
use crate::domain::child_model::{ActiveModel, Column, Entity, Model};
use crate::error::AppResult;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use uuid::Uuid;

#[derive(Clone)]
pub struct ChildRepository {
    db: DbPool,
}

impl ChildRepository {
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
        let child = Entity::find_by_id(id)
            .filter(Column::DeletedAt.is_null())
            .one(conn)
            .await?;
        Ok(child)
    }

    /// 保護者に紐づく子ども（ソフト削除済みを除く）
    pub async fn find_active_by_guardian<C: ConnectionTrait>(
        &self,
        conn: &C,
        user_id: Uuid,
    ) -> AppResult<Vec<Model>> {
        let children = Entity::find()
            .join(
                JoinType::InnerJoin,
                child_guardian_model::Relation::Child.def().rev(),
            )
            .filter(child_guardian_model::Column::UserId.eq(user_id))
            .filter(Column::DeletedAt.is_null())
            .all(conn)
            .await?;
        Ok(children)
    }

    /// グループに所属する子ども（ソフト削除済みを除く）
    pub async fn find_active_by_group(&self, group_id: Uuid) -> AppResult<Vec<Model>> {
        let children = Entity::find()
            .filter(Column::GroupId.eq(group_id))
            .filter(Column::DeletedAt.is_null())
            .all(&self.db)
            .await?;
        Ok(children)
    }

    /// 削除されたグループを参照する子どものリンクを一括解除する。
    /// グループのソフト削除と同一トランザクションで呼ぶこと。
    pub async fn unlink_group_members_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        group_id: Uuid,
    ) -> AppResult<u64> {
        let result = Entity::update_many()
            .col_expr(Column::GroupId, Expr::value(Option::<Uuid>::None))
            .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(Column::GroupId.eq(group_id))
            .filter(Column::DeletedAt.is_null())
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }

    /// 保護者のアプリ同意から導出されるキャッシュ値を更新する
    pub async fn set_cached_consent(
        &self,
        child: Model,
        given: bool,
        date: Option<DateTime<Utc>>,
    ) -> AppResult<Model> {
        let mut active_model: ActiveModel = child.into_active_model();
        active_model.consent_given = Set(given);
        active_model.consent_date = Set(date);
        let updated = active_model.update(&self.db).await?;
        Ok(updated)
    }

    /// 紙の同意書の記録・取り消し
    pub async fn set_manual_consent(
        &self,
        child: Model,
        given: bool,
        date: Option<DateTime<Utc>>,
    ) -> AppResult<Model> {
        let mut active_model: ActiveModel = child.into_active_model();
        active_model.manual_consent_given = Set(given);
        active_model.manual_consent_date = Set(date);
        let updated = active_model.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn soft_delete_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        child: Model,
        deleted_at: DateTime<Utc>,
    ) -> AppResult<Model> {
        let mut active_model = child.into_active_model();
        active_model.deleted_at = Set(Some(deleted_at));
        let updated = active_model.update(conn).await?;
        Ok(updated)
    }
}
