// src/domain/note_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};

/// 子どもに紐づく保育記録。作成は同意ゲートを通過した場合のみ。
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub child_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::child_model::Entity",
        from = "Column::ChildId",
        to = "crate::domain::child_model::Column::Id"
    )]
    Child,

    #[sea_orm(
        belongs_to = "crate::domain::user_model::Entity",
        from = "Column::AuthorId",
        to = "crate::domain::user_model::Column::Id"
    )]
    Author,
}

impl Related<crate::domain::child_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Child.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            created_at: Set(Utc::now()),
            ..ActiveModelTrait::default()
        }
    }
}

impl Model {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
