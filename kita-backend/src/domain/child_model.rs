// src/domain/child_model.rs

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "children")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub institution_id: Uuid,

    /// グループ未所属（またはグループ削除でリンク解除済み）の場合は None
    #[sea_orm(nullable)]
    pub group_id: Option<Uuid>,

    pub first_name: String,

    pub last_name: String,

    pub birth_date: Option<NaiveDate>,

    /// 保護者のアプリ同意から導出されるキャッシュ値
    pub consent_given: bool,

    pub consent_date: Option<DateTime<Utc>>,

    /// 職員が記録した紙の同意書
    pub manual_consent_given: bool,

    pub manual_consent_date: Option<DateTime<Utc>>,

    pub deleted_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::institution_model::Entity",
        from = "Column::InstitutionId",
        to = "crate::domain::institution_model::Column::Id"
    )]
    Institution,

    #[sea_orm(
        belongs_to = "crate::domain::group_model::Entity",
        from = "Column::GroupId",
        to = "crate::domain::group_model::Column::Id"
    )]
    Group,

    #[sea_orm(has_many = "crate::domain::child_guardian_model::Entity")]
    ChildGuardians,

    #[sea_orm(has_many = "crate::domain::note_model::Entity")]
    Notes,

    #[sea_orm(has_many = "crate::domain::attendance_model::Entity")]
    Attendances,
}

impl Related<crate::domain::institution_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Institution.def()
    }
}

impl Related<crate::domain::group_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
    }
}

impl Related<crate::domain::note_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notes.def()
    }
}

impl Related<crate::domain::attendance_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendances.def()
    }
}

// 子ども -> 保護者 は child_guardians 経由の多対多
impl Related<crate::domain::user_model::Entity> for Entity {
    fn to() -> RelationDef {
        crate::domain::child_guardian_model::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(
            crate::domain::child_guardian_model::Relation::Child
                .def()
                .rev(),
        )
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    fn new() -> Self {
        Self {
            id: Set(Uuid::new_v4()),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            consent_given: Set(false),
            manual_consent_given: Set(false),
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            self.updated_at = Set(Utc::now());
        }
        Ok(self)
    }
}

impl Model {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
