// src/domain/user_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, DbErr, Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(unique)]
    pub email: String,

    pub display_name: String,

    /// SUPER_ADMIN | ADMIN | EDUCATOR | PARENT
    pub role: String,

    /// SUPER_ADMIN は施設に属さない
    #[sea_orm(nullable)]
    pub institution_id: Option<Uuid>,

    /// 保護者によるアプリ上の同意
    pub consent_given: bool,

    pub consent_date: Option<DateTime<Utc>>,

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

    #[sea_orm(has_many = "crate::domain::child_guardian_model::Entity")]
    ChildGuardians,

    #[sea_orm(
        has_many = "crate::domain::gdpr_request_model::Entity",
        from = "Column::Id",
        to = "crate::domain::gdpr_request_model::Column::UserId"
    )]
    GdprRequests,
}

impl Related<crate::domain::institution_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Institution.def()
    }
}

impl Related<crate::domain::gdpr_request_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GdprRequests.def()
    }
}

// 保護者 -> 子ども は child_guardians 経由の多対多
impl Related<crate::domain::child_model::Entity> for Entity {
    fn to() -> RelationDef {
        crate::domain::child_guardian_model::Relation::Child.def()
    }

    fn via() -> Option<RelationDef> {
        Some(
            crate::domain::child_guardian_model::Relation::User
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
            ..ActiveModelTrait::default()
        }
    }

    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if !insert {
            // 更新の場合のみ updated_at を更新
            self.updated_at = Set(Utc::now());
        }
        Ok(self)
    }
}

/// 認証済みアクターのロール
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    Educator,
    Parent,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "SUPER_ADMIN",
            UserRole::Admin => "ADMIN",
            UserRole::Educator => "EDUCATOR",
            UserRole::Parent => "PARENT",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "SUPER_ADMIN" => Some(UserRole::SuperAdmin),
            "ADMIN" => Some(UserRole::Admin),
            "EDUCATOR" => Some(UserRole::Educator),
            "PARENT" => Some(UserRole::Parent),
            _ => None,
        }
    }
}

impl Model {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// 不明なロール文字列は最小権限の PARENT として扱う
    pub fn user_role(&self) -> UserRole {
        UserRole::from_str(&self.role).unwrap_or(UserRole::Parent)
    }

    /// 削除保護の絶対条件。アクターではなく対象自身のロールを見る。
    pub fn is_super_admin(&self) -> bool {
        self.user_role() == UserRole::SuperAdmin
    }
}
