// src/domain/activity_log_model.rs

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 追記専用の監査エントリ。通常のコードパスからは更新も削除もされない。
/// 参照は弱参照であり、参照先がパージされた後もエントリは残る。
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activity_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// 実行アクター。システム実行（保持期間スイープ）の場合は None
    pub user_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub details: Option<Json>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

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

/// 監査対象の特権操作
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    GdprDeleteRequestCreated,
    GdprDeleteRequestRejected,
    GdprDeleteUser,
    GdprDeleteChild,
    GdprDeleteGroup,
    GdprDeleteInstitution,
    ManualConsentSet,
    ExportPersonalData,
    RetentionPurge,
    ChildCheckIn,
    ChildCheckOut,
    NoteCreated,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::GdprDeleteRequestCreated => "GDPR_DELETE_REQUEST_CREATED",
            AuditAction::GdprDeleteRequestRejected => "GDPR_DELETE_REQUEST_REJECTED",
            AuditAction::GdprDeleteUser => "GDPR_DELETE_USER",
            AuditAction::GdprDeleteChild => "GDPR_DELETE_CHILD",
            AuditAction::GdprDeleteGroup => "GDPR_DELETE_GROUP",
            AuditAction::GdprDeleteInstitution => "GDPR_DELETE_INSTITUTION",
            AuditAction::ManualConsentSet => "MANUAL_CONSENT_SET",
            AuditAction::ExportPersonalData => "EXPORT_PERSONAL_DATA",
            AuditAction::RetentionPurge => "RETENTION_PURGE",
            AuditAction::ChildCheckIn => "CHILD_CHECK_IN",
            AuditAction::ChildCheckOut => "CHILD_CHECK_OUT",
            AuditAction::NoteCreated => "NOTE_CREATED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Model {
    pub fn new(
        user_id: Option<Uuid>,
        action: AuditAction,
        entity_type: String,
        entity_id: Option<Uuid>,
        details: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            action: action.as_str().to_string(),
            entity_type,
            entity_id,
            details,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_action_wire_strings() {
        assert_eq!(AuditAction::GdprDeleteUser.as_str(), "GDPR_DELETE_USER");
        assert_eq!(AuditAction::ManualConsentSet.as_str(), "MANUAL_CONSENT_SET");
        assert_eq!(
            AuditAction::ExportPersonalData.as_str(),
            "EXPORT_PERSONAL_DATA"
        );
        assert_eq!(
            AuditAction::GdprDeleteRequestCreated.as_str(),
            "GDPR_DELETE_REQUEST_CREATED"
        );
    }
}
