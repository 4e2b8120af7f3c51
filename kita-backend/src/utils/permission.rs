// src/utils/permission.rs

//! ロールに応じた能力チェックの一元化。
//! 各呼び出し箇所でロール判定を再実装しないこと。

use crate::domain::principal::Principal;
use crate::domain::user_model::UserRole;
use uuid::Uuid;

pub struct PermissionChecker;

impl PermissionChecker {
    /// 管理操作（削除申請の作成・レビュー、手動同意の記録など）が許可されるロール
    pub fn is_privileged(role: UserRole) -> bool {
        matches!(role, UserRole::SuperAdmin | UserRole::Admin)
    }

    /// 対象施設に対する管理権限。
    /// SUPER_ADMIN は施設横断、ADMIN は自施設のみ。
    pub fn can_administer_institution(principal: &Principal, institution_id: Uuid) -> bool {
        match principal.role {
            UserRole::SuperAdmin => true,
            UserRole::Admin => principal.institution_id == Some(institution_id),
            _ => false,
        }
    }

    /// 削除申請のレビュー（承認・却下）
    pub fn can_review_deletion_requests(principal: &Principal) -> bool {
        Self::is_privileged(principal.role)
    }

    /// 紙の同意書を記録できるか
    pub fn can_record_manual_consent(principal: &Principal, institution_id: Uuid) -> bool {
        Self::can_administer_institution(principal, institution_id)
    }

    /// 子どもに紐づく日常業務（チェックイン、記録作成）
    pub fn can_work_with_children(principal: &Principal, institution_id: Uuid) -> bool {
        match principal.role {
            UserRole::SuperAdmin => true,
            UserRole::Admin | UserRole::Educator => {
                principal.institution_id == Some(institution_id)
            }
            UserRole::Parent => false,
        }
    }
}
