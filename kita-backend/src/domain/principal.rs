// src/domain/principal.rs

use crate::domain::user_model::{self, UserRole};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 周辺のリクエスト層から渡される認証済みアクター。
/// この層では読み取り専用で消費する。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub role: UserRole,
    /// SUPER_ADMIN は施設横断でスコープされるため None
    pub institution_id: Option<Uuid>,
}

impl Principal {
    pub fn new(id: Uuid, role: UserRole, institution_id: Option<Uuid>) -> Self {
        Self {
            id,
            role,
            institution_id,
        }
    }
}

impl From<&user_model::Model> for Principal {
    fn from(user: &user_model::Model) -> Self {
        Self {
            id: user.id,
            role: user.user_role(),
            institution_id: user.institution_id,
        }
    }
}
