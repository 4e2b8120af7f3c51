// src/domain/entity_kind.rs

use serde::{Deserialize, Serialize};
use std::fmt;

/// ソフト削除・保持期間の対象となるエンティティ種別
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    User,
    Child,
    Group,
    Institution,
}

impl EntityKind {
    /// 保持期間スイープの走査順
    pub const ALL: [EntityKind; 4] = [
        EntityKind::User,
        EntityKind::Child,
        EntityKind::Group,
        EntityKind::Institution,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "USER",
            EntityKind::Child => "CHILD",
            EntityKind::Group => "GROUP",
            EntityKind::Institution => "INSTITUTION",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "USER" => Some(EntityKind::User),
            "CHILD" => Some(EntityKind::Child),
            "GROUP" => Some(EntityKind::Group),
            "INSTITUTION" => Some(EntityKind::Institution),
            _ => None,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
