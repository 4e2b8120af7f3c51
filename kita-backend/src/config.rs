// src/config.rs

use crate::domain::entity_kind::EntityKind;
use chrono::Duration;
use std::env;

/// ソフト削除済みデータの保持期間設定。
/// エンティティ種別ごとの日数で、経過後にパージが許可される。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub user_days: i64,
    pub child_days: i64,
    pub group_days: i64,
    pub institution_days: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            user_days: 90,
            child_days: 90,
            group_days: 30,
            institution_days: 365,
        }
    }
}

impl RetentionPolicy {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            user_days: env_days("RETENTION_DAYS_USER", defaults.user_days),
            child_days: env_days("RETENTION_DAYS_CHILD", defaults.child_days),
            group_days: env_days("RETENTION_DAYS_GROUP", defaults.group_days),
            institution_days: env_days("RETENTION_DAYS_INSTITUTION", defaults.institution_days),
        }
    }

    pub fn period_for(&self, kind: EntityKind) -> Duration {
        let days = match kind {
            EntityKind::User => self.user_days,
            EntityKind::Child => self.child_days,
            EntityKind::Group => self.group_days,
            EntityKind::Institution => self.institution_days,
        };
        Duration::days(days)
    }
}

fn env_days(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub retention: RetentionPolicy,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        Ok(Self {
            environment,
            database_url: env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .map_err(|_| "Invalid DB_MAX_CONNECTIONS value")?,
            retention: RetentionPolicy::from_env(),
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    #[allow(dead_code)]
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// テスト用の設定を作成
    pub fn for_testing() -> Self {
        Self {
            environment: "test".to_string(),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite::memory:".to_string()),
            db_max_connections: 5,
            retention: RetentionPolicy::default(),
        }
    }
}
