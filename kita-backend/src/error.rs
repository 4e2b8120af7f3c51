// src/error.rs

use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DbErr(#[from] DbErr),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Validation failed")]
    ValidationFailure(#[from] ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 同意チェックの拒否。一般的な権限エラーとは区別して返す。
    #[error("Consent required: {0}")]
    ConsentRequired(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl AppError {
    /// 呼び出し側（HTTP層など）がレスポンス整形に使う安定した識別子
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::DbErr(_) => "database_error",
            AppError::NotFound(_) => "not_found",
            AppError::ValidationError(_) | AppError::ValidationFailure(_) => "validation_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::Forbidden(_) => "forbidden",
            AppError::ConsentRequired(_) => "consent_required",
            AppError::Conflict(_) => "conflict",
            AppError::InternalServerError(_) => "internal_server_error",
        }
    }

    /// ストア接続障害のみこの層では回復不能として扱う
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AppError::DbErr(_) | AppError::InternalServerError(_)
        )
    }
}

// Result 型のエイリアス
pub type AppResult<T> = Result<T, AppError>;

/// 統一的なエラーレスポンス構造
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    pub error_type: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let message = err.to_string();
        Self {
            success: false,
            error: message.clone(),
            message,
            error_type: err.error_type().to_string(),
        }
    }
}
