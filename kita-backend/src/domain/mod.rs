// src/domain/mod.rs
pub mod activity_log_model;
pub mod attendance_model;
pub mod child_guardian_model;
pub mod child_model;
pub mod entity_kind;
pub mod gdpr_request_model;
pub mod group_model;
pub mod institution_model;
pub mod message_model;
pub mod note_model;
pub mod notification_model;
pub mod personal_task_model;
pub mod principal;
pub mod user_model;
