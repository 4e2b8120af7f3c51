// src/service/mod.rs
pub mod attendance_service;
pub mod audit_log_service;
pub mod consent_service;
pub mod deletion_service;
pub mod export_service;
pub mod gdpr_request_service;
pub mod note_service;
pub mod retention_service;
