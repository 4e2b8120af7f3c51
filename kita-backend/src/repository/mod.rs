// src/repository/mod.rs
pub mod activity_log_repository;
pub mod child_repository;
pub mod gdpr_request_repository;
pub mod group_repository;
pub mod institution_repository;
pub mod user_repository;
