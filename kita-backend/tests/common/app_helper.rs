// tests/common/app_helper.rs

use chrono::{DateTime, TimeZone, Utc};
use kita_backend::config::RetentionPolicy;
use kita_backend::db::DbPool;
use kita_backend::service::attendance_service::AttendanceService;
use kita_backend::service::audit_log_service::AuditLogService;
use kita_backend::service::consent_service::ConsentService;
use kita_backend::service::deletion_service::DeletionService;
use kita_backend::service::export_service::ExportService;
use kita_backend::service::gdpr_request_service::GdprRequestService;
use kita_backend::service::note_service::NoteService;
use kita_backend::service::retention_service::RetentionService;
use kita_backend::utils::clock::FixedClock;
use std::sync::Arc;

/// テストで使う基準時刻
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
}

/// 全サービスを固定時計で束ねたテスト用アプリ
pub struct TestApp {
    pub db: DbPool,
    pub clock: Arc<FixedClock>,
    pub audit: Arc<AuditLogService>,
    pub consent: Arc<ConsentService>,
    pub deletion: Arc<DeletionService>,
    pub gdpr: GdprRequestService,
    pub retention: RetentionService,
    pub export: ExportService,
    pub attendance: AttendanceService,
    pub notes: NoteService,
}

pub async fn setup_app() -> TestApp {
    setup_app_with_policy(RetentionPolicy::default()).await
}

pub async fn setup_app_with_policy(policy: RetentionPolicy) -> TestApp {
    super::init_test_env();

    let db = super::db::setup_test_db().await;
    let clock = Arc::new(FixedClock::new(base_time()));
    let clock_dyn: Arc<dyn kita_backend::utils::clock::Clock> = clock.clone();

    let audit = Arc::new(AuditLogService::new(db.clone()));
    let consent = Arc::new(ConsentService::new(
        db.clone(),
        clock_dyn.clone(),
        audit.clone(),
    ));
    let deletion = Arc::new(DeletionService::new(
        db.clone(),
        clock_dyn.clone(),
        policy,
        audit.clone(),
    ));
    let gdpr = GdprRequestService::new(
        db.clone(),
        clock_dyn.clone(),
        deletion.clone(),
        audit.clone(),
    );
    let retention = RetentionService::new(deletion.clone(), audit.clone(), clock_dyn.clone());
    let export = ExportService::new(db.clone(), clock_dyn.clone(), audit.clone());
    let attendance = AttendanceService::new(
        db.clone(),
        clock_dyn.clone(),
        consent.clone(),
        audit.clone(),
    );
    let notes = NoteService::new(db.clone(), clock_dyn, consent.clone(), audit.clone());

    TestApp {
        db,
        clock,
        audit,
        consent,
        deletion,
        gdpr,
        retention,
        export,
        attendance,
        notes,
    }
}
