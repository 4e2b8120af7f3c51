// tests/note_tests.rs

mod common;

use common::{app_helper, test_data};
use kita_backend::domain::activity_log_model::{self, AuditAction};
use kita_backend::domain::user_model::UserRole;
use kita_backend::error::AppError;
use kita_backend::service::note_service::CreateNoteRequest;
use sea_orm::*;

#[tokio::test]
async fn test_note_creation_requires_consent() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Löwenzahn").await;
    let educator =
        test_data::insert_user(&app.db, Some(institution.id), UserRole::Educator, false).await;
    let child = test_data::insert_child(&app.db, institution.id, None).await;

    let err = app
        .notes
        .create(
            &test_data::principal_for(&educator),
            CreateNoteRequest {
                child_id: child.id,
                content: "Hat heute gut gegessen.".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConsentRequired(_)));
}

#[tokio::test]
async fn test_note_creation_with_consent_writes_audit_entry() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Löwenzahn").await;
    let admin = test_data::insert_user(&app.db, Some(institution.id), UserRole::Admin, false).await;
    let educator =
        test_data::insert_user(&app.db, Some(institution.id), UserRole::Educator, false).await;
    let child = test_data::insert_child(&app.db, institution.id, None).await;

    app.consent
        .set_manual_consent(&test_data::principal_for(&admin), child.id, true)
        .await
        .unwrap();

    let note = app
        .notes
        .create(
            &test_data::principal_for(&educator),
            CreateNoteRequest {
                child_id: child.id,
                content: "Hat heute gut gegessen.".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(note.author_id, educator.id);

    let entries = activity_log_model::Entity::find()
        .filter(activity_log_model::Column::Action.eq(AuditAction::NoteCreated.as_str()))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entity_id, Some(note.id));
}

#[tokio::test]
async fn test_note_content_must_not_be_empty() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Löwenzahn").await;
    let educator =
        test_data::insert_user(&app.db, Some(institution.id), UserRole::Educator, false).await;
    let child = test_data::insert_child(&app.db, institution.id, None).await;

    let err = app
        .notes
        .create(
            &test_data::principal_for(&educator),
            CreateNoteRequest {
                child_id: child.id,
                content: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationFailure(_)));
}
