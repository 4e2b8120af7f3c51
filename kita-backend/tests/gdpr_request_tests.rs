// tests/gdpr_request_tests.rs

mod common;

use common::{app_helper, test_data};
use kita_backend::domain::activity_log_model::{self, AuditAction};
use kita_backend::domain::gdpr_request_model::{self, RequestStatus};
use kita_backend::domain::user_model::{self, UserRole};
use kita_backend::error::AppError;
use kita_backend::repository::gdpr_request_repository::GdprRequestFilter;
use kita_backend::service::gdpr_request_service::{CreateDeletionRequest, RejectDeletionRequest};
use sea_orm::*;
use uuid::Uuid;

#[tokio::test]
async fn test_create_request_starts_pending() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Waldwichtel").await;
    let admin = test_data::insert_user(&app.db, Some(institution.id), UserRole::Admin, false).await;
    let parent = test_data::insert_user(&app.db, Some(institution.id), UserRole::Parent, true).await;

    let request = app
        .gdpr
        .create(
            &test_data::principal_for(&admin),
            CreateDeletionRequest {
                user_id: parent.id,
                reason: "Familie zieht um".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(request.status, RequestStatus::Pending.as_str());
    assert_eq!(request.user_id, parent.id);
    assert_eq!(request.reviewed_by, None);
    assert_eq!(request.reviewed_at, None);

    // 申請だけでは対象ユーザーは削除されない
    let user_row = user_model::Entity::find_by_id(parent.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user_row.deleted_at, None);

    let entries = activity_log_model::Entity::find()
        .filter(
            activity_log_model::Column::Action.eq(AuditAction::GdprDeleteRequestCreated.as_str()),
        )
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_create_request_requires_privileged_actor() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Waldwichtel").await;
    let parent = test_data::insert_user(&app.db, Some(institution.id), UserRole::Parent, true).await;
    let educator =
        test_data::insert_user(&app.db, Some(institution.id), UserRole::Educator, false).await;

    for actor in [&parent, &educator] {
        let err = app
            .gdpr
            .create(
                &test_data::principal_for(actor),
                CreateDeletionRequest {
                    user_id: parent.id,
                    reason: "Auskunftsersuchen".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }
}

#[tokio::test]
async fn test_create_request_unknown_user_not_found() {
    let app = app_helper::setup_app().await;
    let admin = test_data::insert_user(&app.db, None, UserRole::SuperAdmin, false).await;

    let err = app
        .gdpr
        .create(
            &test_data::principal_for(&admin),
            CreateDeletionRequest {
                user_id: Uuid::new_v4(),
                reason: "Unbekannt".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_duplicate_pending_request_conflicts() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Waldwichtel").await;
    let admin = test_data::insert_user(&app.db, Some(institution.id), UserRole::Admin, false).await;
    let parent = test_data::insert_user(&app.db, Some(institution.id), UserRole::Parent, true).await;
    let actor = test_data::principal_for(&admin);

    let payload = CreateDeletionRequest {
        user_id: parent.id,
        reason: "Familie zieht um".to_string(),
    };
    app.gdpr.create(&actor, payload.clone()).await.unwrap();

    let err = app.gdpr.create(&actor, payload).await.unwrap_err();
    match err {
        AppError::Conflict(msg) => {
            assert!(msg.contains("ausstehende Löschanfrage"));
        }
        other => panic!("expected Conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_new_request_allowed_after_terminal_state() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Waldwichtel").await;
    let admin = test_data::insert_user(&app.db, Some(institution.id), UserRole::Admin, false).await;
    let parent = test_data::insert_user(&app.db, Some(institution.id), UserRole::Parent, true).await;
    let actor = test_data::principal_for(&admin);

    let first = app
        .gdpr
        .create(
            &actor,
            CreateDeletionRequest {
                user_id: parent.id,
                reason: "Erster Versuch".to_string(),
            },
        )
        .await
        .unwrap();

    app.gdpr
        .reject(
            &actor,
            first.id,
            RejectDeletionRequest {
                reason: "unzureichende Begründung".to_string(),
            },
        )
        .await
        .unwrap();

    // 却下済みなので新しい申請を受け付ける
    let second = app
        .gdpr
        .create(
            &actor,
            CreateDeletionRequest {
                user_id: parent.id,
                reason: "Zweiter Versuch".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(second.status, RequestStatus::Pending.as_str());
}

#[tokio::test]
async fn test_approve_deletes_subject_in_same_transaction() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Waldwichtel").await;
    let admin = test_data::insert_user(&app.db, Some(institution.id), UserRole::Admin, false).await;
    let parent = test_data::insert_user(&app.db, Some(institution.id), UserRole::Parent, true).await;
    let actor = test_data::principal_for(&admin);

    let request = app
        .gdpr
        .create(
            &actor,
            CreateDeletionRequest {
                user_id: parent.id,
                reason: "Familie zieht um".to_string(),
            },
        )
        .await
        .unwrap();

    let approved = app.gdpr.approve(&actor, request.id).await.unwrap();
    assert_eq!(approved.status, RequestStatus::Approved.as_str());
    assert_eq!(approved.reviewed_by, Some(admin.id));
    assert_eq!(approved.reviewed_at, Some(app_helper::base_time()));

    let user_row = user_model::Entity::find_by_id(parent.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user_row.deleted_at, Some(app_helper::base_time()));

    let entries = activity_log_model::Entity::find()
        .filter(activity_log_model::Column::Action.eq(AuditAction::GdprDeleteUser.as_str()))
        .all(&app.db)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].entity_id, Some(parent.id));
}

#[tokio::test]
async fn test_approve_rolls_back_when_subject_is_super_admin() {
    let app = app_helper::setup_app().await;
    let admin = test_data::insert_user(&app.db, None, UserRole::SuperAdmin, false).await;
    let subject = test_data::insert_user(&app.db, None, UserRole::SuperAdmin, false).await;
    let actor = test_data::principal_for(&admin);

    let request = app
        .gdpr
        .create(
            &actor,
            CreateDeletionRequest {
                user_id: subject.id,
                reason: "Fehlerhafte Anfrage".to_string(),
            },
        )
        .await
        .unwrap();

    let err = app.gdpr.approve(&actor, request.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // ロールバックにより申請は PENDING のまま、対象も無傷
    let request_row = gdpr_request_model::Entity::find_by_id(request.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(request_row.status, RequestStatus::Pending.as_str());
    assert_eq!(request_row.reviewed_by, None);

    let user_row = user_model::Entity::find_by_id(subject.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user_row.deleted_at, None);
}

#[tokio::test]
async fn test_terminal_requests_cannot_transition_again() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Waldwichtel").await;
    let admin = test_data::insert_user(&app.db, Some(institution.id), UserRole::Admin, false).await;
    let parent = test_data::insert_user(&app.db, Some(institution.id), UserRole::Parent, true).await;
    let actor = test_data::principal_for(&admin);

    let request = app
        .gdpr
        .create(
            &actor,
            CreateDeletionRequest {
                user_id: parent.id,
                reason: "Familie zieht um".to_string(),
            },
        )
        .await
        .unwrap();
    let approved = app.gdpr.approve(&actor, request.id).await.unwrap();

    let err = app.gdpr.approve(&actor, request.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = app
        .gdpr
        .reject(
            &actor,
            request.id,
            RejectDeletionRequest {
                reason: "zu spät".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // 失敗した遷移は行を変更しない
    let row = gdpr_request_model::Entity::find_by_id(request.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.status, approved.status);
    assert_eq!(row.reason, approved.reason);
    assert_eq!(row.reviewed_at, approved.reviewed_at);
}

#[tokio::test]
async fn test_reject_appends_reason_and_keeps_original() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Waldwichtel").await;
    let admin = test_data::insert_user(&app.db, Some(institution.id), UserRole::Admin, false).await;
    let parent = test_data::insert_user(&app.db, Some(institution.id), UserRole::Parent, true).await;
    let actor = test_data::principal_for(&admin);

    let request = app
        .gdpr
        .create(
            &actor,
            CreateDeletionRequest {
                user_id: parent.id,
                reason: "Familie zieht um".to_string(),
            },
        )
        .await
        .unwrap();

    let rejected = app
        .gdpr
        .reject(
            &actor,
            request.id,
            RejectDeletionRequest {
                reason: "unzureichende Begründung".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(rejected.status, RequestStatus::Rejected.as_str());
    assert_eq!(
        rejected.reason,
        "Familie zieht um\nABGELEHNT: unzureichende Begründung"
    );
    assert_eq!(rejected.reviewed_by, Some(admin.id));

    // 対象ユーザーは削除されない
    let user_row = user_model::Entity::find_by_id(parent.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user_row.deleted_at, None);
}

#[tokio::test]
async fn test_reject_requires_reason() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Waldwichtel").await;
    let admin = test_data::insert_user(&app.db, Some(institution.id), UserRole::Admin, false).await;
    let parent = test_data::insert_user(&app.db, Some(institution.id), UserRole::Parent, true).await;
    let actor = test_data::principal_for(&admin);

    let request = app
        .gdpr
        .create(
            &actor,
            CreateDeletionRequest {
                user_id: parent.id,
                reason: "Familie zieht um".to_string(),
            },
        )
        .await
        .unwrap();

    let err = app
        .gdpr
        .reject(
            &actor,
            request.id,
            RejectDeletionRequest {
                reason: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationFailure(_)));

    // 申請は PENDING のまま
    let row = app.gdpr.get(request.id).await.unwrap();
    assert_eq!(row.status, RequestStatus::Pending.as_str());
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Waldwichtel").await;
    let admin = test_data::insert_user(&app.db, Some(institution.id), UserRole::Admin, false).await;
    let parent_a =
        test_data::insert_user(&app.db, Some(institution.id), UserRole::Parent, true).await;
    let parent_b =
        test_data::insert_user(&app.db, Some(institution.id), UserRole::Parent, true).await;
    let actor = test_data::principal_for(&admin);

    let request_a = app
        .gdpr
        .create(
            &actor,
            CreateDeletionRequest {
                user_id: parent_a.id,
                reason: "Anfrage A".to_string(),
            },
        )
        .await
        .unwrap();
    app.gdpr
        .create(
            &actor,
            CreateDeletionRequest {
                user_id: parent_b.id,
                reason: "Anfrage B".to_string(),
            },
        )
        .await
        .unwrap();

    app.gdpr
        .reject(
            &actor,
            request_a.id,
            RejectDeletionRequest {
                reason: "unzureichende Begründung".to_string(),
            },
        )
        .await
        .unwrap();

    let (pending, total) = app
        .gdpr
        .list(GdprRequestFilter {
            status: Some(RequestStatus::Pending),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].user_id, parent_b.id);

    let (all, total) = app.gdpr.list(GdprRequestFilter::default()).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(all.len(), 2);
}
