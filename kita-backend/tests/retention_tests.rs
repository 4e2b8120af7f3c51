// tests/retention_tests.rs

mod common;

use chrono::Duration;
use common::{app_helper, test_data};
use kita_backend::config::RetentionPolicy;
use kita_backend::domain::activity_log_model::{self, AuditAction};
use kita_backend::domain::entity_kind::EntityKind;
use kita_backend::domain::user_model::{self, UserRole};
use kita_backend::domain::{child_model, group_model};
use sea_orm::*;

#[tokio::test]
async fn test_cleanup_purges_only_expired_tombstones() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Morgenstern").await;
    let admin = test_data::insert_user(&app.db, Some(institution.id), UserRole::Admin, false).await;

    let expired = test_data::insert_user(&app.db, Some(institution.id), UserRole::Parent, false).await;
    let recent = test_data::insert_user(&app.db, Some(institution.id), UserRole::Parent, false).await;
    let live = test_data::insert_user(&app.db, Some(institution.id), UserRole::Parent, false).await;

    app.deletion
        .soft_delete(EntityKind::User, expired.id, admin.id)
        .await
        .unwrap();

    // 60日後にもう1人削除、さらに40日後に掃除を実行。
    // 最初の削除は100日経過（保持期間90日超）、2人目は40日でまだ残る。
    app.clock.advance(Duration::days(60));
    app.deletion
        .soft_delete(EntityKind::User, recent.id, admin.id)
        .await
        .unwrap();
    app.clock.advance(Duration::days(40));

    let summary = app.retention.run_cleanup().await.unwrap();
    assert_eq!(summary.purged_users, 1);
    assert_eq!(summary.total(), 1);

    assert!(user_model::Entity::find_by_id(expired.id)
        .one(&app.db)
        .await
        .unwrap()
        .is_none());
    assert!(user_model::Entity::find_by_id(recent.id)
        .one(&app.db)
        .await
        .unwrap()
        .is_some());
    // deleted_at が無い行は対象外
    assert!(user_model::Entity::find_by_id(live.id)
        .one(&app.db)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_cleanup_honours_per_kind_retention_periods() {
    // グループは5日、子どもは30日で切れる短縮ポリシー
    let policy = RetentionPolicy {
        user_days: 30,
        child_days: 30,
        group_days: 5,
        institution_days: 365,
    };
    let app = app_helper::setup_app_with_policy(policy).await;
    let institution = test_data::insert_institution(&app.db, "Kita Morgenstern").await;
    let admin = test_data::insert_user(&app.db, Some(institution.id), UserRole::Admin, false).await;
    let group = test_data::insert_group(&app.db, institution.id, "Bärengruppe").await;
    let child = test_data::insert_child(&app.db, institution.id, None).await;

    app.deletion
        .soft_delete(EntityKind::Group, group.id, admin.id)
        .await
        .unwrap();
    app.deletion
        .soft_delete(EntityKind::Child, child.id, admin.id)
        .await
        .unwrap();

    // 10日経過: グループの保持期間だけが切れている
    app.clock.advance(Duration::days(10));
    let summary = app.retention.run_cleanup().await.unwrap();
    assert_eq!(summary.purged_groups, 1);
    assert_eq!(summary.purged_children, 0);

    assert!(group_model::Entity::find_by_id(group.id)
        .one(&app.db)
        .await
        .unwrap()
        .is_none());
    assert!(child_model::Entity::find_by_id(child.id)
        .one(&app.db)
        .await
        .unwrap()
        .is_some());

    // さらに25日でこどもの分も切れる
    app.clock.advance(Duration::days(25));
    let summary = app.retention.run_cleanup().await.unwrap();
    assert_eq!(summary.purged_children, 1);
}

#[tokio::test]
async fn test_cleanup_is_idempotent() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Morgenstern").await;
    let admin = test_data::insert_user(&app.db, Some(institution.id), UserRole::Admin, false).await;
    let parent = test_data::insert_user(&app.db, Some(institution.id), UserRole::Parent, false).await;

    app.deletion
        .soft_delete(EntityKind::User, parent.id, admin.id)
        .await
        .unwrap();
    app.clock.advance(Duration::days(120));

    let first = app.retention.run_cleanup().await.unwrap();
    assert_eq!(first.purged_users, 1);

    // 2回目の実行では何も起きない
    let second = app.retention.run_cleanup().await.unwrap();
    assert_eq!(second.total(), 0);

    let entries = activity_log_model::Entity::find()
        .filter(activity_log_model::Column::Action.eq(AuditAction::RetentionPurge.as_str()))
        .all(&app.db)
        .await
        .unwrap();
    // 空振り実行は監査に記録されない
    assert_eq!(entries.len(), 1);
    // システム実行なのでアクターは無し
    assert_eq!(entries[0].user_id, None);
}

#[tokio::test]
async fn test_single_purge_respects_retention_window() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Morgenstern").await;
    let admin = test_data::insert_user(&app.db, Some(institution.id), UserRole::Admin, false).await;
    let child = test_data::insert_child(&app.db, institution.id, None).await;

    // 生存中の行は絶対に物理削除されない
    assert!(!app.deletion.purge(EntityKind::Child, child.id).await.unwrap());

    app.deletion
        .soft_delete(EntityKind::Child, child.id, admin.id)
        .await
        .unwrap();

    // 保持期間内はまだ消えない
    app.clock.advance(Duration::days(30));
    assert!(!app.deletion.purge(EntityKind::Child, child.id).await.unwrap());

    app.clock.advance(Duration::days(90));
    assert!(app.deletion.purge(EntityKind::Child, child.id).await.unwrap());

    // 既に消えているので2回目は false
    assert!(!app.deletion.purge(EntityKind::Child, child.id).await.unwrap());
}

#[tokio::test]
async fn test_audit_log_survives_purge_of_referenced_rows() {
    let app = app_helper::setup_app().await;
    let institution = test_data::insert_institution(&app.db, "Kita Morgenstern").await;
    let admin = test_data::insert_user(&app.db, Some(institution.id), UserRole::Admin, false).await;
    let parent = test_data::insert_user(&app.db, Some(institution.id), UserRole::Parent, false).await;

    app.deletion
        .soft_delete(EntityKind::User, parent.id, admin.id)
        .await
        .unwrap();
    app.clock.advance(Duration::days(120));
    app.retention.run_cleanup().await.unwrap();

    // 削除とパージの両方のエントリが参照先の消滅後も残る
    let entries = activity_log_model::Entity::find()
        .all(&app.db)
        .await
        .unwrap();
    assert!(entries
        .iter()
        .any(|e| e.action == AuditAction::GdprDeleteUser.as_str()
            && e.entity_id == Some(parent.id)));
    assert!(entries
        .iter()
        .any(|e| e.action == AuditAction::RetentionPurge.as_str()));
}
