// tests/common/db.rs

use kita_backend::db::DbPool;
use kita_backend::domain::{
    activity_log_model, attendance_model, child_guardian_model, child_model, gdpr_request_model,
    group_model, institution_model, message_model, note_model, notification_model,
    personal_task_model, user_model,
};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DbBackend, EntityTrait, Schema};

/// インメモリSQLiteでテスト用DBを用意する。
///
/// `sqlite::memory:` は接続ごとに別DBになるため、プールは必ず1接続に固定する。
/// 外部キーはマイグレーション側（PostgreSQL）で定義しており、エンティティ定義から
/// 生成するテストスキーマでは弱参照テーブルにまで制約が付いてしまうので無効化する。
pub async fn setup_test_db() -> DbPool {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_string());
    opt.max_connections(1).sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("failed to open in-memory sqlite");

    db.execute_unprepared("PRAGMA foreign_keys = OFF;")
        .await
        .expect("failed to disable foreign keys");

    create_tables(&db).await;
    db
}

async fn create_tables(db: &DbPool) {
    let schema = Schema::new(DbBackend::Sqlite);
    let backend = db.get_database_backend();

    async fn create<E: EntityTrait>(db: &DbPool, schema: &Schema, backend: DbBackend, entity: E) {
        let stmt = schema.create_table_from_entity(entity);
        db.execute_raw(backend.build(&stmt))
            .await
            .unwrap_or_else(|e| panic!("failed to create table: {e}"));
    }

    create(db, &schema, backend, institution_model::Entity).await;
    create(db, &schema, backend, user_model::Entity).await;
    create(db, &schema, backend, group_model::Entity).await;
    create(db, &schema, backend, child_model::Entity).await;
    create(db, &schema, backend, child_guardian_model::Entity).await;
    create(db, &schema, backend, gdpr_request_model::Entity).await;
    create(db, &schema, backend, activity_log_model::Entity).await;
    create(db, &schema, backend, message_model::Entity).await;
    create(db, &schema, backend, note_model::Entity).await;
    create(db, &schema, backend, notification_model::Entity).await;
    create(db, &schema, backend, personal_task_model::Entity).await;
    create(db, &schema, backend, attendance_model::Entity).await;
}
