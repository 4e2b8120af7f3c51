// tests/common/test_data.rs

use chrono::{DateTime, Utc};
use kita_backend::db::DbPool;
use kita_backend::domain::user_model::UserRole;
use kita_backend::domain::{
    child_guardian_model, child_model, group_model, institution_model, message_model, note_model,
    notification_model, personal_task_model, user_model,
};
use kita_backend::domain::principal::Principal;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use super::app_helper::base_time;

pub async fn insert_institution(db: &DbPool, name: &str) -> institution_model::Model {
    institution_model::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        deleted_at: Set(None),
        created_at: Set(base_time()),
        updated_at: Set(base_time()),
    }
    .insert(db)
    .await
    .expect("failed to insert institution")
}

pub async fn insert_user(
    db: &DbPool,
    institution_id: Option<Uuid>,
    role: UserRole,
    consent_given: bool,
) -> user_model::Model {
    let id = Uuid::new_v4();
    user_model::ActiveModel {
        id: Set(id),
        email: Set(format!("{id}@example.com")),
        display_name: Set(format!("user-{}", &id.to_string()[..8])),
        role: Set(role.as_str().to_string()),
        institution_id: Set(institution_id),
        consent_given: Set(consent_given),
        consent_date: Set(consent_given.then(base_time)),
        deleted_at: Set(None),
        created_at: Set(base_time()),
        updated_at: Set(base_time()),
    }
    .insert(db)
    .await
    .expect("failed to insert user")
}

pub async fn insert_group(db: &DbPool, institution_id: Uuid, name: &str) -> group_model::Model {
    group_model::ActiveModel {
        id: Set(Uuid::new_v4()),
        institution_id: Set(institution_id),
        name: Set(name.to_string()),
        deleted_at: Set(None),
        created_at: Set(base_time()),
        updated_at: Set(base_time()),
    }
    .insert(db)
    .await
    .expect("failed to insert group")
}

pub async fn insert_child(
    db: &DbPool,
    institution_id: Uuid,
    group_id: Option<Uuid>,
) -> child_model::Model {
    let id = Uuid::new_v4();
    child_model::ActiveModel {
        id: Set(id),
        institution_id: Set(institution_id),
        group_id: Set(group_id),
        first_name: Set("Mia".to_string()),
        last_name: Set(format!("Testkind-{}", &id.to_string()[..8])),
        birth_date: Set(None),
        consent_given: Set(false),
        consent_date: Set(None),
        manual_consent_given: Set(false),
        manual_consent_date: Set(None),
        deleted_at: Set(None),
        created_at: Set(base_time()),
        updated_at: Set(base_time()),
    }
    .insert(db)
    .await
    .expect("failed to insert child")
}

pub async fn link_guardian(db: &DbPool, child_id: Uuid, user_id: Uuid) {
    child_guardian_model::ActiveModel {
        child_id: Set(child_id),
        user_id: Set(user_id),
        created_at: Set(base_time()),
    }
    .insert(db)
    .await
    .expect("failed to link guardian");
}

pub fn principal_for(user: &user_model::Model) -> Principal {
    Principal::from(user)
}

pub async fn insert_message(
    db: &DbPool,
    sender_id: Uuid,
    recipient_id: Uuid,
    deleted_at: Option<DateTime<Utc>>,
) -> message_model::Model {
    message_model::ActiveModel {
        id: Set(Uuid::new_v4()),
        sender_id: Set(sender_id),
        recipient_id: Set(recipient_id),
        subject: Set(Some("Elternabend".to_string())),
        body: Set("Bitte um Rückmeldung bis Freitag.".to_string()),
        deleted_at: Set(deleted_at),
        created_at: Set(base_time()),
    }
    .insert(db)
    .await
    .expect("failed to insert message")
}

pub async fn insert_note(
    db: &DbPool,
    child_id: Uuid,
    author_id: Uuid,
    deleted_at: Option<DateTime<Utc>>,
) -> note_model::Model {
    note_model::ActiveModel {
        id: Set(Uuid::new_v4()),
        child_id: Set(child_id),
        author_id: Set(author_id),
        content: Set("Hat heute gut gegessen.".to_string()),
        deleted_at: Set(deleted_at),
        created_at: Set(base_time()),
    }
    .insert(db)
    .await
    .expect("failed to insert note")
}

pub async fn insert_notification(
    db: &DbPool,
    user_id: Uuid,
    deleted_at: Option<DateTime<Utc>>,
) -> notification_model::Model {
    notification_model::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        title: Set("Neue Nachricht".to_string()),
        body: Set("Sie haben eine neue Nachricht erhalten.".to_string()),
        read_at: Set(None),
        deleted_at: Set(deleted_at),
        created_at: Set(base_time()),
    }
    .insert(db)
    .await
    .expect("failed to insert notification")
}

pub async fn insert_personal_task(
    db: &DbPool,
    user_id: Uuid,
    deleted_at: Option<DateTime<Utc>>,
) -> personal_task_model::Model {
    personal_task_model::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        title: Set("Wochenplan vorbereiten".to_string()),
        due_date: Set(None),
        completed: Set(false),
        deleted_at: Set(deleted_at),
        created_at: Set(base_time()),
    }
    .insert(db)
    .await
    .expect("failed to insert personal task")
}
