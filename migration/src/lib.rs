pub use sea_orm_migration::prelude::*;

mod m20260801_000001_create_institutions_table;
mod m20260801_000002_create_users_table;
mod m20260801_000003_create_groups_table;
mod m20260801_000004_create_children_table;
mod m20260801_000005_create_child_guardians_table;
mod m20260801_000006_create_gdpr_requests_table;
mod m20260801_000007_create_activity_logs_table;
mod m20260801_000008_create_subject_data_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260801_000001_create_institutions_table::Migration),
            Box::new(m20260801_000002_create_users_table::Migration),
            Box::new(m20260801_000003_create_groups_table::Migration),
            Box::new(m20260801_000004_create_children_table::Migration),
            Box::new(m20260801_000005_create_child_guardians_table::Migration),
            Box::new(m20260801_000006_create_gdpr_requests_table::Migration),
            Box::new(m20260801_000007_create_activity_logs_table::Migration),
            Box::new(m20260801_000008_create_subject_data_tables::Migration),
        ]
    }
}
