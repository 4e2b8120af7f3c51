use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Children::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Children::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Children::InstitutionId).uuid().not_null())
                    // グループ未所属の子どもを許容する
                    .col(ColumnDef::new(Children::GroupId).uuid().null())
                    .col(
                        ColumnDef::new(Children::FirstName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Children::LastName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Children::BirthDate).date().null())
                    // 保護者によるアプリ上の同意（キャッシュ値）
                    .col(
                        ColumnDef::new(Children::ConsentGiven)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Children::ConsentDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // 職員が記録した紙の同意書
                    .col(
                        ColumnDef::new(Children::ManualConsentGiven)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Children::ManualConsentDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Children::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Children::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Children::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_children_institution_id")
                            .from(Children::Table, Children::InstitutionId)
                            .to(Institutions::Table, Institutions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_children_group_id")
                            .from(Children::Table, Children::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_children_group_id")
                    .table(Children::Table)
                    .col(Children::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_children_deleted_at")
                    .table(Children::Table)
                    .col(Children::DeletedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Children::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Children {
    Table,
    Id,
    InstitutionId,
    GroupId,
    FirstName,
    LastName,
    BirthDate,
    ConsentGiven,
    ConsentDate,
    ManualConsentGiven,
    ManualConsentDate,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Institutions {
    Table,
    Id,
}

#[derive(Iden)]
enum Groups {
    Table,
    Id,
}
