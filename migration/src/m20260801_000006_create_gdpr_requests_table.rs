use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GdprRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GdprRequests::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GdprRequests::UserId).uuid().not_null())
                    .col(ColumnDef::new(GdprRequests::Reason).text().not_null())
                    // PENDING | APPROVED | REJECTED
                    .col(
                        ColumnDef::new(GdprRequests::Status)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(ColumnDef::new(GdprRequests::ReviewedBy).uuid().null())
                    .col(
                        ColumnDef::new(GdprRequests::ReviewedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(GdprRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(GdprRequests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gdpr_requests_user_id")
                            .from(GdprRequests::Table, GdprRequests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_gdpr_requests_user_id")
                    .table(GdprRequests::Table)
                    .col(GdprRequests::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_gdpr_requests_status")
                    .table(GdprRequests::Table)
                    .col(GdprRequests::Status)
                    .to_owned(),
            )
            .await?;

        // ユーザーごとに PENDING は高々1件
        manager
            .create_index(
                Index::create()
                    .name("uq_gdpr_requests_pending_per_user")
                    .table(GdprRequests::Table)
                    .col(GdprRequests::UserId)
                    .and_where(Expr::col(GdprRequests::Status).eq("PENDING"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GdprRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum GdprRequests {
    Table,
    Id,
    UserId,
    Reason,
    Status,
    ReviewedBy,
    ReviewedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
