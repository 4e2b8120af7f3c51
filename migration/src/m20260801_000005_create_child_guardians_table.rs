use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChildGuardians::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ChildGuardians::ChildId).uuid().not_null())
                    .col(ColumnDef::new(ChildGuardians::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(ChildGuardians::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_child_guardians")
                            .col(ChildGuardians::ChildId)
                            .col(ChildGuardians::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_child_guardians_child_id")
                            .from(ChildGuardians::Table, ChildGuardians::ChildId)
                            .to(Children::Table, Children::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_child_guardians_user_id")
                            .from(ChildGuardians::Table, ChildGuardians::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_child_guardians_user_id")
                    .table(ChildGuardians::Table)
                    .col(ChildGuardians::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChildGuardians::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ChildGuardians {
    Table,
    ChildId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Children {
    Table,
    Id,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
