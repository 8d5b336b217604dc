use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Digests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Digests::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Digests::UserId).uuid().not_null())
                    .col(ColumnDef::new(Digests::VideoId).string().not_null())
                    .col(ColumnDef::new(Digests::VideoTitle).string().not_null())
                    .col(ColumnDef::new(Digests::Markdown).text().not_null())
                    .col(
                        ColumnDef::new(Digests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_digests_user_id")
                            .from(Digests::Table, Digests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one digest per (user, video); the losing writer of a
        // concurrent create is rejected here, never overwritten.
        manager
            .create_index(
                Index::create()
                    .name("idx_digests_user_video")
                    .table(Digests::Table)
                    .col(Digests::UserId)
                    .col(Digests::VideoId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // History listing is newest-first
        manager
            .create_index(
                Index::create()
                    .name("idx_digests_user_created_at")
                    .table(Digests::Table)
                    .col(Digests::UserId)
                    .col(Digests::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Digests::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Digests {
    Table,
    Id,
    UserId,
    VideoId,
    VideoTitle,
    Markdown,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
