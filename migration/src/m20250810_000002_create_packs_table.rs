use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Packs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Packs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Packs::UserId).uuid().not_null())
                    .col(ColumnDef::new(Packs::CreditsTotal).integer().not_null())
                    .col(
                        ColumnDef::new(Packs::CreditsRemaining)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Packs::CheckoutSessionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Packs::PurchasedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_packs_user_id")
                            .from(Packs::Table, Packs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Webhook retries must not fulfill the same checkout twice
        manager
            .create_index(
                Index::create()
                    .name("idx_packs_checkout_session_id")
                    .table(Packs::Table)
                    .col(Packs::CheckoutSessionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Debit scans packs oldest-first per user
        manager
            .create_index(
                Index::create()
                    .name("idx_packs_user_purchased_at")
                    .table(Packs::Table)
                    .col(Packs::UserId)
                    .col(Packs::PurchasedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Packs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Packs {
    Table,
    Id,
    UserId,
    CreditsTotal,
    CreditsRemaining,
    CheckoutSessionId,
    PurchasedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
