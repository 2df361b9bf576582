use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Car: owner scoping is on every authenticated query
        manager
            .create_index(
                Index::create()
                    .name("idx_car_created_by")
                    .table(Car::Table)
                    .col(Car::CreatedBy)
                    .to_owned(),
            )
            .await?;

        // Car: active/expired listings split on expiry_date
        manager
            .create_index(
                Index::create()
                    .name("idx_car_expiry_date")
                    .table(Car::Table)
                    .col(Car::ExpiryDate)
                    .to_owned(),
            )
            .await?;

        // Car: default sort is newest-first
        manager
            .create_index(
                Index::create()
                    .name("idx_car_created_at")
                    .table(Car::Table)
                    .col(Car::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_car_created_by").table(Car::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_car_expiry_date").table(Car::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_car_created_at").table(Car::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Car { Table, CreatedBy, ExpiryDate, CreatedAt }
