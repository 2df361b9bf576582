//! Create `car` table with FK to `user`.
//!
//! One row per ad; `features` is a JSONB document of boolean flags.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Car::Table)
                    .if_not_exists()
                    .col(uuid(Car::Id).primary_key())
                    .col(string_len(Car::Name, 100).not_null())
                    .col(text(Car::Description).not_null())
                    .col(big_integer(Car::Price).not_null())
                    .col(integer(Car::Year).not_null())
                    .col(big_integer(Car::Mileage).not_null())
                    .col(integer(Car::EngineCapacity).not_null())
                    .col(string_len(Car::Fuel, 32).not_null())
                    .col(string_len(Car::Transmission, 32).not_null())
                    .col(string_len(Car::RegisteredIn, 128).not_null())
                    .col(string_len(Car::Assembly, 32).not_null())
                    .col(string_len(Car::BodyType, 32).not_null())
                    .col(string_len(Car::Color, 64).not_null())
                    .col(string_len(Car::Status, 32).not_null())
                    .col(timestamp_with_time_zone(Car::ExpiryDate).not_null())
                    .col(uuid(Car::CreatedBy).not_null())
                    .col(json_binary(Car::Features).not_null())
                    .col(timestamp_with_time_zone(Car::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Car::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_car_user")
                            .from(Car::Table, Car::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Car::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Car {
    Table,
    Id,
    Name,
    Description,
    Price,
    Year,
    Mileage,
    EngineCapacity,
    Fuel,
    Transmission,
    RegisteredIn,
    Assembly,
    BodyType,
    Color,
    Status,
    ExpiryDate,
    CreatedBy,
    Features,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
