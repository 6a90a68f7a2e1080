//! Create `profile` table.
//!
//! Profiles belong to a user account rather than an organization, so there
//! is no tenant FK here.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(uuid(Profile::Id).primary_key())
                    .col(uuid(Profile::UserId).not_null())
                    .col(string_len(Profile::FirstName, 50).not_null())
                    .col(string_len(Profile::LastName, 50).not_null())
                    .col(string_len_null(Profile::Address, 255))
                    .col(string_len_null(Profile::Phone, 50))
                    .col(string_len_null(Profile::Photo, 512))
                    .col(string_len_null(Profile::Color, 32))
                    .col(string_len_null(Profile::Url, 512))
                    .col(string_len_null(Profile::CompanyName, 255))
                    .col(string_len_null(Profile::Occupation, 255))
                    .col(text_null(Profile::Description))
                    .col(timestamp_with_time_zone_null(Profile::Birthday))
                    .col(timestamp_with_time_zone(Profile::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Profile::UpdatedAt).not_null())
                    .col(
                        ColumnDef::new(Profile::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Profile::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Profile {
    Table,
    Id,
    UserId,
    FirstName,
    LastName,
    Address,
    Phone,
    Photo,
    Color,
    Url,
    CompanyName,
    Occupation,
    Description,
    Birthday,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}
