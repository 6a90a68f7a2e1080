//! Create `animal` table with FKs to `organization` and `location`.
//!
//! Enum-like columns (gender, type, phase, status) are stored as upper-snake text.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Animal::Table)
                    .if_not_exists()
                    .col(uuid(Animal::Id).primary_key())
                    .col(uuid(Animal::OrganizationId).not_null())
                    .col(string_len(Animal::Code, 100).not_null())
                    .col(string_len_null(Animal::CodeFather, 100))
                    .col(string_len_null(Animal::CodeMother, 100))
                    .col(double_null(Animal::Weight))
                    .col(timestamp_with_time_zone(Animal::Birthday).not_null())
                    .col(string_len(Animal::Gender, 32).not_null())
                    .col(string_len(Animal::AnimalType, 32).not_null())
                    .col(string_len(Animal::ProductionPhase, 32).not_null())
                    .col(string_len_null(Animal::ElectronicCode, 100))
                    .col(string_len(Animal::Status, 32).not_null())
                    .col(uuid(Animal::LocationId).not_null())
                    .col(uuid_null(Animal::BreedId))
                    .col(uuid_null(Animal::UserCreatedId))
                    .col(timestamp_with_time_zone(Animal::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Animal::UpdatedAt).not_null())
                    .col(
                        ColumnDef::new(Animal::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_animal_organization")
                            .from(Animal::Table, Animal::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_animal_location")
                            .from(Animal::Table, Animal::LocationId)
                            .to(Location::Table, Location::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Animal::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Animal {
    Table,
    Id,
    OrganizationId,
    Code,
    CodeFather,
    CodeMother,
    Weight,
    Birthday,
    Gender,
    AnimalType,
    ProductionPhase,
    ElectronicCode,
    Status,
    LocationId,
    BreedId,
    UserCreatedId,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Organization { Table, Id }

#[derive(DeriveIden)]
enum Location { Table, Id }
