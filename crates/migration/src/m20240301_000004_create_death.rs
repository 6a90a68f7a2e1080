//! Create `death` table with FKs to `organization` and `animal`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Death::Table)
                    .if_not_exists()
                    .col(uuid(Death::Id).primary_key())
                    .col(uuid(Death::OrganizationId).not_null())
                    .col(uuid(Death::AnimalId).not_null())
                    .col(timestamp_with_time_zone(Death::Date).not_null())
                    .col(string_len(Death::Cause, 255).not_null())
                    .col(string_len_null(Death::Method, 255))
                    .col(text_null(Death::Note))
                    .col(uuid_null(Death::UserCreatedId))
                    .col(timestamp_with_time_zone(Death::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Death::UpdatedAt).not_null())
                    .col(
                        ColumnDef::new(Death::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_death_organization")
                            .from(Death::Table, Death::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_death_animal")
                            .from(Death::Table, Death::AnimalId)
                            .to(Animal::Table, Animal::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Death::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Death {
    Table,
    Id,
    OrganizationId,
    AnimalId,
    Date,
    Cause,
    Method,
    Note,
    UserCreatedId,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden)]
enum Organization { Table, Id }

#[derive(DeriveIden)]
enum Animal { Table, Id }
