//! Create `feeding` table with FKs to `organization` and `animal`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Feeding::Table)
                    .if_not_exists()
                    .col(uuid(Feeding::Id).primary_key())
                    .col(uuid(Feeding::OrganizationId).not_null())
                    .col(uuid(Feeding::AnimalId).not_null())
                    .col(uuid_null(Feeding::FeedTypeId))
                    .col(double(Feeding::Quantity).not_null())
                    .col(timestamp_with_time_zone(Feeding::Date).not_null())
                    .col(string_len(Feeding::ProductionPhase, 32).not_null())
                    .col(text_null(Feeding::Note))
                    .col(uuid_null(Feeding::UserCreatedId))
                    .col(timestamp_with_time_zone(Feeding::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Feeding::UpdatedAt).not_null())
                    .col(
                        ColumnDef::new(Feeding::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feeding_organization")
                            .from(Feeding::Table, Feeding::OrganizationId)
                            .to(Organization::Table, Organization::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_feeding_animal")
                            .from(Feeding::Table, Feeding::AnimalId)
                            .to(Animal::Table, Animal::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Feeding::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Feeding {
    Table,
    Id,
    OrganizationId,
    AnimalId,
    FeedTypeId,
    Quantity,
    Date,
    ProductionPhase,
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
