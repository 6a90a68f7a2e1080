//! Owner-scoped lookup indexes.
//!
//! Every list query filters on the owner column plus `deleted_at IS NULL`,
//! so each table gets a composite `(owner, deleted_at)` index.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const SCOPED_INDEXES: [(&str, &str, &str); 5] = [
    ("idx_location_org_deleted", "location", "organization_id"),
    ("idx_animal_org_deleted", "animal", "organization_id"),
    ("idx_death_org_deleted", "death", "organization_id"),
    ("idx_feeding_org_deleted", "feeding", "organization_id"),
    ("idx_profile_user_deleted", "profile", "user_id"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, owner) in SCOPED_INDEXES {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Alias::new(table))
                        .col(Alias::new(owner))
                        .col(Alias::new("deleted_at"))
                        .to_owned(),
                )
                .await?;
        }

        // Animal codes are looked up and sorted per organization
        manager
            .create_index(
                Index::create()
                    .name("idx_animal_org_code")
                    .table(Animal::Table)
                    .col(Animal::OrganizationId)
                    .col(Animal::Code)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_animal_org_code").table(Animal::Table).to_owned())
            .await?;
        for (name, table, _) in SCOPED_INDEXES {
            manager
                .drop_index(Index::drop().name(name).table(Alias::new(table)).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Animal { Table, OrganizationId, Code }
