//! Migrator registering farm record migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_organization;
mod m20240301_000002_create_location;
mod m20240301_000003_create_animal;
mod m20240301_000004_create_death;
mod m20240301_000005_create_feeding;
mod m20240301_000006_create_profile;
mod m20240301_000007_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_organization::Migration),
            Box::new(m20240301_000002_create_location::Migration),
            Box::new(m20240301_000003_create_animal::Migration),
            Box::new(m20240301_000004_create_death::Migration),
            Box::new(m20240301_000005_create_feeding::Migration),
            Box::new(m20240301_000006_create_profile::Migration),
            // Indexes should always be applied last
            Box::new(m20240301_000007_add_indexes::Migration),
        ]
    }
}
