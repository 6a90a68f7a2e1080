//! Animal listing against PostgreSQL. Skips when `SKIP_DB_TESTS` is set or
//! no database is reachable.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use models::db::connect_with_config;
use models::organization;
use service::enums::{AnimalStatus, AnimalType, Gender, ProductionPhase};
use service::records::{AnimalList, AnimalLookup, CreateAnimal, CreateLocation, LocationList};
use service::{
    AnimalService, LocationService, OrderBy, PaginationRequest, RecordKey, SeaOrmStore, ServiceError, Visibility,
};

async fn setup_test_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let cfg = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => cfg.database,
        Err(e) => {
            eprintln!("skip: no database configured: {}", e);
            return None;
        }
    };
    let db = match connect_with_config(&cfg).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return None;
        }
    };
    if let Err(e) = migration::Migrator::up(&db, None).await {
        eprintln!("skip: migrate up failed: {}", e);
        return None;
    }
    Some(db)
}

fn pig(organization_id: Uuid, location_id: Uuid, code: &str) -> CreateAnimal {
    CreateAnimal {
        organization_id,
        code: code.to_string(),
        code_father: None,
        code_mother: None,
        weight: None,
        birthday: Utc::now() - Duration::days(90),
        gender: Gender::Male,
        animal_type: AnimalType::Pig,
        production_phase: ProductionPhase::Fattening,
        electronic_code: Some(format!("FR-{code}")),
        status: AnimalStatus::Active,
        location_id,
        breed_id: None,
        user_created_id: None,
    }
}

fn by_code(org: Uuid, page: PaginationRequest) -> AnimalList {
    AnimalList { pagination: page, ..AnimalList::new(org) }
}

#[tokio::test]
async fn organization_scoped_pages_survive_soft_delete() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };
    let store = Arc::new(SeaOrmStore::new(db.clone()));
    let animals = AnimalService::new(store.clone());
    let locations = LocationService::new(store);

    let org = organization::create(&db, &format!("farm_{}", Uuid::new_v4())).await?;
    let other = organization::create(&db, &format!("farm_{}", Uuid::new_v4())).await?;

    let pen = locations
        .create_one(&CreateLocation {
            organization_id: org.id,
            number: "B-12".into(),
            location_type: AnimalType::Pig,
            production_phase: ProductionPhase::Fattening,
            square_meter: Some(36.0),
            manger: Some(2),
            through: None,
        })
        .await?;
    assert_eq!(locations.find_all(&LocationList::new(org.id)).await?.row_count, 1);

    let a1 = animals.create_one(&pig(org.id, pen.id, "A1")).await?;
    animals.create_one(&pig(org.id, pen.id, "A2")).await?;
    animals.create_one(&pig(org.id, pen.id, "A3")).await?;

    let other_pen = locations
        .create_one(&CreateLocation {
            organization_id: other.id,
            number: "X-1".into(),
            location_type: AnimalType::Pig,
            production_phase: ProductionPhase::Growth,
            square_meter: None,
            manger: None,
            through: None,
        })
        .await?;
    animals.create_one(&pig(other.id, other_pen.id, "A0")).await?;

    let first = animals.find_all(&by_code(org.id, PaginationRequest::offset(2, 0, OrderBy::asc("code")))).await?;
    assert_eq!(first.items.iter().map(|a| a.code.as_str()).collect::<Vec<_>>(), vec!["A1", "A2"]);
    assert_eq!(first.row_count, 3);
    assert_eq!(first.total_pages, 2);

    let cursor = first.next_cursor.ok_or_else(|| anyhow::anyhow!("full page without cursor"))?;
    let second = animals.find_all(&by_code(org.id, PaginationRequest::after(cursor, 2, OrderBy::asc("code")))).await?;
    assert_eq!(second.items.iter().map(|a| a.code.as_str()).collect::<Vec<_>>(), vec!["A3"]);
    assert!(!second.has_next_page);

    animals.soft_delete_one(&RecordKey::new(a1.id).owned_by(org.id)).await?;
    let after = animals.find_all(&by_code(org.id, PaginationRequest::offset(2, 0, OrderBy::asc("code")))).await?;
    assert_eq!(after.items.iter().map(|a| a.code.as_str()).collect::<Vec<_>>(), vec!["A2", "A3"]);
    assert_eq!(after.row_count, 2);

    let with_deleted = AnimalList { visibility: Visibility::IncludeDeleted, ..AnimalList::new(org.id) };
    assert_eq!(animals.find_all(&with_deleted).await?.row_count, 3);

    let search = AnimalList { search: Some("fr-a3".into()), ..AnimalList::new(org.id) };
    assert_eq!(animals.find_all(&search).await?.row_count, 1);

    let lookup = AnimalLookup { organization_id: Some(org.id), code: Some("A2".into()), ..Default::default() };
    assert!(animals.find_one_by(&lookup).await?.is_some());

    let foreign = animals.restore_one(&RecordKey::new(a1.id).owned_by(other.id)).await;
    assert!(matches!(foreign, Err(ServiceError::NotFound(_))));
    Ok(())
}
