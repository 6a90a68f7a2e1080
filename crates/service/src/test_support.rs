#![cfg(test)]
use tokio::sync::OnceCell;
use sea_orm::DatabaseConnection;
use migration::MigratorTrait;
use models::db::connect_with_config;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<bool> = OnceCell::const_new();

fn test_config() -> Option<configs::DatabaseConfig> {
    let mut cfg = configs::AppConfig::load_and_validate().ok()?.database;
    cfg.max_connections = cfg.max_connections.max(5);
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.acquire_timeout_secs = 10;
    Some(cfg)
}

/// A migrated connection, or `None` when `SKIP_DB_TESTS` is set or no
/// database is reachable.
pub async fn get_db() -> Option<DatabaseConnection> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return None;
    }
    let cfg = test_config()?;

    // Run migrations exactly once, with a throwaway connection
    let migrated = *MIGRATED
        .get_or_init(|| async {
            let db = match connect_with_config(&cfg).await {
                Ok(db) => db,
                Err(e) => {
                    eprintln!("skip: cannot connect to db: {}", e);
                    return false;
                }
            };
            match migration::Migrator::up(&db, None).await {
                Ok(()) => true,
                Err(e) => {
                    eprintln!("skip: migrate up failed: {}", e);
                    false
                }
            }
        })
        .await;
    if !migrated {
        return None;
    }

    // Return a fresh connection for the current test's runtime
    connect_with_config(&cfg).await.ok()
}
