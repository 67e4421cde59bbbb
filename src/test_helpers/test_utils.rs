//! # Test Utilities
//!
//! Each call hands out a fresh private in-memory database, so tests never see
//! each other's rows and need no cleanup.

use crate::config::TestDatabaseConfig;
use crate::database::DatabaseConnection;
use crate::logging::init_test_logging;
use crate::manager::TestEntityManager;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Set up an empty in-memory test database
pub async fn setup_test_db() -> SqlitePool {
    init_test_logging();

    DatabaseConnection::connect(&TestDatabaseConfig::in_memory())
        .await
        .expect("Failed to connect to test database")
        .into_pool()
}

/// Set up an in-memory test database with `ddl` applied
pub async fn setup_test_db_with_schema(ddl: &str) -> SqlitePool {
    let pool = setup_test_db().await;

    sqlx::raw_sql(ddl)
        .execute(&pool)
        .await
        .expect("Failed to apply test schema");

    pool
}

/// Entity manager over a fresh in-memory database with `ddl` applied
pub async fn setup_test_entity_manager(ddl: &str) -> TestEntityManager {
    TestEntityManager::new(setup_test_db_with_schema(ddl).await)
}

/// Random unique key for fixture rows
pub fn random_id() -> String {
    Uuid::new_v4().to_string()
}
