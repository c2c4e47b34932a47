//! Test database setup and management
#![allow(dead_code)]

use reviewqeem::db::{connect, init_schema};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Statement};
use std::env;

/// Connect to TEST_DATABASE_URL and make sure the schema exists.
/// Returns `None` when the variable is unset, so database tests are skipped
/// on machines without Postgres.
pub async fn setup_test_database() -> Option<Result<DatabaseConnection, DbErr>> {
    let database_url = env::var("TEST_DATABASE_URL").ok()?;
    Some(connect_and_migrate(&database_url).await)
}

async fn connect_and_migrate(url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = connect(url).await?;
    init_schema(&db).await?;
    Ok(db)
}

/// Remove every comment so each test starts from an empty table.
pub async fn cleanup_test_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "DELETE FROM comments".to_string(),
    ))
    .await?;
    Ok(())
}
