//! Database connection and schema bootstrap for the Postgres comment store.

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS comments (
        id VARCHAR(36) PRIMARY KEY,
        review_id VARCHAR(255) NOT NULL,
        author VARCHAR(50) NOT NULL,
        email VARCHAR(255),
        content TEXT NOT NULL,
        status VARCHAR(16) NOT NULL DEFAULT 'pending',
        likes INTEGER NOT NULL DEFAULT 0,
        reports INTEGER NOT NULL DEFAULT 0,
        featured BOOLEAN NOT NULL DEFAULT FALSE,
        source VARCHAR(16) NOT NULL DEFAULT 'website',
        user_ip VARCHAR(64) NOT NULL DEFAULT '',
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL,
        CONSTRAINT comments_likes_non_negative CHECK (likes >= 0),
        CONSTRAINT comments_reports_non_negative CHECK (reports >= 0)
    )"#,
    "CREATE INDEX IF NOT EXISTS comments_review_status_created_idx ON comments (review_id, status, created_at DESC)",
    "CREATE INDEX IF NOT EXISTS comments_review_featured_likes_idx ON comments (review_id, featured, likes DESC)",
    "CREATE INDEX IF NOT EXISTS comments_ip_created_idx ON comments (user_ip, created_at)",
];

/// Connect to the database at `url`.
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(url).await?;
    log::info!("Connected to comment database");
    Ok(db)
}

/// Create the comments table and its indexes when missing.
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    for sql in SCHEMA {
        db.execute(Statement::from_string(
            db.get_database_backend(),
            sql.to_string(),
        ))
        .await?;
    }
    Ok(())
}
