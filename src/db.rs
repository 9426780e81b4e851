use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;

use crate::migration::Migrator;

/// Connect to `url` and bring the schema up to date.
///
/// # Errors
///
/// Connection failures and migration errors.
pub async fn connect(url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url);
    options
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);

    // An in-memory SQLite database exists per connection, so it must not be pooled.
    if url.starts_with("sqlite::memory:") {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;
    tracing::info!(backend = ?db.get_database_backend(), "Database connected and migrated");
    Ok(db)
}
