// src/db/mod.rs

//! SQLite-backed stores for the three services.

pub mod questions;
pub mod results;
pub mod seed;
pub mod sessions;

use std::{str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

pub use questions::QuestionRepository;
pub use results::ResultRepository;
pub use sessions::SessionRepository;

/// Opens a pool on `database_url`, creating the database file when missing.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await
}

/// A private in-memory database. Pinned to a single connection that never
/// expires, otherwise every new connection would see an empty database.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Maps a failed query into the HTTP-facing error, logging the context.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> crate::error::AppError {
    move |e| {
        tracing::error!("{}: {:?}", context, e);
        crate::error::AppError::from(e)
    }
}
