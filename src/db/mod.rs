//! SQLite store: pool setup, migrations and per-table repository functions.
//!
//! Repository functions take a `&mut SqliteConnection` so that services can
//! run them either on a pooled connection or inside a transaction.

pub mod rooms;
pub mod schedules;
pub mod students;
pub mod teachers;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::info;

use crate::error::AppError;

pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    info!("connected to {}", database_url);
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Rooms,
    Schedules,
    Students,
    Teachers,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Rooms => "rooms",
            Table::Schedules => "schedules",
            Table::Students => "students",
            Table::Teachers => "teachers",
        }
    }
}

pub async fn exists(conn: &mut SqliteConnection, table: Table, id: &str) -> Result<bool, sqlx::Error> {
    let found: Option<i64> = sqlx::query_scalar(&format!("SELECT 1 FROM {} WHERE id = ?", table.as_str()))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

/// Upper bound on the ids bound into one `IN (...)` list, well below
/// SQLite's host parameter limit.
pub(crate) const IN_CHUNK: usize = 500;

/// The subset of `ids` present in `table`, sorted and without duplicates.
pub async fn existing_ids(
    conn: &mut SqliteConnection,
    table: Table,
    ids: &[String],
) -> Result<Vec<String>, sqlx::Error> {
    let mut found = Vec::new();
    for chunk in ids.chunks(IN_CHUNK) {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT id FROM {} WHERE id IN (", table.as_str()));
        let mut separated = qb.separated(", ");
        for id in chunk {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(")");
        found.extend(qb.build_query_scalar::<String>().fetch_all(&mut *conn).await?);
    }
    found.sort();
    found.dedup();
    Ok(found)
}

/// `Some(id)` when the referenced record exists, `None` otherwise.
pub async fn resolve_reference(
    conn: &mut SqliteConnection,
    table: Table,
    id: Option<&str>,
) -> Result<Option<String>, sqlx::Error> {
    match id {
        Some(id) if exists(conn, table, id).await? => Ok(Some(id.to_string())),
        _ => Ok(None),
    }
}

pub async fn delete_by_id(conn: &mut SqliteConnection, table: Table, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", table.as_str()))
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected())
}

/// Classifies an update that touched no row.
pub async fn missing_or_conflict(conn: &mut SqliteConnection, table: Table, id: &str) -> AppError {
    match exists(conn, table, id).await {
        Ok(false) => AppError::NotFound,
        Ok(true) => AppError::UpdateConflict(id.to_string()),
        Err(e) => AppError::Database(e),
    }
}
