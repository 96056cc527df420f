#![allow(dead_code)]

use sqlx::SqlitePool;
use university_library_api::{AppState, db};

/// Fresh in-memory database with the schema applied. A single connection
/// keeps every query on the same in-memory database.
pub async fn setup_pool() -> SqlitePool {
    let pool = db::connect("sqlite::memory:", 1)
        .await
        .expect("Failed to create database");
    db::migrate(&pool).await.expect("Failed to run migrations");
    pool
}

pub async fn setup() -> AppState {
    AppState::new(setup_pool().await)
}
