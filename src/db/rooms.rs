use sqlx::SqliteConnection;

use crate::error::AppError;
use crate::models::{RoomRow, RoomWhereInput};
use crate::query::{self, FindManyArgs};

const SELECT_ROOMS: &str = "SELECT id, created_at, updated_at, room_number, capacity FROM rooms";

pub async fn find_rooms(
    conn: &mut SqliteConnection,
    args: &FindManyArgs<RoomWhereInput>,
) -> Result<Vec<RoomRow>, AppError> {
    let mut qb = query::select_many(SELECT_ROOMS, None, args)?;
    let rows = qb.build_query_as::<RoomRow>().fetch_all(&mut *conn).await?;
    Ok(rows)
}

pub async fn count_rooms(conn: &mut SqliteConnection, filter: &RoomWhereInput) -> Result<i64, sqlx::Error> {
    let mut qb = query::count("rooms", filter);
    qb.build_query_scalar::<i64>().fetch_one(&mut *conn).await
}

pub async fn find_room_by_id(conn: &mut SqliteConnection, id: &str) -> Result<Option<RoomRow>, sqlx::Error> {
    sqlx::query_as::<_, RoomRow>(
        "SELECT id, created_at, updated_at, room_number, capacity FROM rooms WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn insert_room(conn: &mut SqliteConnection, room: &RoomRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO rooms (id, created_at, updated_at, room_number, capacity) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&room.id)
    .bind(room.created_at)
    .bind(room.updated_at)
    .bind(&room.room_number)
    .bind(room.capacity)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Overwrites every column but the id. Returns the number of rows touched.
pub async fn update_room(conn: &mut SqliteConnection, room: &RoomRow) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE rooms SET created_at = ?, updated_at = ?, room_number = ?, capacity = ? WHERE id = ?",
    )
    .bind(room.created_at)
    .bind(room.updated_at)
    .bind(&room.room_number)
    .bind(room.capacity)
    .bind(&room.id)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}
