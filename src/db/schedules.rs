use std::collections::{BTreeSet, HashMap};

use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::error::AppError;
use crate::models::{ScheduleRow, ScheduleWhereInput};
use crate::query::{self, FindManyArgs};

use super::{IN_CHUNK, Table};

const SELECT_SCHEDULES: &str =
    "SELECT id, created_at, updated_at, date, time, room_id, teacher_id, student_id FROM schedules";

/// Entity that owns schedules through a foreign key on `schedules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOwner {
    Room,
    Student,
    Teacher,
}

impl ScheduleOwner {
    pub fn column(self) -> &'static str {
        match self {
            ScheduleOwner::Room => "room_id",
            ScheduleOwner::Student => "student_id",
            ScheduleOwner::Teacher => "teacher_id",
        }
    }

    pub fn table(self) -> Table {
        match self {
            ScheduleOwner::Room => Table::Rooms,
            ScheduleOwner::Student => Table::Students,
            ScheduleOwner::Teacher => Table::Teachers,
        }
    }
}

/// Lists schedules, optionally restricted to one owner.
pub async fn find_schedules(
    conn: &mut SqliteConnection,
    owner: Option<(ScheduleOwner, &str)>,
    args: &FindManyArgs<ScheduleWhereInput>,
) -> Result<Vec<ScheduleRow>, AppError> {
    let scope = owner.map(|(owner, id)| (owner.column(), id));
    let mut qb = query::select_many(SELECT_SCHEDULES, scope, args)?;
    let rows = qb.build_query_as::<ScheduleRow>().fetch_all(&mut *conn).await?;
    Ok(rows)
}

pub async fn count_schedules(
    conn: &mut SqliteConnection,
    filter: &ScheduleWhereInput,
) -> Result<i64, sqlx::Error> {
    let mut qb = query::count("schedules", filter);
    qb.build_query_scalar::<i64>().fetch_one(&mut *conn).await
}

pub async fn find_schedule_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<ScheduleRow>, sqlx::Error> {
    sqlx::query_as::<_, ScheduleRow>(&format!("{} WHERE id = ?", SELECT_SCHEDULES))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

pub async fn insert_schedule(conn: &mut SqliteConnection, schedule: &ScheduleRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO schedules
            (id, created_at, updated_at, date, time, room_id, teacher_id, student_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&schedule.id)
    .bind(schedule.created_at)
    .bind(schedule.updated_at)
    .bind(schedule.date)
    .bind(schedule.time)
    .bind(&schedule.room_id)
    .bind(&schedule.teacher_id)
    .bind(&schedule.student_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_schedule(conn: &mut SqliteConnection, schedule: &ScheduleRow) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE schedules
        SET created_at = ?,
            updated_at = ?,
            date = ?,
            time = ?,
            room_id = ?,
            teacher_id = ?,
            student_id = ?
        WHERE id = ?
        "#,
    )
    .bind(schedule.created_at)
    .bind(schedule.updated_at)
    .bind(schedule.date)
    .bind(schedule.time)
    .bind(&schedule.room_id)
    .bind(&schedule.teacher_id)
    .bind(&schedule.student_id)
    .bind(&schedule.id)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

/// Schedule ids grouped by owner id, for every owner in `owner_ids`. Each
/// group is sorted by schedule id.
pub async fn schedule_ids_by_owner(
    conn: &mut SqliteConnection,
    owner: ScheduleOwner,
    owner_ids: &[String],
) -> Result<HashMap<String, Vec<String>>, sqlx::Error> {
    let column = owner.column();
    let mut grouped: HashMap<String, Vec<String>> = HashMap::new();
    for chunk in owner_ids.chunks(IN_CHUNK) {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {}, id FROM schedules WHERE {} IN (", column, column));
        let mut separated = qb.separated(", ");
        for id in chunk {
            separated.push_bind(id.as_str());
        }
        separated.push_unseparated(") ORDER BY id");

        let pairs: Vec<(String, String)> = qb.build_query_as().fetch_all(&mut *conn).await?;
        for (owner_id, schedule_id) in pairs {
            grouped.entry(owner_id).or_default().push(schedule_id);
        }
    }
    Ok(grouped)
}

pub async fn linked_schedule_ids(
    conn: &mut SqliteConnection,
    owner: ScheduleOwner,
    owner_id: &str,
) -> Result<BTreeSet<String>, sqlx::Error> {
    let ids: Vec<String> = sqlx::query_scalar(&format!(
        "SELECT id FROM schedules WHERE {} = ?",
        owner.column()
    ))
    .bind(owner_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(ids.into_iter().collect())
}

/// Points the owner foreign key of every listed schedule at `owner_id`, or
/// clears it when `owner_id` is `None`.
pub async fn set_owner<'a, I>(
    conn: &mut SqliteConnection,
    owner: ScheduleOwner,
    schedule_ids: I,
    owner_id: Option<&str>,
) -> Result<u64, sqlx::Error>
where
    I: IntoIterator<Item = &'a String>,
{
    let sql = format!("UPDATE schedules SET {} = ? WHERE id = ?", owner.column());
    let mut touched = 0;
    for schedule_id in schedule_ids {
        touched += sqlx::query(&sql)
            .bind(owner_id)
            .bind(schedule_id)
            .execute(&mut *conn)
            .await?
            .rows_affected();
    }
    Ok(touched)
}
