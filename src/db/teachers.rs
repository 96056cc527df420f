use sqlx::SqliteConnection;

use crate::error::AppError;
use crate::models::{TeacherRow, TeacherWhereInput};
use crate::query::{self, FindManyArgs};

const SELECT_TEACHERS: &str = "SELECT id, created_at, updated_at, name, email, department FROM teachers";

pub async fn find_teachers(
    conn: &mut SqliteConnection,
    args: &FindManyArgs<TeacherWhereInput>,
) -> Result<Vec<TeacherRow>, AppError> {
    let mut qb = query::select_many(SELECT_TEACHERS, None, args)?;
    let rows = qb.build_query_as::<TeacherRow>().fetch_all(&mut *conn).await?;
    Ok(rows)
}

pub async fn count_teachers(
    conn: &mut SqliteConnection,
    filter: &TeacherWhereInput,
) -> Result<i64, sqlx::Error> {
    let mut qb = query::count("teachers", filter);
    qb.build_query_scalar::<i64>().fetch_one(&mut *conn).await
}

pub async fn find_teacher_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<TeacherRow>, sqlx::Error> {
    sqlx::query_as::<_, TeacherRow>(
        "SELECT id, created_at, updated_at, name, email, department FROM teachers WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn insert_teacher(conn: &mut SqliteConnection, teacher: &TeacherRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO teachers (id, created_at, updated_at, name, email, department) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&teacher.id)
    .bind(teacher.created_at)
    .bind(teacher.updated_at)
    .bind(&teacher.name)
    .bind(&teacher.email)
    .bind(&teacher.department)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_teacher(conn: &mut SqliteConnection, teacher: &TeacherRow) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE teachers SET created_at = ?, updated_at = ?, name = ?, email = ?, department = ? WHERE id = ?",
    )
    .bind(teacher.created_at)
    .bind(teacher.updated_at)
    .bind(&teacher.name)
    .bind(&teacher.email)
    .bind(&teacher.department)
    .bind(&teacher.id)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}
