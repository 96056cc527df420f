use sqlx::SqliteConnection;

use crate::error::AppError;
use crate::models::{StudentRow, StudentWhereInput};
use crate::query::{self, FindManyArgs};

const SELECT_STUDENTS: &str = "SELECT id, created_at, updated_at, name, email, department FROM students";

pub async fn find_students(
    conn: &mut SqliteConnection,
    args: &FindManyArgs<StudentWhereInput>,
) -> Result<Vec<StudentRow>, AppError> {
    let mut qb = query::select_many(SELECT_STUDENTS, None, args)?;
    let rows = qb.build_query_as::<StudentRow>().fetch_all(&mut *conn).await?;
    Ok(rows)
}

pub async fn count_students(
    conn: &mut SqliteConnection,
    filter: &StudentWhereInput,
) -> Result<i64, sqlx::Error> {
    let mut qb = query::count("students", filter);
    qb.build_query_scalar::<i64>().fetch_one(&mut *conn).await
}

pub async fn find_student_by_id(
    conn: &mut SqliteConnection,
    id: &str,
) -> Result<Option<StudentRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentRow>(
        "SELECT id, created_at, updated_at, name, email, department FROM students WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
}

pub async fn insert_student(conn: &mut SqliteConnection, student: &StudentRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO students (id, created_at, updated_at, name, email, department) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&student.id)
    .bind(student.created_at)
    .bind(student.updated_at)
    .bind(&student.name)
    .bind(&student.email)
    .bind(&student.department)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_student(conn: &mut SqliteConnection, student: &StudentRow) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE students SET created_at = ?, updated_at = ?, name = ?, email = ?, department = ? WHERE id = ?",
    )
    .bind(student.created_at)
    .bind(student.updated_at)
    .bind(&student.name)
    .bind(&student.email)
    .bind(&student.department)
    .bind(&student.id)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}
