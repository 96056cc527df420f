use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::db::schedules::{self, ScheduleOwner};
use crate::db::{self, Table, students};
use crate::error::AppError;
use crate::models::{
    MetadataDto, Schedule, ScheduleWhereInput, Student, StudentCreateInput, StudentRow,
    StudentUpdateInput, StudentWhereInput, WhereUniqueInput, ids_of,
};
use crate::query::FindManyArgs;

use super::schedule_links;

#[async_trait]
pub trait StudentsService: Send + Sync {
    async fn create_student(&self, input: StudentCreateInput) -> Result<Student, AppError>;
    async fn delete_student(&self, id: &str) -> Result<(), AppError>;
    async fn students(&self, args: FindManyArgs<StudentWhereInput>) -> Result<Vec<Student>, AppError>;
    async fn student(&self, id: &str) -> Result<Student, AppError>;
    async fn connect_schedules(&self, id: &str, schedules: &[WhereUniqueInput]) -> Result<(), AppError>;
    async fn disconnect_schedules(&self, id: &str, schedules: &[WhereUniqueInput]) -> Result<(), AppError>;
    async fn find_schedules(
        &self,
        id: &str,
        args: FindManyArgs<ScheduleWhereInput>,
    ) -> Result<Vec<Schedule>, AppError>;
    async fn students_meta(&self, args: FindManyArgs<StudentWhereInput>) -> Result<MetadataDto, AppError>;
    async fn update_schedules(&self, id: &str, schedules: &[WhereUniqueInput]) -> Result<(), AppError>;
    async fn update_student(&self, id: &str, input: StudentUpdateInput) -> Result<(), AppError>;
}

pub(crate) async fn load_students(
    conn: &mut SqliteConnection,
    args: &FindManyArgs<StudentWhereInput>,
) -> Result<Vec<Student>, AppError> {
    let rows = students::find_students(conn, args).await?;
    let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
    let mut linked = schedules::schedule_ids_by_owner(conn, ScheduleOwner::Student, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let schedules = linked.remove(&row.id).unwrap_or_default();
            row.into_dto(schedules)
        })
        .collect())
}

pub struct SqliteStudentsService {
    db: SqlitePool,
}

impl SqliteStudentsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StudentsService for SqliteStudentsService {
    async fn create_student(&self, input: StudentCreateInput) -> Result<Student, AppError> {
        input.validate()?;
        let now = Utc::now();
        let row = StudentRow {
            id: input.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            created_at: input.created_at.unwrap_or(now),
            updated_at: input.updated_at.unwrap_or(now),
            name: input.name,
            email: input.email,
            department: input.department,
        };

        let mut tx = self.db.begin().await?;
        students::insert_student(&mut tx, &row).await?;
        if let Some(requested) = &input.schedules {
            schedule_links::replace(&mut tx, ScheduleOwner::Student, &row.id, &ids_of(requested), false).await?;
        }
        tx.commit().await?;
        info!("created student {}", row.id);

        self.student(&row.id).await
    }

    async fn delete_student(&self, id: &str) -> Result<(), AppError> {
        let mut conn = self.db.acquire().await?;
        if db::delete_by_id(&mut conn, Table::Students, id).await? == 0 {
            return Err(AppError::NotFound);
        }
        info!("deleted student {}", id);
        Ok(())
    }

    async fn students(&self, args: FindManyArgs<StudentWhereInput>) -> Result<Vec<Student>, AppError> {
        let mut conn = self.db.acquire().await?;
        load_students(&mut conn, &args).await
    }

    async fn student(&self, id: &str) -> Result<Student, AppError> {
        self.students(FindManyArgs::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::NotFound)
    }

    async fn connect_schedules(&self, id: &str, requested: &[WhereUniqueInput]) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        schedule_links::connect(&mut tx, ScheduleOwner::Student, id, &ids_of(requested)).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn disconnect_schedules(&self, id: &str, requested: &[WhereUniqueInput]) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        schedule_links::disconnect(&mut tx, ScheduleOwner::Student, id, &ids_of(requested)).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_schedules(
        &self,
        id: &str,
        args: FindManyArgs<ScheduleWhereInput>,
    ) -> Result<Vec<Schedule>, AppError> {
        let mut conn = self.db.acquire().await?;
        let rows = schedules::find_schedules(&mut conn, Some((ScheduleOwner::Student, id)), &args).await?;
        Ok(rows.into_iter().map(Schedule::from).collect())
    }

    async fn students_meta(&self, args: FindManyArgs<StudentWhereInput>) -> Result<MetadataDto, AppError> {
        let mut conn = self.db.acquire().await?;
        let count = students::count_students(&mut conn, &args.r#where).await?;
        Ok(MetadataDto { count })
    }

    async fn update_schedules(&self, id: &str, requested: &[WhereUniqueInput]) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        schedule_links::replace(&mut tx, ScheduleOwner::Student, id, &ids_of(requested), true).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_student(&self, id: &str, input: StudentUpdateInput) -> Result<(), AppError> {
        input.validate()?;
        let mut tx = self.db.begin().await?;
        let existing = students::find_student_by_id(&mut tx, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let row = input.apply(&existing);
        if students::update_student(&mut tx, &row).await? == 0 {
            return Err(db::missing_or_conflict(&mut tx, Table::Students, id).await);
        }
        if let Some(requested) = &input.schedules {
            schedule_links::replace(&mut tx, ScheduleOwner::Student, id, requested, false).await?;
        }
        tx.commit().await?;
        info!("updated student {}", id);
        Ok(())
    }
}
