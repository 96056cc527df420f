use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::db::{self, Table, schedules};
use crate::error::AppError;
use crate::models::{
    MetadataDto, Room, Schedule, ScheduleCreateInput, ScheduleRow, ScheduleUpdateInput,
    ScheduleWhereInput, Student, Teacher, WhereUniqueInput,
};
use crate::query::FindManyArgs;

use super::rooms::load_rooms;
use super::students::load_students;
use super::teachers::load_teachers;

#[async_trait]
pub trait SchedulesService: Send + Sync {
    async fn create_schedule(&self, input: ScheduleCreateInput) -> Result<Schedule, AppError>;
    async fn delete_schedule(&self, id: &str) -> Result<(), AppError>;
    async fn schedules(&self, args: FindManyArgs<ScheduleWhereInput>) -> Result<Vec<Schedule>, AppError>;
    async fn schedule(&self, id: &str) -> Result<Schedule, AppError>;
    /// The schedule's room, `None` when unassigned.
    async fn get_room(&self, id: &str) -> Result<Option<Room>, AppError>;
    async fn get_student(&self, id: &str) -> Result<Option<Student>, AppError>;
    async fn get_teacher(&self, id: &str) -> Result<Option<Teacher>, AppError>;
    async fn schedules_meta(&self, args: FindManyArgs<ScheduleWhereInput>) -> Result<MetadataDto, AppError>;
    async fn update_schedule(&self, id: &str, input: ScheduleUpdateInput) -> Result<(), AppError>;
}

pub struct SqliteSchedulesService {
    db: SqlitePool,
}

impl SqliteSchedulesService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    async fn existing(&self, conn: &mut SqliteConnection, id: &str) -> Result<ScheduleRow, AppError> {
        schedules::find_schedule_by_id(conn, id)
            .await?
            .ok_or(AppError::NotFound)
    }
}

/// Drops references to records that do not exist.
async fn resolve(
    conn: &mut SqliteConnection,
    table: Table,
    reference: &Option<WhereUniqueInput>,
) -> Result<Option<String>, sqlx::Error> {
    let id = reference.as_ref().map(|r| r.id.as_str());
    db::resolve_reference(conn, table, id).await
}

#[async_trait]
impl SchedulesService for SqliteSchedulesService {
    async fn create_schedule(&self, input: ScheduleCreateInput) -> Result<Schedule, AppError> {
        let now = Utc::now();
        let mut tx = self.db.begin().await?;
        let row = ScheduleRow {
            id: input.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            created_at: input.created_at.unwrap_or(now),
            updated_at: input.updated_at.unwrap_or(now),
            date: input.date,
            time: input.time,
            room_id: resolve(&mut tx, Table::Rooms, &input.room).await?,
            teacher_id: resolve(&mut tx, Table::Teachers, &input.teacher).await?,
            student_id: resolve(&mut tx, Table::Students, &input.student).await?,
        };
        schedules::insert_schedule(&mut tx, &row).await?;
        tx.commit().await?;
        info!("created schedule {}", row.id);

        self.schedule(&row.id).await
    }

    async fn delete_schedule(&self, id: &str) -> Result<(), AppError> {
        let mut conn = self.db.acquire().await?;
        if db::delete_by_id(&mut conn, Table::Schedules, id).await? == 0 {
            return Err(AppError::NotFound);
        }
        info!("deleted schedule {}", id);
        Ok(())
    }

    async fn schedules(&self, args: FindManyArgs<ScheduleWhereInput>) -> Result<Vec<Schedule>, AppError> {
        let mut conn = self.db.acquire().await?;
        let rows = schedules::find_schedules(&mut conn, None, &args).await?;
        Ok(rows.into_iter().map(Schedule::from).collect())
    }

    async fn schedule(&self, id: &str) -> Result<Schedule, AppError> {
        self.schedules(FindManyArgs::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::NotFound)
    }

    async fn get_room(&self, id: &str) -> Result<Option<Room>, AppError> {
        let mut conn = self.db.acquire().await?;
        let schedule = self.existing(&mut conn, id).await?;
        let Some(room_id) = schedule.room_id else {
            return Ok(None);
        };
        Ok(load_rooms(&mut conn, &FindManyArgs::by_id(&room_id)).await?.into_iter().next())
    }

    async fn get_student(&self, id: &str) -> Result<Option<Student>, AppError> {
        let mut conn = self.db.acquire().await?;
        let schedule = self.existing(&mut conn, id).await?;
        let Some(student_id) = schedule.student_id else {
            return Ok(None);
        };
        Ok(load_students(&mut conn, &FindManyArgs::by_id(&student_id)).await?.into_iter().next())
    }

    async fn get_teacher(&self, id: &str) -> Result<Option<Teacher>, AppError> {
        let mut conn = self.db.acquire().await?;
        let schedule = self.existing(&mut conn, id).await?;
        let Some(teacher_id) = schedule.teacher_id else {
            return Ok(None);
        };
        Ok(load_teachers(&mut conn, &FindManyArgs::by_id(&teacher_id)).await?.into_iter().next())
    }

    async fn schedules_meta(&self, args: FindManyArgs<ScheduleWhereInput>) -> Result<MetadataDto, AppError> {
        let mut conn = self.db.acquire().await?;
        let count = schedules::count_schedules(&mut conn, &args.r#where).await?;
        Ok(MetadataDto { count })
    }

    async fn update_schedule(&self, id: &str, input: ScheduleUpdateInput) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        let existing = self.existing(&mut tx, id).await?;
        let row = ScheduleRow {
            id: existing.id,
            created_at: input.created_at.unwrap_or(existing.created_at),
            updated_at: input.updated_at.unwrap_or(existing.updated_at),
            date: input.date,
            time: input.time,
            room_id: resolve(&mut tx, Table::Rooms, &input.room).await?,
            teacher_id: resolve(&mut tx, Table::Teachers, &input.teacher).await?,
            student_id: resolve(&mut tx, Table::Students, &input.student).await?,
        };
        if schedules::update_schedule(&mut tx, &row).await? == 0 {
            return Err(db::missing_or_conflict(&mut tx, Table::Schedules, id).await);
        }
        tx.commit().await?;
        info!("updated schedule {}", id);
        Ok(())
    }
}
