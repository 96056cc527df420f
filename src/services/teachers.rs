use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::db::schedules::{self, ScheduleOwner};
use crate::db::{self, Table, teachers};
use crate::error::AppError;
use crate::models::{
    MetadataDto, Schedule, ScheduleWhereInput, Teacher, TeacherCreateInput, TeacherRow,
    TeacherUpdateInput, TeacherWhereInput, WhereUniqueInput, ids_of,
};
use crate::query::FindManyArgs;

use super::schedule_links;

#[async_trait]
pub trait TeachersService: Send + Sync {
    async fn create_teacher(&self, input: TeacherCreateInput) -> Result<Teacher, AppError>;
    async fn delete_teacher(&self, id: &str) -> Result<(), AppError>;
    async fn teachers(&self, args: FindManyArgs<TeacherWhereInput>) -> Result<Vec<Teacher>, AppError>;
    async fn teacher(&self, id: &str) -> Result<Teacher, AppError>;
    async fn connect_schedules(&self, id: &str, schedules: &[WhereUniqueInput]) -> Result<(), AppError>;
    async fn disconnect_schedules(&self, id: &str, schedules: &[WhereUniqueInput]) -> Result<(), AppError>;
    async fn find_schedules(
        &self,
        id: &str,
        args: FindManyArgs<ScheduleWhereInput>,
    ) -> Result<Vec<Schedule>, AppError>;
    async fn teachers_meta(&self, args: FindManyArgs<TeacherWhereInput>) -> Result<MetadataDto, AppError>;
    async fn update_schedules(&self, id: &str, schedules: &[WhereUniqueInput]) -> Result<(), AppError>;
    async fn update_teacher(&self, id: &str, input: TeacherUpdateInput) -> Result<(), AppError>;
}

pub(crate) async fn load_teachers(
    conn: &mut SqliteConnection,
    args: &FindManyArgs<TeacherWhereInput>,
) -> Result<Vec<Teacher>, AppError> {
    let rows = teachers::find_teachers(conn, args).await?;
    let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
    let mut linked = schedules::schedule_ids_by_owner(conn, ScheduleOwner::Teacher, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let schedules = linked.remove(&row.id).unwrap_or_default();
            row.into_dto(schedules)
        })
        .collect())
}

pub struct SqliteTeachersService {
    db: SqlitePool,
}

impl SqliteTeachersService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TeachersService for SqliteTeachersService {
    async fn create_teacher(&self, input: TeacherCreateInput) -> Result<Teacher, AppError> {
        input.validate()?;
        let now = Utc::now();
        let row = TeacherRow {
            id: input.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            created_at: input.created_at.unwrap_or(now),
            updated_at: input.updated_at.unwrap_or(now),
            name: input.name,
            email: input.email,
            department: input.department,
        };

        let mut tx = self.db.begin().await?;
        teachers::insert_teacher(&mut tx, &row).await?;
        if let Some(requested) = &input.schedules {
            schedule_links::replace(&mut tx, ScheduleOwner::Teacher, &row.id, &ids_of(requested), false).await?;
        }
        tx.commit().await?;
        info!("created teacher {}", row.id);

        self.teacher(&row.id).await
    }

    async fn delete_teacher(&self, id: &str) -> Result<(), AppError> {
        let mut conn = self.db.acquire().await?;
        if db::delete_by_id(&mut conn, Table::Teachers, id).await? == 0 {
            return Err(AppError::NotFound);
        }
        info!("deleted teacher {}", id);
        Ok(())
    }

    async fn teachers(&self, args: FindManyArgs<TeacherWhereInput>) -> Result<Vec<Teacher>, AppError> {
        let mut conn = self.db.acquire().await?;
        load_teachers(&mut conn, &args).await
    }

    async fn teacher(&self, id: &str) -> Result<Teacher, AppError> {
        self.teachers(FindManyArgs::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::NotFound)
    }

    async fn connect_schedules(&self, id: &str, requested: &[WhereUniqueInput]) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        schedule_links::connect(&mut tx, ScheduleOwner::Teacher, id, &ids_of(requested)).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn disconnect_schedules(&self, id: &str, requested: &[WhereUniqueInput]) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        schedule_links::disconnect(&mut tx, ScheduleOwner::Teacher, id, &ids_of(requested)).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_schedules(
        &self,
        id: &str,
        args: FindManyArgs<ScheduleWhereInput>,
    ) -> Result<Vec<Schedule>, AppError> {
        let mut conn = self.db.acquire().await?;
        let rows = schedules::find_schedules(&mut conn, Some((ScheduleOwner::Teacher, id)), &args).await?;
        Ok(rows.into_iter().map(Schedule::from).collect())
    }

    async fn teachers_meta(&self, args: FindManyArgs<TeacherWhereInput>) -> Result<MetadataDto, AppError> {
        let mut conn = self.db.acquire().await?;
        let count = teachers::count_teachers(&mut conn, &args.r#where).await?;
        Ok(MetadataDto { count })
    }

    async fn update_schedules(&self, id: &str, requested: &[WhereUniqueInput]) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        schedule_links::replace(&mut tx, ScheduleOwner::Teacher, id, &ids_of(requested), true).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_teacher(&self, id: &str, input: TeacherUpdateInput) -> Result<(), AppError> {
        input.validate()?;
        let mut tx = self.db.begin().await?;
        let existing = teachers::find_teacher_by_id(&mut tx, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let row = input.apply(&existing);
        if teachers::update_teacher(&mut tx, &row).await? == 0 {
            return Err(db::missing_or_conflict(&mut tx, Table::Teachers, id).await);
        }
        if let Some(requested) = &input.schedules {
            schedule_links::replace(&mut tx, ScheduleOwner::Teacher, id, requested, false).await?;
        }
        tx.commit().await?;
        info!("updated teacher {}", id);
        Ok(())
    }
}
