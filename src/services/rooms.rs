use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::db::schedules::{self, ScheduleOwner};
use crate::db::{self, Table, rooms};
use crate::error::AppError;
use crate::models::{
    MetadataDto, Room, RoomCreateInput, RoomRow, RoomUpdateInput, RoomWhereInput, Schedule,
    ScheduleWhereInput, WhereUniqueInput, ids_of,
};
use crate::query::FindManyArgs;

use super::schedule_links;

#[async_trait]
pub trait RoomsService: Send + Sync {
    async fn create_room(&self, input: RoomCreateInput) -> Result<Room, AppError>;
    async fn delete_room(&self, id: &str) -> Result<(), AppError>;
    async fn rooms(&self, args: FindManyArgs<RoomWhereInput>) -> Result<Vec<Room>, AppError>;
    async fn room(&self, id: &str) -> Result<Room, AppError>;
    async fn connect_schedules(&self, id: &str, schedules: &[WhereUniqueInput]) -> Result<(), AppError>;
    async fn disconnect_schedules(&self, id: &str, schedules: &[WhereUniqueInput]) -> Result<(), AppError>;
    async fn find_schedules(
        &self,
        id: &str,
        args: FindManyArgs<ScheduleWhereInput>,
    ) -> Result<Vec<Schedule>, AppError>;
    async fn rooms_meta(&self, args: FindManyArgs<RoomWhereInput>) -> Result<MetadataDto, AppError>;
    async fn update_schedules(&self, id: &str, schedules: &[WhereUniqueInput]) -> Result<(), AppError>;
    async fn update_room(&self, id: &str, input: RoomUpdateInput) -> Result<(), AppError>;
}

/// Loads rooms with their schedule ids.
pub(crate) async fn load_rooms(
    conn: &mut SqliteConnection,
    args: &FindManyArgs<RoomWhereInput>,
) -> Result<Vec<Room>, AppError> {
    let rows = rooms::find_rooms(conn, args).await?;
    let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
    let mut linked = schedules::schedule_ids_by_owner(conn, ScheduleOwner::Room, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let schedules = linked.remove(&row.id).unwrap_or_default();
            row.into_dto(schedules)
        })
        .collect())
}

pub struct SqliteRoomsService {
    db: SqlitePool,
}

impl SqliteRoomsService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RoomsService for SqliteRoomsService {
    async fn create_room(&self, input: RoomCreateInput) -> Result<Room, AppError> {
        input.validate()?;
        let now = Utc::now();
        let row = RoomRow {
            id: input.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            created_at: input.created_at.unwrap_or(now),
            updated_at: input.updated_at.unwrap_or(now),
            room_number: input.room_number,
            capacity: input.capacity,
        };

        let mut tx = self.db.begin().await?;
        rooms::insert_room(&mut tx, &row).await?;
        if let Some(requested) = &input.schedules {
            schedule_links::replace(&mut tx, ScheduleOwner::Room, &row.id, &ids_of(requested), false).await?;
        }
        tx.commit().await?;
        info!("created room {}", row.id);

        self.room(&row.id).await
    }

    async fn delete_room(&self, id: &str) -> Result<(), AppError> {
        let mut conn = self.db.acquire().await?;
        if db::delete_by_id(&mut conn, Table::Rooms, id).await? == 0 {
            return Err(AppError::NotFound);
        }
        info!("deleted room {}", id);
        Ok(())
    }

    async fn rooms(&self, args: FindManyArgs<RoomWhereInput>) -> Result<Vec<Room>, AppError> {
        let mut conn = self.db.acquire().await?;
        load_rooms(&mut conn, &args).await
    }

    async fn room(&self, id: &str) -> Result<Room, AppError> {
        self.rooms(FindManyArgs::by_id(id))
            .await?
            .into_iter()
            .next()
            .ok_or(AppError::NotFound)
    }

    async fn connect_schedules(&self, id: &str, requested: &[WhereUniqueInput]) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        schedule_links::connect(&mut tx, ScheduleOwner::Room, id, &ids_of(requested)).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn disconnect_schedules(&self, id: &str, requested: &[WhereUniqueInput]) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        schedule_links::disconnect(&mut tx, ScheduleOwner::Room, id, &ids_of(requested)).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_schedules(
        &self,
        id: &str,
        args: FindManyArgs<ScheduleWhereInput>,
    ) -> Result<Vec<Schedule>, AppError> {
        let mut conn = self.db.acquire().await?;
        let rows = schedules::find_schedules(&mut conn, Some((ScheduleOwner::Room, id)), &args).await?;
        Ok(rows.into_iter().map(Schedule::from).collect())
    }

    async fn rooms_meta(&self, args: FindManyArgs<RoomWhereInput>) -> Result<MetadataDto, AppError> {
        let mut conn = self.db.acquire().await?;
        let count = rooms::count_rooms(&mut conn, &args.r#where).await?;
        Ok(MetadataDto { count })
    }

    async fn update_schedules(&self, id: &str, requested: &[WhereUniqueInput]) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;
        schedule_links::replace(&mut tx, ScheduleOwner::Room, id, &ids_of(requested), true).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update_room(&self, id: &str, input: RoomUpdateInput) -> Result<(), AppError> {
        input.validate()?;
        let mut tx = self.db.begin().await?;
        let existing = rooms::find_room_by_id(&mut tx, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let row = input.apply(&existing);
        if rooms::update_room(&mut tx, &row).await? == 0 {
            return Err(db::missing_or_conflict(&mut tx, Table::Rooms, id).await);
        }
        if let Some(requested) = &input.schedules {
            schedule_links::replace(&mut tx, ScheduleOwner::Room, id, requested, false).await?;
        }
        tx.commit().await?;
        info!("updated room {}", id);
        Ok(())
    }
}
