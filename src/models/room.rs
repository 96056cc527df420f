use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;
use crate::query::{self, Conditions, FieldFilter, WhereInput};

use super::WhereUniqueInput;

#[derive(Debug, Clone, FromRow)]
pub struct RoomRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub room_number: Option<String>,
    pub capacity: Option<i32>,
}

impl RoomRow {
    pub fn into_dto(self, schedules: Vec<String>) -> Room {
        Room {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            room_number: self.room_number,
            capacity: self.capacity,
            schedules,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub room_number: Option<String>,
    pub capacity: Option<i32>,
    pub schedules: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreateInput {
    pub id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[validate(length(max = 1000))]
    pub room_number: Option<String>,
    #[validate(range(min = -999_999_999, max = 999_999_999))]
    pub capacity: Option<i32>,
    pub schedules: Option<Vec<WhereUniqueInput>>,
}

/// Full replacement of a room's fields. Unset timestamps keep their stored
/// values; every other unset field is cleared.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoomUpdateInput {
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[validate(length(max = 1000))]
    pub room_number: Option<String>,
    #[validate(range(min = -999_999_999, max = 999_999_999))]
    pub capacity: Option<i32>,
    pub schedules: Option<Vec<String>>,
}

impl RoomUpdateInput {
    pub fn apply(&self, existing: &RoomRow) -> RoomRow {
        RoomRow {
            id: existing.id.clone(),
            created_at: self.created_at.unwrap_or(existing.created_at),
            updated_at: self.updated_at.unwrap_or(existing.updated_at),
            room_number: self.room_number.clone(),
            capacity: self.capacity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomWhereInput {
    pub id: Option<FieldFilter<String>>,
    pub created_at: Option<FieldFilter<DateTime<Utc>>>,
    pub updated_at: Option<FieldFilter<DateTime<Utc>>>,
    pub room_number: Option<FieldFilter<String>>,
    pub capacity: Option<FieldFilter<i32>>,
    pub schedules: Option<Vec<String>>,
}

impl WhereInput for RoomWhereInput {
    fn column(field: &str) -> Option<&'static str> {
        match field {
            "id" => Some("id"),
            "createdAt" => Some("created_at"),
            "updatedAt" => Some("updated_at"),
            "roomNumber" => Some("room_number"),
            "capacity" => Some("capacity"),
            _ => None,
        }
    }

    fn with_id(id: &str) -> Self {
        Self {
            id: Some(FieldFilter::Equals(id.to_string())),
            ..Self::default()
        }
    }

    fn assign(&mut self, field: &str, raw: &str) -> Result<bool, AppError> {
        match field {
            "id" => self.id = Some(query::parse_filter(field, raw)?),
            "createdAt" => self.created_at = Some(query::parse_filter(field, raw)?),
            "updatedAt" => self.updated_at = Some(query::parse_filter(field, raw)?),
            "roomNumber" => self.room_number = Some(query::parse_filter(field, raw)?),
            "capacity" => self.capacity = Some(query::parse_filter(field, raw)?),
            "schedules" => query::push_ids(&mut self.schedules, raw),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn push_conditions<'q>(&self, conditions: &mut Conditions<'_, 'q>) {
        conditions.filter("id", &self.id);
        conditions.filter("created_at", &self.created_at);
        conditions.filter("updated_at", &self.updated_at);
        conditions.filter("room_number", &self.room_number);
        conditions.filter("capacity", &self.capacity);
        conditions.has_schedule_in("rooms", "room_id", &self.schedules);
    }
}
