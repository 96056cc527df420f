use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;
use crate::query::{self, Conditions, FieldFilter, WhereInput};

use super::WhereUniqueInput;

#[derive(Debug, Clone, FromRow)]
pub struct ScheduleRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub date: Option<DateTime<Utc>>,
    pub time: Option<DateTime<Utc>>,
    pub room_id: Option<String>,
    pub teacher_id: Option<String>,
    pub student_id: Option<String>,
}

/// A schedule as exposed over HTTP: related records appear as their ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub date: Option<DateTime<Utc>>,
    pub time: Option<DateTime<Utc>>,
    pub room: Option<String>,
    pub teacher: Option<String>,
    pub student: Option<String>,
}

impl From<ScheduleRow> for Schedule {
    fn from(row: ScheduleRow) -> Self {
        Self {
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            date: row.date,
            time: row.time,
            room: row.room_id,
            teacher: row.teacher_id,
            student: row.student_id,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleCreateInput {
    pub id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub date: Option<DateTime<Utc>>,
    pub time: Option<DateTime<Utc>>,
    pub room: Option<WhereUniqueInput>,
    pub teacher: Option<WhereUniqueInput>,
    pub student: Option<WhereUniqueInput>,
}

/// Full replacement of a schedule, foreign keys included. Unset timestamps
/// keep their stored values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleUpdateInput {
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub date: Option<DateTime<Utc>>,
    pub time: Option<DateTime<Utc>>,
    pub room: Option<WhereUniqueInput>,
    pub teacher: Option<WhereUniqueInput>,
    pub student: Option<WhereUniqueInput>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleWhereInput {
    pub id: Option<FieldFilter<String>>,
    pub created_at: Option<FieldFilter<DateTime<Utc>>>,
    pub updated_at: Option<FieldFilter<DateTime<Utc>>>,
    pub date: Option<FieldFilter<DateTime<Utc>>>,
    pub time: Option<FieldFilter<DateTime<Utc>>>,
    pub room: Option<FieldFilter<String>>,
    pub teacher: Option<FieldFilter<String>>,
    pub student: Option<FieldFilter<String>>,
}

impl WhereInput for ScheduleWhereInput {
    fn column(field: &str) -> Option<&'static str> {
        match field {
            "id" => Some("id"),
            "createdAt" => Some("created_at"),
            "updatedAt" => Some("updated_at"),
            "date" => Some("date"),
            "time" => Some("time"),
            "room" => Some("room_id"),
            "teacher" => Some("teacher_id"),
            "student" => Some("student_id"),
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
            "date" => self.date = Some(query::parse_filter(field, raw)?),
            "time" => self.time = Some(query::parse_filter(field, raw)?),
            "room" => self.room = Some(query::parse_filter(field, raw)?),
            "teacher" => self.teacher = Some(query::parse_filter(field, raw)?),
            "student" => self.student = Some(query::parse_filter(field, raw)?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn push_conditions<'q>(&self, conditions: &mut Conditions<'_, 'q>) {
        conditions.filter("id", &self.id);
        conditions.filter("created_at", &self.created_at);
        conditions.filter("updated_at", &self.updated_at);
        conditions.filter("date", &self.date);
        conditions.filter("time", &self.time);
        conditions.filter("room_id", &self.room);
        conditions.filter("teacher_id", &self.teacher);
        conditions.filter("student_id", &self.student);
    }
}
