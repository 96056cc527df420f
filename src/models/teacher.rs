use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::error::AppError;
use crate::query::{self, Conditions, FieldFilter, WhereInput};

use super::WhereUniqueInput;

#[derive(Debug, Clone, FromRow)]
pub struct TeacherRow {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
}

impl TeacherRow {
    pub fn into_dto(self, schedules: Vec<String>) -> Teacher {
        Teacher {
            id: self.id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            name: self.name,
            email: self.email,
            department: self.department,
            schedules,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub schedules: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TeacherCreateInput {
    pub id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[validate(length(max = 1000))]
    pub name: Option<String>,
    pub email: Option<String>,
    #[validate(length(max = 1000))]
    pub department: Option<String>,
    pub schedules: Option<Vec<WhereUniqueInput>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TeacherUpdateInput {
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    #[validate(length(max = 1000))]
    pub name: Option<String>,
    pub email: Option<String>,
    #[validate(length(max = 1000))]
    pub department: Option<String>,
    pub schedules: Option<Vec<String>>,
}

impl TeacherUpdateInput {
    pub fn apply(&self, existing: &TeacherRow) -> TeacherRow {
        TeacherRow {
            id: existing.id.clone(),
            created_at: self.created_at.unwrap_or(existing.created_at),
            updated_at: self.updated_at.unwrap_or(existing.updated_at),
            name: self.name.clone(),
            email: self.email.clone(),
            department: self.department.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeacherWhereInput {
    pub id: Option<FieldFilter<String>>,
    pub created_at: Option<FieldFilter<DateTime<Utc>>>,
    pub updated_at: Option<FieldFilter<DateTime<Utc>>>,
    pub name: Option<FieldFilter<String>>,
    pub email: Option<FieldFilter<String>>,
    pub department: Option<FieldFilter<String>>,
    pub schedules: Option<Vec<String>>,
}

impl WhereInput for TeacherWhereInput {
    fn column(field: &str) -> Option<&'static str> {
        match field {
            "id" => Some("id"),
            "createdAt" => Some("created_at"),
            "updatedAt" => Some("updated_at"),
            "name" => Some("name"),
            "email" => Some("email"),
            "department" => Some("department"),
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
            "name" => self.name = Some(query::parse_filter(field, raw)?),
            "email" => self.email = Some(query::parse_filter(field, raw)?),
            "department" => self.department = Some(query::parse_filter(field, raw)?),
            "schedules" => query::push_ids(&mut self.schedules, raw),
            _ => return Ok(false),
        }
        Ok(true)
    }

    fn push_conditions<'q>(&self, conditions: &mut Conditions<'_, 'q>) {
        conditions.filter("id", &self.id);
        conditions.filter("created_at", &self.created_at);
        conditions.filter("updated_at", &self.updated_at);
        conditions.filter("name", &self.name);
        conditions.filter("email", &self.email);
        conditions.filter("department", &self.department);
        conditions.has_schedule_in("teachers", "teacher_id", &self.schedules);
    }
}
