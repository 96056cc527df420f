pub mod room;
pub mod schedule;
pub mod student;
pub mod teacher;

use serde::{Deserialize, Serialize};

pub use room::{Room, RoomCreateInput, RoomRow, RoomUpdateInput, RoomWhereInput};
pub use schedule::{Schedule, ScheduleCreateInput, ScheduleRow, ScheduleUpdateInput, ScheduleWhereInput};
pub use student::{Student, StudentCreateInput, StudentRow, StudentUpdateInput, StudentWhereInput};
pub use teacher::{Teacher, TeacherCreateInput, TeacherRow, TeacherUpdateInput, TeacherWhereInput};

/// Addresses one record by id, e.g. `{"id": "..."}` in relationship bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhereUniqueInput {
    pub id: String,
}

impl WhereUniqueInput {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDto {
    pub count: i64,
}

pub(crate) fn ids_of(inputs: &[WhereUniqueInput]) -> Vec<String> {
    inputs.iter().map(|input| input.id.clone()).collect()
}
