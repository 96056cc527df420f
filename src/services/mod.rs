pub mod rooms;
pub mod schedule_links;
pub mod schedules;
pub mod students;
pub mod teachers;

pub use rooms::{RoomsService, SqliteRoomsService};
pub use schedules::{SchedulesService, SqliteSchedulesService};
pub use students::{SqliteStudentsService, StudentsService};
pub use teachers::{SqliteTeachersService, TeachersService};
