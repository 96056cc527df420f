use std::sync::Arc;

use sqlx::SqlitePool;

use crate::services::{
    RoomsService, SchedulesService, SqliteRoomsService, SqliteSchedulesService,
    SqliteStudentsService, SqliteTeachersService, StudentsService, TeachersService,
};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub rooms: Arc<dyn RoomsService>,
    pub schedules: Arc<dyn SchedulesService>,
    pub students: Arc<dyn StudentsService>,
    pub teachers: Arc<dyn TeachersService>,
}

impl AppState {
    /// Wires the SQLite-backed services onto one pool.
    pub fn new(db: SqlitePool) -> Self {
        Self {
            rooms: Arc::new(SqliteRoomsService::new(db.clone())),
            schedules: Arc::new(SqliteSchedulesService::new(db.clone())),
            students: Arc::new(SqliteStudentsService::new(db.clone())),
            teachers: Arc::new(SqliteTeachersService::new(db.clone())),
            db,
        }
    }
}
