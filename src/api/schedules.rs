use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::AppError;
use crate::models::{
    MetadataDto, Room, Schedule, ScheduleCreateInput, ScheduleUpdateInput, ScheduleWhereInput,
    Student, Teacher,
};
use crate::query::FindManyArgs;
use crate::state::AppState;

use super::{QueryPairs, collection_paths};

pub fn routes() -> Router<AppState> {
    collection_paths("schedules").into_iter().fold(Router::new(), |router, base| {
        router
            .route(&base, get(schedules).post(create_schedule))
            .route(&format!("{base}/meta"), post(schedules_meta))
            .route(
                &format!("{base}/{{id}}"),
                get(schedule).patch(update_schedule).delete(delete_schedule),
            )
            .route(&format!("{base}/{{id}}/rooms"), get(get_room))
            .route(&format!("{base}/{{id}}/students"), get(get_student))
            .route(&format!("{base}/{{id}}/teachers"), get(get_teacher))
    })
}

async fn create_schedule(
    State(state): State<AppState>,
    Json(input): Json<ScheduleCreateInput>,
) -> Result<impl IntoResponse, AppError> {
    let schedule = state.schedules.create_schedule(input).await?;
    let location = format!("/api/schedules/{}", schedule.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(schedule)))
}

async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.schedules.delete_schedule(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn schedules(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<Vec<Schedule>>, AppError> {
    let args = FindManyArgs::<ScheduleWhereInput>::from_query(&params)?;
    Ok(Json(state.schedules.schedules(args).await?))
}

async fn schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Schedule>, AppError> {
    Ok(Json(state.schedules.schedule(&id).await?))
}

async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Room>>, AppError> {
    Ok(Json(state.schedules.get_room(&id).await?))
}

async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Student>>, AppError> {
    Ok(Json(state.schedules.get_student(&id).await?))
}

async fn get_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Option<Teacher>>, AppError> {
    Ok(Json(state.schedules.get_teacher(&id).await?))
}

async fn schedules_meta(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<MetadataDto>, AppError> {
    let args = FindManyArgs::<ScheduleWhereInput>::from_query(&params)?;
    Ok(Json(state.schedules.schedules_meta(args).await?))
}

async fn update_schedule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ScheduleUpdateInput>,
) -> Result<StatusCode, AppError> {
    state.schedules.update_schedule(&id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}
