use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::AppError;
use crate::models::{
    MetadataDto, Student, StudentCreateInput, StudentUpdateInput, StudentWhereInput, Schedule,
    ScheduleWhereInput, WhereUniqueInput,
};
use crate::query::FindManyArgs;
use crate::state::AppState;

use super::{QueryPairs, collection_paths};

pub fn routes() -> Router<AppState> {
    collection_paths("students").into_iter().fold(Router::new(), |router, base| {
        router
            .route(&base, get(students).post(create_student))
            .route(&format!("{base}/meta"), post(students_meta))
            .route(
                &format!("{base}/{{id}}"),
                get(student).patch(update_student).delete(delete_student),
            )
            .route(
                &format!("{base}/{{id}}/schedules"),
                get(find_schedules)
                    .post(connect_schedules)
                    .patch(update_schedules)
                    .delete(disconnect_schedules),
            )
    })
}

async fn create_student(
    State(state): State<AppState>,
    Json(input): Json<StudentCreateInput>,
) -> Result<impl IntoResponse, AppError> {
    let student = state.students.create_student(input).await?;
    let location = format!("/api/students/{}", student.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(student)))
}

async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.students.delete_student(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn students(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<Vec<Student>>, AppError> {
    let args = FindManyArgs::<StudentWhereInput>::from_query(&params)?;
    Ok(Json(state.students.students(args).await?))
}

async fn student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Student>, AppError> {
    Ok(Json(state.students.student(&id).await?))
}

async fn connect_schedules(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(schedules): Json<Vec<WhereUniqueInput>>,
) -> Result<StatusCode, AppError> {
    state.students.connect_schedules(&id, &schedules).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn disconnect_schedules(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(schedules): Json<Vec<WhereUniqueInput>>,
) -> Result<StatusCode, AppError> {
    state.students.disconnect_schedules(&id, &schedules).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_schedules(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<Vec<Schedule>>, AppError> {
    let args = FindManyArgs::<ScheduleWhereInput>::from_query(&params)?;
    Ok(Json(state.students.find_schedules(&id, args).await?))
}

async fn students_meta(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<MetadataDto>, AppError> {
    let args = FindManyArgs::<StudentWhereInput>::from_query(&params)?;
    Ok(Json(state.students.students_meta(args).await?))
}

async fn update_schedules(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(schedules): Json<Vec<WhereUniqueInput>>,
) -> Result<StatusCode, AppError> {
    state.students.update_schedules(&id, &schedules).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<StudentUpdateInput>,
) -> Result<StatusCode, AppError> {
    state.students.update_student(&id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}
