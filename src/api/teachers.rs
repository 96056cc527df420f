use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::AppError;
use crate::models::{
    MetadataDto, Teacher, TeacherCreateInput, TeacherUpdateInput, TeacherWhereInput, Schedule,
    ScheduleWhereInput, WhereUniqueInput,
};
use crate::query::FindManyArgs;
use crate::state::AppState;

use super::{QueryPairs, collection_paths};

pub fn routes() -> Router<AppState> {
    collection_paths("teachers").into_iter().fold(Router::new(), |router, base| {
        router
            .route(&base, get(teachers).post(create_teacher))
            .route(&format!("{base}/meta"), post(teachers_meta))
            .route(
                &format!("{base}/{{id}}"),
                get(teacher).patch(update_teacher).delete(delete_teacher),
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

async fn create_teacher(
    State(state): State<AppState>,
    Json(input): Json<TeacherCreateInput>,
) -> Result<impl IntoResponse, AppError> {
    let teacher = state.teachers.create_teacher(input).await?;
    let location = format!("/api/teachers/{}", teacher.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(teacher)))
}

async fn delete_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.teachers.delete_teacher(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn teachers(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<Vec<Teacher>>, AppError> {
    let args = FindManyArgs::<TeacherWhereInput>::from_query(&params)?;
    Ok(Json(state.teachers.teachers(args).await?))
}

async fn teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Teacher>, AppError> {
    Ok(Json(state.teachers.teacher(&id).await?))
}

async fn connect_schedules(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(schedules): Json<Vec<WhereUniqueInput>>,
) -> Result<StatusCode, AppError> {
    state.teachers.connect_schedules(&id, &schedules).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn disconnect_schedules(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(schedules): Json<Vec<WhereUniqueInput>>,
) -> Result<StatusCode, AppError> {
    state.teachers.disconnect_schedules(&id, &schedules).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_schedules(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<Vec<Schedule>>, AppError> {
    let args = FindManyArgs::<ScheduleWhereInput>::from_query(&params)?;
    Ok(Json(state.teachers.find_schedules(&id, args).await?))
}

async fn teachers_meta(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<MetadataDto>, AppError> {
    let args = FindManyArgs::<TeacherWhereInput>::from_query(&params)?;
    Ok(Json(state.teachers.teachers_meta(args).await?))
}

async fn update_schedules(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(schedules): Json<Vec<WhereUniqueInput>>,
) -> Result<StatusCode, AppError> {
    state.teachers.update_schedules(&id, &schedules).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_teacher(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<TeacherUpdateInput>,
) -> Result<StatusCode, AppError> {
    state.teachers.update_teacher(&id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}
