use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::error::AppError;
use crate::models::{
    MetadataDto, Room, RoomCreateInput, RoomUpdateInput, RoomWhereInput, Schedule,
    ScheduleWhereInput, WhereUniqueInput,
};
use crate::query::FindManyArgs;
use crate::state::AppState;

use super::{QueryPairs, collection_paths};

pub fn routes() -> Router<AppState> {
    collection_paths("rooms").into_iter().fold(Router::new(), |router, base| {
        router
            .route(&base, get(rooms).post(create_room))
            .route(&format!("{base}/meta"), post(rooms_meta))
            .route(
                &format!("{base}/{{id}}"),
                get(room).patch(update_room).delete(delete_room),
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

async fn create_room(
    State(state): State<AppState>,
    Json(input): Json<RoomCreateInput>,
) -> Result<impl IntoResponse, AppError> {
    let room = state.rooms.create_room(input).await?;
    let location = format!("/api/rooms/{}", room.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(room)))
}

async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.rooms.delete_room(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn rooms(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<Vec<Room>>, AppError> {
    let args = FindManyArgs::<RoomWhereInput>::from_query(&params)?;
    Ok(Json(state.rooms.rooms(args).await?))
}

async fn room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Room>, AppError> {
    Ok(Json(state.rooms.room(&id).await?))
}

async fn connect_schedules(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(schedules): Json<Vec<WhereUniqueInput>>,
) -> Result<StatusCode, AppError> {
    state.rooms.connect_schedules(&id, &schedules).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn disconnect_schedules(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(schedules): Json<Vec<WhereUniqueInput>>,
) -> Result<StatusCode, AppError> {
    state.rooms.disconnect_schedules(&id, &schedules).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn find_schedules(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<Vec<Schedule>>, AppError> {
    let args = FindManyArgs::<ScheduleWhereInput>::from_query(&params)?;
    Ok(Json(state.rooms.find_schedules(&id, args).await?))
}

async fn rooms_meta(
    State(state): State<AppState>,
    Query(params): Query<QueryPairs>,
) -> Result<Json<MetadataDto>, AppError> {
    let args = FindManyArgs::<RoomWhereInput>::from_query(&params)?;
    Ok(Json(state.rooms.rooms_meta(args).await?))
}

async fn update_schedules(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(schedules): Json<Vec<WhereUniqueInput>>,
) -> Result<StatusCode, AppError> {
    state.rooms.update_schedules(&id, &schedules).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<RoomUpdateInput>,
) -> Result<StatusCode, AppError> {
    state.rooms.update_room(&id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}
