mod rooms;
mod schedules;
mod students;
mod teachers;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Decoded query-string pairs, kept in order so repeated keys survive.
type QueryPairs = Vec<(String, String)>;

/// Base paths for one collection. Clients address collections both as
/// `/api/rooms` and `/api/Rooms`.
fn collection_paths(name: &str) -> [String; 2] {
    let mut chars = name.chars();
    let capitalised: String = chars
        .next()
        .map(|first| first.to_ascii_uppercase())
        .into_iter()
        .chain(chars)
        .collect();
    [format!("/api/{}", name), format!("/api/{}", capitalised)]
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(rooms::routes())
        .merge(schedules::routes())
        .merge(students::routes())
        .merge(teachers::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}
