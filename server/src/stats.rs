use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
};
use statsd_common::{GameResult, PlayerStats};
use tracing::info;

use crate::auth::{bad_json, validate_name};
use crate::error::ApiError;
use crate::{repository, AppState};

pub async fn record_game_result(
    State(state): State<AppState>,
    request: Result<Json<GameResult>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(result) = request.map_err(bad_json)?;

    validate_name("Winner", &result.winner)?;
    validate_name("Loser", &result.loser)?;
    if result.winner == result.loser {
        return Err(ApiError::BadRequest("Winner and loser must differ".to_string()));
    }

    let db = state.db.get_instance()?;
    info!(
        "API: Game {} finished, winner '{}' loser '{}' (draw: {})",
        result.game_id.as_deref().unwrap_or("-"),
        result.winner,
        result.loser,
        result.draw,
    );

    db.record_result(&result.winner, &result.loser).await?;
    Ok(StatusCode::OK)
}

pub async fn get_game_stats(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PlayerStats>, ApiError> {
    let db = state.db.get_instance()?;
    let stats = repository::fetch_stats(db, &username).await?;
    Ok(Json(stats))
}

/// Answers the stats and profile paths when the username segment is missing.
pub async fn missing_username() -> ApiError {
    ApiError::BadRequest("Username is required".to_string())
}
