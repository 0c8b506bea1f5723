use axum::extract::{Json, Path, State};
use statsd_common::CombinedProfile;
use tracing::info;

use crate::error::ApiError;
use crate::{repository, AppState};

pub async fn get_combined_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<CombinedProfile>, ApiError> {
    info!("API: Retrieving combined profile for '{username}'");
    let db = state.db.get_instance()?;

    let profile = repository::fetch_combined_profile(db, &username).await?;
    Ok(Json(profile))
}
