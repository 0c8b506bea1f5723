use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
};
use statsd_common::*;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::passwords::MAX_PASSWORD_BYTES;
use crate::repository;
use crate::AppState;

const MAX_USERNAME_LEN: usize = 64;

pub async fn create_account(
    State(state): State<AppState>,
    request: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<UserInfo>), ApiError> {
    let Json(request) = request.map_err(bad_json)?;
    validate_credentials(&request)?;

    let db = state.db.get_instance()?;
    info!("API: Creating account '{}'", request.username);

    let id = db.save_user(&request.username, &request.password).await?;

    info!("API: Created account '{}' with ID {id}", request.username);
    Ok((
        StatusCode::CREATED,
        Json(UserInfo { id, username: request.username }),
    ))
}

pub async fn signin(
    State(state): State<AppState>,
    request: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<UserInfo>, ApiError> {
    let Json(request) = request.map_err(bad_json)?;
    let db = state.db.get_instance()?;

    if !db.authenticate(&request.username, &request.password).await? {
        warn!("API: Failed sign-in for '{}'", request.username);
        return Err(ApiError::Unauthorized);
    }

    let user = repository::fetch_user(db, &request.username).await?;
    info!("API: '{}' signed in", user.username);
    Ok(Json(user))
}

pub(crate) fn bad_json(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest(rejection.body_text())
}

/// Names are stored and compared verbatim, so blank names and names with
/// surrounding whitespace are rejected rather than trimmed.
pub(crate) fn validate_name(label: &str, name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{label} must not be empty")));
    }
    if name.trim() != name {
        return Err(ApiError::BadRequest(format!(
            "{label} cannot start or end with whitespace"
        )));
    }
    Ok(())
}

fn validate_credentials(credentials: &Credentials) -> Result<(), ApiError> {
    let username = credentials.username.as_str();
    validate_name("Username", username)?;

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ApiError::BadRequest(format!(
            "Username must be at most {MAX_USERNAME_LEN} characters long"
        )));
    }
    if credentials.password.is_empty() {
        return Err(ApiError::BadRequest("Password must not be empty".to_string()));
    }
    if credentials.password.len() > MAX_PASSWORD_BYTES {
        return Err(ApiError::BadRequest(format!(
            "Password must be at most {MAX_PASSWORD_BYTES} bytes long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_validate_credentials() {
        assert!(validate_credentials(&credentials("carol", "pw1")).is_ok());
        assert!(validate_credentials(&credentials("", "pw1")).is_err());
        assert!(validate_credentials(&credentials("   ", "pw1")).is_err());
        assert!(validate_credentials(&credentials(" carol", "pw1")).is_err());
        assert!(validate_credentials(&credentials("carol", "")).is_err());
        assert!(validate_credentials(&credentials(&"x".repeat(65), "pw1")).is_err());
        assert!(validate_credentials(&credentials(&"x".repeat(64), "pw1")).is_ok());
        assert!(validate_credentials(&credentials("carol", &"p".repeat(72))).is_ok());
        assert!(validate_credentials(&credentials("carol", &"p".repeat(73))).is_err());
        assert!(validate_credentials(&credentials("carol", &"é".repeat(37))).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Winner", "alice").is_ok());
        assert!(validate_name("Winner", "alice smith").is_ok());
        assert!(validate_name("Winner", "").is_err());
        assert!(validate_name("Winner", "\t").is_err());
        assert!(validate_name("Winner", "alice ").is_err());
        assert!(validate_name("Winner", " alice").is_err());
    }
}
