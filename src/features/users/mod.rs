pub mod extract;

use crate::AppState;
use crate::database::is_unique_violation;
use crate::domain::{UserDraft, UserRecord};
use crate::error::{ApiError, ERR_DATABASE, ERR_CREATE_USER, ERR_DELETE_USER, ERR_UPDATE_USER};
use axum::{Json, Router, body::Bytes, extract::State, routing::get};
use extract::{UserId, parse_payload};
use tracing::{debug, info, warn};

pub const USER_DELETED: &str = "User deleted";

pub fn users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users_handler).post(create_user_handler))
        .route(
            "/{id}",
            get(get_user_handler)
                .put(update_user_handler)
                .delete(delete_user_handler),
        )
}

async fn list_users_handler(State(state): State<AppState>) -> Result<Json<Vec<UserRecord>>, ApiError> {
    let users = state
        .users
        .list_users()
        .await
        .map_err(ApiError::storage(ERR_DATABASE))?;

    debug!(count = users.len(), "listed users");
    Ok(Json(users))
}

async fn get_user_handler(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<Json<UserRecord>, ApiError> {
    // any lookup failure collapses to not found
    match state.users.get_user(id).await {
        Ok(Some(user)) => Ok(Json(user)),
        Ok(None) => {
            debug!(user_id = id, "user not found");
            Err(ApiError::NotFound)
        }
        Err(e) => {
            warn!(user_id = id, error = ?e, "error getting user");
            Err(ApiError::NotFound)
        }
    }
}

async fn create_user_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<UserRecord>, ApiError> {
    let draft: UserDraft = parse_payload(&body)?;

    match state.users.create_user(&draft).await {
        Ok(user) => {
            info!(user_id = user.id, "created {}", user);
            Ok(Json(user))
        }
        Err(e) if is_unique_violation(&e) => {
            warn!(error = ?e, "user rejected by a uniqueness constraint");
            Err(ApiError::CreateRejected(e))
        }
        Err(e) => Err(ApiError::storage(ERR_CREATE_USER)(e)),
    }
}

async fn update_user_handler(
    State(state): State<AppState>,
    UserId(id): UserId,
    body: Bytes,
) -> Result<Json<UserRecord>, ApiError> {
    let draft: UserDraft = parse_payload(&body)?;

    let updated = state
        .users
        .update_user(id, &draft)
        .await
        .map_err(ApiError::storage(ERR_UPDATE_USER))?;

    match updated {
        Some(user) => {
            info!(user_id = id, "updated {}", user);
            Ok(Json(user))
        }
        None => {
            warn!(user_id = id, "user not found for update");
            Err(ApiError::UserNotFound)
        }
    }
}

async fn delete_user_handler(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> Result<Json<&'static str>, ApiError> {
    // same lookup as get-one, so a failed lookup is also a 404
    match state.users.get_user(id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            debug!(user_id = id, "user not found for delete");
            return Err(ApiError::NotFound);
        }
        Err(e) => {
            warn!(user_id = id, error = ?e, "error getting user for delete");
            return Err(ApiError::NotFound);
        }
    }

    state
        .users
        .delete_user(id)
        .await
        .map_err(ApiError::storage(ERR_DELETE_USER))?;

    info!(user_id = id, "deleted user");
    Ok(Json(USER_DELETED))
}
