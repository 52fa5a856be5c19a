use crate::AppState;
use crate::error::ApiError;
use axum::extract::State;

pub async fn health_handler(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    state.users.ping().await.map_err(|e| {
        tracing::error!(error = ?e, "health check failed, database unreachable");
        ApiError::Unavailable(e)
    })?;

    Ok("OK")
}
