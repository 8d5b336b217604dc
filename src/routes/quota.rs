use axum::{extract::State, Json};
use tracing::instrument;

use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    middleware::AuthIdentity,
    models::quota::QuotaSnapshot,
};

/// GET /api/v1/quota
#[instrument(skip(state))]
pub async fn get_quota(
    State(state): State<AppState>,
    identity: AuthIdentity,
) -> Result<Json<QuotaSnapshot>> {
    let user = state
        .user_service
        .find_by_external_id(&identity.external_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let snapshot = state.quota_service.get_quota(user.id).await?;

    Ok(Json(snapshot))
}
