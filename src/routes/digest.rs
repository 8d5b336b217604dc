use axum::{extract::State, Json};
use tracing::instrument;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    middleware::AuthIdentity,
    models::digest::{DigestRecord, DigestRequest, DigestResponse},
};

/// POST /api/v1/digest
#[instrument(skip(state, request))]
pub async fn create_digest(
    State(state): State<AppState>,
    identity: AuthIdentity,
    Json(request): Json<DigestRequest>,
) -> Result<Json<DigestResponse>> {
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    // First authenticated access creates the user row
    let user = state
        .user_service
        .get_or_create(&identity.external_id)
        .await?;

    let outcome = state.pipeline.run(user.id, &request.url).await?;

    Ok(Json(DigestResponse {
        markdown: outcome.markdown,
        quota: outcome.quota,
        cached: outcome.cached,
        video_id: outcome.video_id,
        video_title: outcome.video_title,
    }))
}

/// GET /api/v1/digests
#[instrument(skip(state))]
pub async fn list_digests(
    State(state): State<AppState>,
    identity: AuthIdentity,
) -> Result<Json<Vec<DigestRecord>>> {
    let user = state
        .user_service
        .find_by_external_id(&identity.external_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let digests = state.digest_store.list(user.id).await?;

    Ok(Json(digests.into_iter().map(DigestRecord::from).collect()))
}
