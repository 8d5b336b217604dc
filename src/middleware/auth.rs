use crate::{
    app_state::AppState,
    error::{ApiError, Result},
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Verified caller identity, as issued by the identity provider.
#[derive(Debug, Clone)]
pub struct AuthIdentity {
    /// Stable external user id (JWT subject).
    pub external_id: String,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

/// Bearer-token authentication middleware.
///
/// Validates the identity provider's HS256 access token and stores the
/// verified subject in request extensions. Returns 401 if the header is
/// missing or validation fails.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized("Invalid Authorization format, expected 'Bearer <token>'".to_string())
    })?;

    let decoding_key = DecodingKey::from_secret(state.config.auth.jwt_secret.as_bytes());
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| ApiError::Unauthorized(format!("Invalid access token: {e}")))?;

    if token_data.claims.sub.is_empty() {
        return Err(ApiError::Unauthorized("Token has no subject".to_string()));
    }

    request.extensions_mut().insert(AuthIdentity {
        external_id: token_data.claims.sub,
    });

    Ok(next.run(request).await)
}

/// Axum extractor for the verified identity.
///
/// Only works on routes protected by `auth_middleware`.
impl<S> FromRequestParts<S> for AuthIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthIdentity>()
            .cloned()
            .ok_or_else(|| {
                ApiError::Unauthorized(
                    "Identity not found - route must be protected by auth_middleware".to_string(),
                )
            })
    }
}
