use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::auth::Claims;
use crate::error::AppError;
use crate::state::AppState;

pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Reject the request outright unless a valid bearer token is present.
    /// Verified claims land in the request extensions for the extractors
    /// below.
    pub async fn jwt_auth(
        State(state): State<AppState>,
        mut request: Request,
        next: Next,
    ) -> Result<Response, AppError> {
        let auth_header = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("invalid authorization header format".to_string())
        })?;

        let claims = state.jwt_service().verify_token(token)?;
        request.extensions_mut().insert(claims);

        Ok(next.run(request).await)
    }

    /// Same extraction, but the request proceeds either way. Used where
    /// anonymous access is allowed (e.g. submitting a review without an
    /// account).
    pub async fn optional_jwt_auth(
        State(state): State<AppState>,
        mut request: Request,
        next: Next,
    ) -> Response {
        if let Some(token) = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|header| header.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
        {
            if let Ok(claims) = state.jwt_service().verify_token(token) {
                request.extensions_mut().insert(claims);
            }
        }

        next.run(request).await
    }
}

impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_string()))
    }
}

/// Extractor for routes behind `optional_jwt_auth`.
pub struct MaybeUser(pub Option<Claims>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<Claims>().cloned()))
    }
}
