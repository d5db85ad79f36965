use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use infra::models::{Role, UserRow};
use infra::store::{NewUser, UserStore};
use infra::StoreError;

use crate::auth::{password::PasswordService, permissions, Claims};
use crate::error::AppError;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::require_non_empty;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserRow,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> ApiResult<AuthPayload> {
    let email = require_non_empty("email", &body.email)?.to_lowercase();
    if !email.contains('@') {
        return Err(AppError::Validation("email is invalid".to_string()));
    }
    let name = require_non_empty("name", &body.name)?;

    PasswordService::validate_password_strength(&body.password)?;
    let password_hash = PasswordService::hash_password(&body.password)?;

    let user = state
        .store
        .insert_user(NewUser {
            email,
            name,
            password_hash,
            role: Role::User.as_str().to_string(),
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => {
                AppError::Validation("email is already registered".to_string())
            }
            other => other.into(),
        })?;

    let token = state.jwt_service().create_token(user.id, user.email.clone())?;

    Ok(ApiResponse::Created(AuthPayload { token, user }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<AuthPayload> {
    // One error for both unknown email and bad password.
    let invalid = || AppError::Unauthorized("invalid email or password".to_string());

    let user = state
        .store
        .get_user_by_email(body.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !PasswordService::verify_password(&body.password, &user.password_hash)? {
        return Err(invalid());
    }

    let token = state.jwt_service().create_token(user.id, user.email.clone())?;

    Ok(ApiResponse::Ok(AuthPayload { token, user }))
}

pub async fn me(State(state): State<AppState>, claims: Claims) -> ApiResult<UserRow> {
    let user = permissions::current_user(&state, &claims).await?;
    Ok(ApiResponse::Ok(user))
}
