use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use infra::models::{TeamRow, TeamStatus};
use infra::store::{TeamFilter, TeamStore};

use crate::auth::{permissions, Claims};
use crate::error::AppError;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct RejectTeamRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// The moderation queue, oldest submission first.
pub async fn pending_teams(State(state): State<AppState>, claims: Claims) -> ApiResult<Vec<TeamRow>> {
    permissions::require_admin(&state, &claims).await?;

    let teams = state
        .store
        .list_teams(TeamStatus::Pending.as_str(), &TeamFilter::default(), None)
        .await?;

    Ok(ApiResponse::Ok(teams))
}

pub async fn approve_team(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<Uuid>,
) -> ApiResult<TeamRow> {
    let admin = permissions::require_admin(&state, &claims).await?;

    let team = state
        .store
        .get_team(id)
        .await?
        .ok_or_else(|| AppError::NotFound("team not found".to_string()))?;

    let approved = state
        .store
        .transition_status(
            id,
            TeamStatus::Pending.as_str(),
            TeamStatus::Approved.as_str(),
            admin.id,
            Utc::now(),
            None,
        )
        .await?
        .ok_or_else(|| AppError::InvalidState(format!("team is already {}", team.status)))?;

    Ok(ApiResponse::Ok(approved))
}

pub async fn reject_team(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<Uuid>,
    Json(body): Json<RejectTeamRequest>,
) -> ApiResult<TeamRow> {
    let admin = permissions::require_admin(&state, &claims).await?;

    let team = state
        .store
        .get_team(id)
        .await?
        .ok_or_else(|| AppError::NotFound("team not found".to_string()))?;

    // The reason lives in its own column; rejection never rewrites the
    // submitter's description.
    let rejected = state
        .store
        .transition_status(
            id,
            TeamStatus::Pending.as_str(),
            TeamStatus::Rejected.as_str(),
            admin.id,
            Utc::now(),
            body.reason.filter(|r| !r.trim().is_empty()),
        )
        .await?
        .ok_or_else(|| AppError::InvalidState(format!("team is already {}", team.status)))?;

    Ok(ApiResponse::Ok(rejected))
}
