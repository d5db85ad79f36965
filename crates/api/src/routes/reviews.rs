use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use infra::models::{TeamReviewRow, TeamStatus, TournamentReviewRow, UserRow};
use infra::store::{
    NewTeamReview, NewTournamentReview, ReviewStore, TeamReviewPatch, TeamStore,
    TournamentReviewPatch, TournamentStore,
};

use crate::auth::{permissions, Claims, MaybeUser};
use crate::error::AppError;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::validate_rating;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTeamReviewRequest {
    pub coaching: i16,
    pub value: i16,
    pub organization: i16,
    pub playing_time: i16,
    pub overall_rating: i16,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTeamReviewRequest {
    pub coaching: Option<i16>,
    pub value: Option<i16>,
    pub organization: Option<i16>,
    pub playing_time: Option<i16>,
    pub overall_rating: Option<i16>,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTournamentReviewRequest {
    pub overall_rating: i16,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTournamentReviewRequest {
    pub overall_rating: Option<i16>,
    pub comment: Option<String>,
}

async fn visible_team(state: &AppState, team_id: Uuid) -> Result<(), AppError> {
    state
        .store
        .get_team(team_id)
        .await?
        .filter(|t| t.status == TeamStatus::Approved.as_str())
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("team not found".to_string()))
}

/// Reviews may be anonymous: without a token the row simply carries no
/// author and can never be edited afterwards.
pub async fn create_team_review(
    State(state): State<AppState>,
    MaybeUser(claims): MaybeUser,
    Path(team_id): Path<Uuid>,
    Json(body): Json<CreateTeamReviewRequest>,
) -> ApiResult<TeamReviewRow> {
    visible_team(&state, team_id).await?;

    let user_id = match &claims {
        Some(claims) => Some(permissions::current_user(&state, claims).await?.id),
        None => None,
    };

    let review = NewTeamReview {
        team_id,
        user_id,
        coaching: validate_rating("coaching", body.coaching)?,
        value: validate_rating("value", body.value)?,
        organization: validate_rating("organization", body.organization)?,
        playing_time: validate_rating("playing_time", body.playing_time)?,
        overall_rating: validate_rating("overall_rating", body.overall_rating)?,
        comment: body.comment,
    };

    let created = state.store.insert_team_review(review).await?;
    Ok(ApiResponse::Created(created))
}

pub async fn list_team_reviews(
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Vec<TeamReviewRow>> {
    visible_team(&state, team_id).await?;

    let reviews = state.store.list_team_reviews(team_id).await?;
    Ok(ApiResponse::Ok(reviews))
}

pub async fn update_team_review(
    State(state): State<AppState>,
    claims: Claims,
    Path((team_id, review_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateTeamReviewRequest>,
) -> ApiResult<TeamReviewRow> {
    let user = permissions::current_user(&state, &claims).await?;

    let review = state
        .store
        .get_team_review(review_id)
        .await?
        .filter(|r| r.team_id == team_id)
        .ok_or_else(|| AppError::NotFound("review not found".to_string()))?;

    require_author(&user, review.user_id)?;

    let patch = TeamReviewPatch {
        coaching: body
            .coaching
            .map(|v| validate_rating("coaching", v))
            .transpose()?,
        value: body.value.map(|v| validate_rating("value", v)).transpose()?,
        organization: body
            .organization
            .map(|v| validate_rating("organization", v))
            .transpose()?,
        playing_time: body
            .playing_time
            .map(|v| validate_rating("playing_time", v))
            .transpose()?,
        overall_rating: body
            .overall_rating
            .map(|v| validate_rating("overall_rating", v))
            .transpose()?,
        comment: body.comment,
    };

    let updated = state
        .store
        .update_team_review(review_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("review not found".to_string()))?;

    Ok(ApiResponse::Ok(updated))
}

pub async fn delete_team_review(
    State(state): State<AppState>,
    claims: Claims,
    Path((team_id, review_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    let user = permissions::current_user(&state, &claims).await?;

    let review = state
        .store
        .get_team_review(review_id)
        .await?
        .filter(|r| r.team_id == team_id)
        .ok_or_else(|| AppError::NotFound("review not found".to_string()))?;

    require_author_or_admin(&user, review.user_id)?;

    state.store.delete_team_review(review_id).await?;
    Ok(ApiResponse::Message("review deleted".to_string()))
}

pub async fn create_tournament_review(
    State(state): State<AppState>,
    MaybeUser(claims): MaybeUser,
    Path(tournament_id): Path<Uuid>,
    Json(body): Json<CreateTournamentReviewRequest>,
) -> ApiResult<TournamentReviewRow> {
    state
        .store
        .get_tournament(tournament_id)
        .await?
        .ok_or_else(|| AppError::NotFound("tournament not found".to_string()))?;

    let user_id = match &claims {
        Some(claims) => Some(permissions::current_user(&state, claims).await?.id),
        None => None,
    };

    let review = NewTournamentReview {
        tournament_id,
        user_id,
        overall_rating: validate_rating("overall_rating", body.overall_rating)?,
        comment: body.comment,
    };

    let created = state.store.insert_tournament_review(review).await?;
    Ok(ApiResponse::Created(created))
}

pub async fn list_tournament_reviews(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
) -> ApiResult<Vec<TournamentReviewRow>> {
    state
        .store
        .get_tournament(tournament_id)
        .await?
        .ok_or_else(|| AppError::NotFound("tournament not found".to_string()))?;

    let reviews = state.store.list_tournament_reviews(tournament_id).await?;
    Ok(ApiResponse::Ok(reviews))
}

pub async fn update_tournament_review(
    State(state): State<AppState>,
    claims: Claims,
    Path((tournament_id, review_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateTournamentReviewRequest>,
) -> ApiResult<TournamentReviewRow> {
    let user = permissions::current_user(&state, &claims).await?;

    let review = state
        .store
        .get_tournament_review(review_id)
        .await?
        .filter(|r| r.tournament_id == tournament_id)
        .ok_or_else(|| AppError::NotFound("review not found".to_string()))?;

    require_author(&user, review.user_id)?;

    let patch = TournamentReviewPatch {
        overall_rating: body
            .overall_rating
            .map(|v| validate_rating("overall_rating", v))
            .transpose()?,
        comment: body.comment,
    };

    let updated = state
        .store
        .update_tournament_review(review_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("review not found".to_string()))?;

    Ok(ApiResponse::Ok(updated))
}

pub async fn delete_tournament_review(
    State(state): State<AppState>,
    claims: Claims,
    Path((tournament_id, review_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    let user = permissions::current_user(&state, &claims).await?;

    let review = state
        .store
        .get_tournament_review(review_id)
        .await?
        .filter(|r| r.tournament_id == tournament_id)
        .ok_or_else(|| AppError::NotFound("review not found".to_string()))?;

    require_author_or_admin(&user, review.user_id)?;

    state.store.delete_tournament_review(review_id).await?;
    Ok(ApiResponse::Message("review deleted".to_string()))
}

/// Editing is reserved for the author; an anonymous review has none.
fn require_author(user: &UserRow, author: Option<Uuid>) -> Result<(), AppError> {
    if author == Some(user.id) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "only the author may edit this review".to_string(),
    ))
}

fn require_author_or_admin(user: &UserRow, author: Option<Uuid>) -> Result<(), AppError> {
    if user.is_admin() || author == Some(user.id) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "only the author or an admin may delete this review".to_string(),
    ))
}
