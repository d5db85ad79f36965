use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use infra::models::{TournamentReviewRow, TournamentRow, UserRow};
use infra::pagination::LimitOffset;
use infra::rating::average_rating;
use infra::store::{NewTournament, ReviewStore, TournamentPatch, TournamentStore};

use crate::auth::{permissions, Claims};
use crate::error::AppError;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::require_non_empty;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TournamentListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct TournamentSummary {
    #[serde(flatten)]
    pub tournament: TournamentRow,
    pub avg_rating: f64,
    pub review_count: usize,
}

#[derive(Serialize)]
pub struct TournamentDetail {
    #[serde(flatten)]
    pub tournament: TournamentRow,
    pub avg_rating: f64,
    pub review_count: usize,
    pub reviews: Vec<TournamentReviewRow>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTournamentRequest {
    pub name: String,
    pub location: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTournamentRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
}

/// Tournaments carry no moderation status: they list as soon as they are
/// created.
pub async fn list_tournaments(
    State(state): State<AppState>,
    Query(query): Query<TournamentListQuery>,
) -> ApiResult<Vec<TournamentSummary>> {
    let page = LimitOffset::from_page(query.page, query.limit);
    let rows = state.store.list_tournaments(Some(page)).await?;

    let mut tournaments = Vec::with_capacity(rows.len());
    for tournament in rows {
        let reviews = state.store.list_tournament_reviews(tournament.id).await?;
        let ratings: Vec<i16> = reviews.iter().map(|r| r.overall_rating).collect();
        tournaments.push(TournamentSummary {
            avg_rating: average_rating(&ratings),
            review_count: ratings.len(),
            tournament,
        });
    }

    Ok(ApiResponse::Ok(tournaments))
}

pub async fn get_tournament(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TournamentDetail> {
    let tournament = state
        .store
        .get_tournament(id)
        .await?
        .ok_or_else(|| AppError::NotFound("tournament not found".to_string()))?;

    let reviews = state.store.list_tournament_reviews(tournament.id).await?;
    let ratings: Vec<i16> = reviews.iter().map(|r| r.overall_rating).collect();

    Ok(ApiResponse::Ok(TournamentDetail {
        avg_rating: average_rating(&ratings),
        review_count: ratings.len(),
        tournament,
        reviews,
    }))
}

pub async fn create_tournament(
    State(state): State<AppState>,
    claims: Claims,
    Json(body): Json<CreateTournamentRequest>,
) -> ApiResult<TournamentRow> {
    let user = permissions::current_user(&state, &claims).await?;

    let tournament = NewTournament {
        name: require_non_empty("name", &body.name)?,
        location: require_non_empty("location", &body.location)?,
        description: body.description,
        created_by: Some(user.id),
    };

    let created = state.store.insert_tournament(tournament).await?;
    Ok(ApiResponse::Created(created))
}

pub async fn update_tournament(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTournamentRequest>,
) -> ApiResult<TournamentRow> {
    let user = permissions::current_user(&state, &claims).await?;
    let tournament = state
        .store
        .get_tournament(id)
        .await?
        .ok_or_else(|| AppError::NotFound("tournament not found".to_string()))?;

    authorize_modification(&user, &tournament)?;

    let patch = TournamentPatch {
        name: body.name.map(|v| require_non_empty("name", &v)).transpose()?,
        location: body
            .location
            .map(|v| require_non_empty("location", &v))
            .transpose()?,
        description: body.description,
    };

    let updated = state
        .store
        .update_tournament(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("tournament not found".to_string()))?;

    Ok(ApiResponse::Ok(updated))
}

pub async fn delete_tournament(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let user = permissions::current_user(&state, &claims).await?;
    let tournament = state
        .store
        .get_tournament(id)
        .await?
        .ok_or_else(|| AppError::NotFound("tournament not found".to_string()))?;

    authorize_modification(&user, &tournament)?;

    state.store.delete_tournament(id).await?;
    Ok(ApiResponse::Message("tournament deleted".to_string()))
}

fn authorize_modification(user: &UserRow, tournament: &TournamentRow) -> Result<(), AppError> {
    if user.is_admin() || tournament.created_by == Some(user.id) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "only the creator or an admin may modify this tournament".to_string(),
    ))
}
