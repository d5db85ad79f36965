use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use infra::models::{TeamReviewRow, TeamRow, TeamStatus, UserRow};
use infra::pagination::LimitOffset;
use infra::rating::average_rating;
use infra::store::{NewTeam, ReviewStore, TeamFilter, TeamPatch, TeamStore};

use crate::auth::{permissions, Claims};
use crate::error::AppError;
use crate::response::{ApiResponse, ApiResult};
use crate::routes::{require_non_empty, validate_age_groups, validate_state_code};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TeamListQuery {
    pub search: Option<String>,
    pub state: Option<String>,
    pub age_group: Option<String>,
    pub min_rating: Option<f64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Serialize)]
pub struct TeamSummary {
    #[serde(flatten)]
    pub team: TeamRow,
    pub avg_rating: f64,
    pub review_count: usize,
}

#[derive(Serialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: TeamRow,
    pub avg_rating: f64,
    pub review_count: usize,
    pub reviews: Vec<TeamReviewRow>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitTeamRequest {
    pub name: String,
    pub location: String,
    pub state: String,
    pub age_groups: Vec<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub state: Option<String>,
    pub age_groups: Option<Vec<String>>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
}

/// Public listing. Only approved teams are ever visible here, whatever
/// the filters say.
pub async fn list_teams(
    State(state): State<AppState>,
    Query(query): Query<TeamListQuery>,
) -> ApiResult<Vec<TeamSummary>> {
    let filter = TeamFilter {
        search: query.search,
        state: query.state,
        age_group: query.age_group,
    };
    let page = LimitOffset::from_page(query.page, query.limit);

    // min_rating filters on a read-time aggregate, so the page boundary
    // can only be applied after computing averages for every match.
    let rows = if query.min_rating.is_some() {
        state
            .store
            .list_teams(TeamStatus::Approved.as_str(), &filter, None)
            .await?
    } else {
        state
            .store
            .list_teams(TeamStatus::Approved.as_str(), &filter, Some(page))
            .await?
    };

    let mut teams = Vec::with_capacity(rows.len());
    for team in rows {
        let reviews = state.store.list_team_reviews(team.id).await?;
        let ratings: Vec<i16> = reviews.iter().map(|r| r.overall_rating).collect();
        teams.push(TeamSummary {
            avg_rating: average_rating(&ratings),
            review_count: ratings.len(),
            team,
        });
    }

    if let Some(min_rating) = query.min_rating {
        teams.retain(|t| t.avg_rating >= min_rating);
        teams = teams
            .into_iter()
            .skip(page.offset.max(0) as usize)
            .take(page.limit.max(0) as usize)
            .collect();
    }

    Ok(ApiResponse::Ok(teams))
}

pub async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<TeamDetail> {
    let team = state
        .store
        .get_team(id)
        .await?
        .filter(|t| t.status == TeamStatus::Approved.as_str())
        .ok_or_else(|| AppError::NotFound("team not found".to_string()))?;

    let reviews = state.store.list_team_reviews(team.id).await?;
    let ratings: Vec<i16> = reviews.iter().map(|r| r.overall_rating).collect();

    Ok(ApiResponse::Ok(TeamDetail {
        avg_rating: average_rating(&ratings),
        review_count: ratings.len(),
        team,
        reviews,
    }))
}

/// Public submission. The client has no say in the lifecycle fields:
/// every new team is pending and suggested by the caller.
pub async fn submit_team(
    State(state): State<AppState>,
    claims: Claims,
    Json(body): Json<SubmitTeamRequest>,
) -> ApiResult<TeamRow> {
    let user = permissions::current_user(&state, &claims).await?;

    let team = NewTeam {
        name: require_non_empty("name", &body.name)?,
        location: require_non_empty("location", &body.location)?,
        state: validate_state_code(&body.state)?,
        age_groups: validate_age_groups(&body.age_groups)?,
        description: body.description,
        contact_email: body.contact_email,
        suggested_by: Some(user.id),
    };

    let created = state.store.insert_team(team).await?;
    Ok(ApiResponse::Created(created))
}

pub async fn update_team(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTeamRequest>,
) -> ApiResult<TeamRow> {
    let user = permissions::current_user(&state, &claims).await?;
    let team = state
        .store
        .get_team(id)
        .await?
        .ok_or_else(|| AppError::NotFound("team not found".to_string()))?;

    authorize_modification(&user, &team)?;

    let patch = TeamPatch {
        name: body.name.map(|v| require_non_empty("name", &v)).transpose()?,
        location: body
            .location
            .map(|v| require_non_empty("location", &v))
            .transpose()?,
        state: body.state.map(|v| validate_state_code(&v)).transpose()?,
        age_groups: body
            .age_groups
            .map(|v| validate_age_groups(&v))
            .transpose()?,
        description: body.description,
        contact_email: body.contact_email,
    };

    let updated = state
        .store
        .update_team(id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound("team not found".to_string()))?;

    Ok(ApiResponse::Ok(updated))
}

pub async fn delete_team(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let user = permissions::current_user(&state, &claims).await?;
    let team = state
        .store
        .get_team(id)
        .await?
        .ok_or_else(|| AppError::NotFound("team not found".to_string()))?;

    authorize_modification(&user, &team)?;

    state.store.delete_team(id).await?;
    Ok(ApiResponse::Message("team deleted".to_string()))
}

fn authorize_modification(user: &UserRow, team: &TeamRow) -> Result<(), AppError> {
    if user.is_admin() || team.suggested_by == Some(user.id) {
        return Ok(());
    }
    Err(AppError::Forbidden(
        "only the suggester or an admin may modify this team".to_string(),
    ))
}
