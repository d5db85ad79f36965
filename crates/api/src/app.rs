use std::time::Duration;

use axum::{
    extract::State,
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use infra::store::HealthStore;

use crate::auth::AuthMiddleware;
use crate::chat;
use crate::error::AppError;
use crate::routes;
use crate::state::AppState;

/// Build the axum router for the whole API surface.
///
/// Bearer tokens are verified once in an outer layer that only records the
/// claims; handlers that need a caller extract `Claims` and fail with 401
/// when none are present. The admin subtree additionally rejects at the
/// middleware boundary.
pub fn build_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/admin/pending-teams", get(routes::admin::pending_teams))
        .route("/admin/teams/{id}/approve", put(routes::admin::approve_team))
        .route("/admin/teams/{id}/reject", put(routes::admin::reject_team))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            AuthMiddleware::jwt_auth,
        ));

    Router::new()
        // Liveness check; also proves the store is reachable.
        .route("/health", get(health))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/me", get(routes::auth::me))
        .route(
            "/teams",
            get(routes::teams::list_teams).post(routes::teams::submit_team),
        )
        .route(
            "/teams/{id}",
            get(routes::teams::get_team)
                .put(routes::teams::update_team)
                .delete(routes::teams::delete_team),
        )
        .route(
            "/tournaments",
            get(routes::tournaments::list_tournaments).post(routes::tournaments::create_tournament),
        )
        .route(
            "/tournaments/{id}",
            get(routes::tournaments::get_tournament)
                .put(routes::tournaments::update_tournament)
                .delete(routes::tournaments::delete_tournament),
        )
        .route(
            "/reviews/teams/{team_id}",
            get(routes::reviews::list_team_reviews).post(routes::reviews::create_team_review),
        )
        .route(
            "/reviews/teams/{team_id}/{review_id}",
            put(routes::reviews::update_team_review).delete(routes::reviews::delete_team_review),
        )
        .route(
            "/reviews/tournaments/{tournament_id}",
            get(routes::reviews::list_tournament_reviews)
                .post(routes::reviews::create_tournament_review),
        )
        .route(
            "/reviews/tournaments/{tournament_id}/{review_id}",
            put(routes::reviews::update_tournament_review)
                .delete(routes::reviews::delete_tournament_review),
        )
        .route("/chat/rooms", get(routes::chat::list_rooms))
        .route(
            "/chat/rooms/{room_id}/messages",
            get(routes::chat::room_messages).post(routes::chat::post_message),
        )
        .route("/chat/ws", get(chat::ws::ws_handler))
        .merge(admin)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            AuthMiddleware::optional_jwt_auth,
        ))
        .with_state(state)
        // Useful default middlewares
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CorsLayer::permissive())
}

async fn health(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state.store.ping().await?;
    Ok("ok")
}
