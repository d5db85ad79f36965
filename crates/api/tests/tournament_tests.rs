mod common;

use axum::http::{Method, StatusCode};
use common::*;
use serde_json::json;

#[tokio::test]
async fn tournaments_are_public_on_creation() {
    let (app, _) = test_app();
    let (token, _) = register_user(&app, "director@example.com", "Director").await;

    let (status, _) = request(
        &app,
        Method::POST,
        "/tournaments",
        None,
        Some(json!({ "name": "Peach State Classic", "location": "Macon, GA" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = request(
        &app,
        Method::POST,
        "/tournaments",
        Some(&token),
        Some(json!({
            "name": "Peach State Classic",
            "location": "Macon, GA",
            "description": "Memorial Day weekend",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let tournament_id = body["data"]["id"].as_str().unwrap().to_string();

    // No moderation gate: it lists immediately.
    let (status, body) = request(&app, Method::GET, "/tournaments", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let tournaments = body["data"].as_array().unwrap();
    assert_eq!(tournaments.len(), 1);
    assert_eq!(tournaments[0]["name"], "Peach State Classic");
    assert_eq!(tournaments[0]["avg_rating"], 0.0);

    let (status, body) = request(
        &app,
        Method::GET,
        &format!("/tournaments/{tournament_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["review_count"], 0);
}

#[tokio::test]
async fn tournament_creation_validation() {
    let (app, _) = test_app();
    let (token, _) = register_user(&app, "director@example.com", "Director").await;

    let (status, body) = request(
        &app,
        Method::POST,
        "/tournaments",
        Some(&token),
        Some(json!({ "name": "", "location": "Macon, GA" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn only_creator_or_admin_may_modify_tournaments() {
    let (app, state) = test_app();
    let (creator_token, _) = register_user(&app, "creator@example.com", "Creator").await;
    let (other_token, _) = register_user(&app, "other@example.com", "Other").await;
    let admin_token = create_admin(&state, "admin@example.com").await;

    let (_, body) = request(
        &app,
        Method::POST,
        "/tournaments",
        Some(&creator_token),
        Some(json!({ "name": "Summer Slam", "location": "Columbus, GA" })),
    )
    .await;
    let tournament_id = body["data"]["id"].as_str().unwrap().to_string();

    let patch = json!({ "location": "Columbus" });

    let (status, _) = request(
        &app,
        Method::PUT,
        &format!("/tournaments/{tournament_id}"),
        Some(&other_token),
        Some(patch.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = request(
        &app,
        Method::PUT,
        &format!("/tournaments/{tournament_id}"),
        Some(&creator_token),
        Some(patch),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["location"], "Columbus");

    let (status, _) = request(
        &app,
        Method::DELETE,
        &format!("/tournaments/{tournament_id}"),
        Some(&other_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app,
        Method::DELETE,
        &format!("/tournaments/{tournament_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        &app,
        Method::GET,
        &format!("/tournaments/{tournament_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tournament_reviews_aggregate() {
    let (app, _) = test_app();
    let (token, _) = register_user(&app, "director@example.com", "Director").await;

    let (_, body) = request(
        &app,
        Method::POST,
        "/tournaments",
        Some(&token),
        Some(json!({ "name": "Fall Brawl", "location": "Athens, GA" })),
    )
    .await;
    let tournament_id = body["data"]["id"].as_str().unwrap().to_string();

    for (rating, comment) in [(4, "Well run"), (5, "Great fields")] {
        let (status, _) = request(
            &app,
            Method::POST,
            &format!("/reviews/tournaments/{tournament_id}"),
            None,
            Some(json!({ "overall_rating": rating, "comment": comment })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, _) = request(
        &app,
        Method::POST,
        &format!("/reviews/tournaments/{tournament_id}"),
        None,
        Some(json!({ "overall_rating": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = request(
        &app,
        Method::GET,
        &format!("/tournaments/{tournament_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["avg_rating"], 4.5);
    assert_eq!(body["data"]["review_count"], 2);

    let (status, body) = request(
        &app,
        Method::GET,
        &format!("/reviews/tournaments/{tournament_id}"),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}
