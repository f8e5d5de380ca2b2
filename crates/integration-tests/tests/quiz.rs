//! Integration tests for the recommendation quiz.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use crowe_logic_integration_tests::{TestServer, expect_error, expect_json};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_question_set() {
    let server = TestServer::spawn().await;

    let body = expect_json(server.get("/api/quiz").await, StatusCode::OK).await;
    let questions = body.as_array().unwrap();
    assert_eq!(questions.len(), 4);
    assert_eq!(questions[0]["id"], "goal");
    assert!(questions[0]["prompt"].as_str().is_some());

    let focus = &questions[0]["options"][0];
    assert_eq!(focus["id"], "focus");
    assert_eq!(focus["weights"][0]["benefit"], "cognitive");
    assert_eq!(focus["weights"][0]["points"], 3);
}

#[tokio::test]
async fn test_recommendation_for_focus() {
    let server = TestServer::spawn().await;

    let body = expect_json(
        server
            .post_json(
                "/api/quiz/recommendation",
                &json!({"answers": [
                    {"questionId": "goal", "optionId": "focus"},
                    {"questionId": "afternoon", "optionId": "foggy"},
                ]}),
            )
            .await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(body["primaryBenefit"], "cognitive");
    assert_eq!(body["scores"][0], json!({"benefit": "cognitive", "score": 5}));
    assert_eq!(body["scores"][1], json!({"benefit": "energy", "score": 1}));

    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Neural Nexus");
    assert_eq!(products[0]["ingredients"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_recommendation_skips_benefits_without_active_products() {
    let server = TestServer::spawn().await;

    // Energy wins, but its only product is not on sale yet
    let body = expect_json(
        server
            .post_json(
                "/api/quiz/recommendation",
                &json!({"answers": [
                    {"questionId": "goal", "optionId": "energy"},
                    {"questionId": "afternoon", "optionId": "drained"},
                ]}),
            )
            .await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(body["scores"][0]["benefit"], "energy");
    assert_eq!(body["primaryBenefit"], "immune");
    let names: Vec<&str> = body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Immune Elevation Complex"]);
}

#[tokio::test]
async fn test_invalid_submissions() {
    let server = TestServer::spawn().await;

    let message = expect_error(
        server
            .post_json("/api/quiz/recommendation", &json!({"answers": []}))
            .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(message, "At least one answer is required");

    let message = expect_error(
        server
            .post_json("/api/quiz/recommendation", &json!({}))
            .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(message, "At least one answer is required");

    let resp = server
        .post_json(
            "/api/quiz/recommendation",
            &json!({"answers": [{"questionId": "zodiac", "optionId": "leo"}]}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server
        .post_json(
            "/api/quiz/recommendation",
            &json!({"answers": [{"questionId": "goal", "optionId": "sleep"}]}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
