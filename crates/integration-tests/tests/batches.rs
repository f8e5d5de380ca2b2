//! Integration tests for batch transparency and batch management.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use crowe_logic_integration_tests::{TestServer, expect_error, expect_json};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_public_batch_lookup() {
    let server = TestServer::spawn().await;

    let body = expect_json(
        server.get("/api/batches/code/CLF001-2304").await,
        StatusCode::OK,
    )
    .await;

    assert_eq!(body["batchCode"], "CLF001-2304");
    assert_eq!(body["alcoholPercentage"], 30);
    assert_eq!(body["product"]["name"], "Neural Nexus");

    let ingredients = body["ingredients"].as_array().unwrap();
    assert_eq!(ingredients.len(), 2);
    assert_eq!(ingredients[0]["extractionRatio"], "1:4");
    assert_eq!(ingredients[0]["ingredient"]["name"], "Lion's Mane");

    let documents = body["documents"].as_array().unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["type"], "certificate");
}

#[tokio::test]
async fn test_batch_lookup_normalizes_code() {
    let server = TestServer::spawn().await;

    let body = expect_json(
        server.get("/api/batches/code/clf002-2304").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["batchCode"], "CLF002-2304");
    assert_eq!(body["product"]["sku"], "CLF-002");
}

#[tokio::test]
async fn test_batch_lookup_errors() {
    let server = TestServer::spawn().await;

    let message = expect_error(
        server.get("/api/batches/code/CLF999-0000").await,
        StatusCode::NOT_FOUND,
    )
    .await;
    assert_eq!(message, "Batch not found");

    // Too short to be a batch code
    let resp = server.get("/api/batches/code/AB1").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_list_requires_admin() {
    let server = TestServer::spawn().await;

    let message = expect_error(server.get("/api/batches").await, StatusCode::UNAUTHORIZED).await;
    assert_eq!(message, "Unauthorized");

    server.login_admin().await;

    let all = expect_json(server.get("/api/batches").await, StatusCode::OK).await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let filtered = expect_json(server.get("/api/batches?productId=2").await, StatusCode::OK).await;
    let filtered = filtered.as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["batchCode"], "CLF002-2304");

    let message = expect_error(
        server.get("/api/batches?productId=two").await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(message, "Invalid product ID");
}

#[tokio::test]
async fn test_batch_lifecycle() {
    let server = TestServer::spawn().await;
    server.login_admin().await;

    let created = expect_json(
        server
            .post_json(
                "/api/batches",
                &json!({
                    "batchCode": "clf001-2310",
                    "productId": 1,
                    "productionDate": "2023-10-02",
                    "alcoholPercentage": 28,
                }),
            )
            .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(created["batchCode"], "CLF001-2310");
    let batch_id = created["id"].as_i64().unwrap();

    let resp = server
        .post_json(
            "/api/batch-ingredients",
            &json!({
                "batchId": batch_id,
                "ingredientId": 1,
                "percentage": 55,
                "extractType": "Dual Extraction",
                "extractionRatio": "1:4",
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let public = expect_json(
        server.get("/api/batches/code/CLF001-2310").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(public["ingredients"].as_array().unwrap().len(), 1);

    // Updates are visible on the public page straight away
    let updated = expect_json(
        server
            .put_json(
                &format!("/api/batches/{batch_id}"),
                &json!({"notes": "Small pilot run"}),
            )
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(updated["notes"], "Small pilot run");
    assert_eq!(updated["alcoholPercentage"], 28);

    let public = expect_json(
        server.get("/api/batches/code/CLF001-2310").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(public["notes"], "Small pilot run");

    let resp = server.delete(&format!("/api/batches/{batch_id}")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = server.get("/api/batches/code/CLF001-2310").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server.delete(&format!("/api/batches/{batch_id}")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_batch_create_conflicts_and_references() {
    let server = TestServer::spawn().await;
    server.login_admin().await;

    let resp = server
        .post_json(
            "/api/batches",
            &json!({"batchCode": "CLF001-2304", "productId": 1, "productionDate": "2023-04-15"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = server
        .post_json(
            "/api/batches",
            &json!({"batchCode": "CLF404-2304", "productId": 404, "productionDate": "2023-04-15"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = expect_json(
        server
            .post_json(
                "/api/batches",
                &json!({
                    "batchCode": "CLF001-2311",
                    "productId": 1,
                    "productionDate": "2023-11-01",
                    "alcoholPercentage": 140,
                }),
            )
            .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["errors"][0]["field"], "alcoholPercentage");
}

#[tokio::test]
async fn test_product_with_batches_cannot_be_deleted() {
    let server = TestServer::spawn().await;
    server.login_admin().await;

    let resp = server.delete("/api/products/1").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // A product without batches goes, along with its composition
    let resp = server.delete("/api/products/3").await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = server.get("/api/products/3").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
