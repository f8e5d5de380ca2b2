//! Integration tests for the public catalog API.
//!
//! Each test spawns its own in-memory storefront with the sample catalog.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use crowe_logic_integration_tests::{TestServer, expect_error, expect_json};
use reqwest::StatusCode;
use serde_json::Value;

// ============================================================================
// Health & Middleware
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let server = TestServer::spawn().await;

    let resp = server.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = server.get("/health/ready").await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_security_and_request_id_headers() {
    let server = TestServer::spawn().await;

    let resp = server
        .client
        .get(server.url("/api/ingredients"))
        .header("x-request-id", "req-abc-123")
        .send()
        .await
        .unwrap();

    let headers = resp.headers();
    assert_eq!(headers["x-request-id"], "req-abc-123");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");

    // Generated when the client sends none
    let resp = server.get("/health").await;
    assert!(resp.headers().contains_key("x-request-id"));
}

// ============================================================================
// Products
// ============================================================================

#[tokio::test]
async fn test_list_products_with_composition() {
    let server = TestServer::spawn().await;

    let body = expect_json(server.get("/api/products").await, StatusCode::OK).await;
    let products = body.as_array().unwrap();
    assert_eq!(products.len(), 5);

    let nexus = &products[0];
    assert_eq!(nexus["name"], "Neural Nexus");
    assert_eq!(nexus["sku"], "CLF-001");
    assert_eq!(nexus["healthBenefit"], "cognitive");
    assert_eq!(nexus["status"], "active");

    let ingredients = nexus["ingredients"].as_array().unwrap();
    assert_eq!(ingredients.len(), 4);
    assert_eq!(ingredients[0]["percentage"], 50);
    assert_eq!(ingredients[0]["ingredient"]["name"], "Lion's Mane");
    assert_eq!(
        ingredients[0]["ingredient"]["scientificName"],
        "Hericium erinaceus"
    );
}

#[tokio::test]
async fn test_filter_products_by_health_benefit() {
    let server = TestServer::spawn().await;

    let body = expect_json(
        server.get("/api/products?healthBenefit=immune").await,
        StatusCode::OK,
    )
    .await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Immune Elevation Complex", "Mycobeauty Elixir"]);

    // Unknown benefits fall back to the full list
    let body = expect_json(
        server.get("/api/products?healthBenefit=longevity").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_get_product() {
    let server = TestServer::spawn().await;

    let body = expect_json(server.get("/api/products/2").await, StatusCode::OK).await;
    assert_eq!(body["id"], 2);
    assert_eq!(body["name"], "Immune Elevation Complex");
    assert_eq!(body["ingredients"].as_array().unwrap().len(), 4);

    let message =
        expect_error(server.get("/api/products/abc").await, StatusCode::BAD_REQUEST).await;
    assert_eq!(message, "Invalid product ID");

    let message = expect_error(server.get("/api/products/999").await, StatusCode::NOT_FOUND).await;
    assert_eq!(message, "Product not found");
}

// ============================================================================
// Ingredients & Documents
// ============================================================================

#[tokio::test]
async fn test_list_ingredients() {
    let server = TestServer::spawn().await;

    let body = expect_json(server.get("/api/ingredients").await, StatusCode::OK).await;
    let ingredients = body.as_array().unwrap();
    assert_eq!(ingredients.len(), 6);
    assert!(ingredients.iter().any(|i| i["name"] == "Reishi"
        && i["scientificName"] == "Ganoderma lucidum"));
}

#[tokio::test]
async fn test_document_filters() {
    let server = TestServer::spawn().await;

    let all = expect_json(server.get("/api/documents").await, StatusCode::OK).await;
    assert_eq!(all.as_array().unwrap().len(), 8);

    let by_batch = expect_json(server.get("/api/documents?batchId=1").await, StatusCode::OK).await;
    let by_batch = by_batch.as_array().unwrap();
    assert_eq!(by_batch.len(), 1);
    assert_eq!(by_batch[0]["type"], "certificate");
    assert_eq!(by_batch[0]["batchId"], 1);

    let by_product =
        expect_json(server.get("/api/documents?productId=1").await, StatusCode::OK).await;
    let by_product = by_product.as_array().unwrap();
    assert_eq!(by_product.len(), 3);
    assert!(by_product.iter().all(|d| d["type"] == "scientific_study"));

    // batchId wins over productId
    let both = expect_json(
        server.get("/api/documents?productId=1&batchId=2").await,
        StatusCode::OK,
    )
    .await;
    assert!(both.as_array().unwrap().iter().all(|d| d["batchId"] == 2));

    let message = expect_error(
        server.get("/api/documents?ingredientId=x").await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(message, "Invalid ingredient ID");

    // An empty value is ignored, so the next filter applies
    let empty_batch = expect_json(
        server.get("/api/documents?batchId=&productId=1").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(empty_batch.as_array().unwrap().len(), 3);

    let unfiltered = expect_json(server.get("/api/documents?batchId=").await, StatusCode::OK).await;
    assert_eq!(unfiltered.as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_documents_by_ingredient() {
    let server = TestServer::spawn().await;

    let ingredients = expect_json(server.get("/api/ingredients").await, StatusCode::OK).await;
    let reishi_id = ingredients
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["name"] == "Reishi")
        .map(|i| i["id"].clone())
        .unwrap();

    let docs = expect_json(
        server
            .get(&format!("/api/documents?ingredientId={reishi_id}"))
            .await,
        StatusCode::OK,
    )
    .await;
    let docs: &Vec<Value> = docs.as_array().unwrap();
    assert_eq!(docs.len(), 2);
    assert!(docs.iter().all(|d| d["ingredientId"] == reishi_id));
}
