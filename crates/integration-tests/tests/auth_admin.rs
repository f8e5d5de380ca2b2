//! Integration tests for login, sessions and the admin guard.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use crowe_logic_integration_tests::{ADMIN_PASSWORD, TestServer, expect_error, expect_json};
use crowe_logic_storefront::services::auth::AuthService;
use reqwest::StatusCode;
use serde_json::json;

// ============================================================================
// Login & Session
// ============================================================================

#[tokio::test]
async fn test_login_session_logout() {
    let server = TestServer::spawn().await;

    let message = expect_error(
        server.get("/api/auth/session").await,
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(message, "Not authenticated");

    let user = expect_json(
        server
            .post_json(
                "/api/auth/login",
                &json!({"username": "admin", "password": ADMIN_PASSWORD}),
            )
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(user["username"], "admin");
    assert_eq!(user["isAdmin"], true);
    assert!(user.get("passwordHash").is_none());

    let session = expect_json(server.get("/api/auth/session").await, StatusCode::OK).await;
    assert_eq!(session, user);

    let body = expect_json(
        server.post_json("/api/auth/logout", &json!({})).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(body["message"], "Logged out successfully");

    let resp = server.get("/api/auth/session").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejections() {
    let server = TestServer::spawn().await;

    let message = expect_error(
        server
            .post_json(
                "/api/auth/login",
                &json!({"username": "admin", "password": "not-the-password"}),
            )
            .await,
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(message, "Invalid username or password");

    // Unknown users look the same as wrong passwords
    let message = expect_error(
        server
            .post_json(
                "/api/auth/login",
                &json!({"username": "nobody", "password": ADMIN_PASSWORD}),
            )
            .await,
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(message, "Invalid username or password");

    let message = expect_error(
        server
            .post_json("/api/auth/login", &json!({"username": "admin"}))
            .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(message, "Username and password are required");
}

#[tokio::test]
async fn test_login_is_rate_limited() {
    let server = TestServer::spawn().await;
    let client = server.anonymous_client();

    let mut statuses = Vec::new();
    for _ in 0..6 {
        let resp = client
            .post(server.url("/api/auth/login"))
            .json(&json!({"username": "admin", "password": "wrong-password"}))
            .send()
            .await
            .unwrap();
        statuses.push(resp.status());
    }

    assert!(statuses[..5].iter().all(|s| *s == StatusCode::UNAUTHORIZED));
    assert_eq!(statuses[5], StatusCode::TOO_MANY_REQUESTS);
}

// ============================================================================
// Admin Guard
// ============================================================================

#[tokio::test]
async fn test_admin_routes_reject_anonymous_and_non_admin() {
    let server = TestServer::spawn().await;

    let message = expect_error(
        server
            .post_json("/api/ingredients", &json!({"name": "Chaga"}))
            .await,
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(message, "Unauthorized");

    AuthService::new(server.storage.as_ref())
        .register("shopper", "shopper-password", false)
        .await
        .unwrap();
    server.login("shopper", "shopper-password").await;

    let message = expect_error(
        server
            .post_json("/api/ingredients", &json!({"name": "Chaga"}))
            .await,
        StatusCode::FORBIDDEN,
    )
    .await;
    assert_eq!(message, "Forbidden: Admin access required");

    let resp = server.get("/api/export/shopify").await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Admin Catalog Management
// ============================================================================

#[tokio::test]
async fn test_product_crud() {
    let server = TestServer::spawn().await;
    server.login_admin().await;

    let created = expect_json(
        server
            .post_json(
                "/api/products",
                &json!({
                    "name": "Deep Rest",
                    "description": "Evening blend",
                    "sku": "clf-006",
                    "healthBenefit": "relaxation",
                    "status": "draft",
                }),
            )
            .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(created["sku"], "CLF-006");
    assert_eq!(created["status"], "draft");
    let id = created["id"].as_i64().unwrap();

    let resp = server
        .post_json(
            "/api/products",
            &json!({
                "name": "Copy",
                "description": "Same SKU",
                "sku": "CLF-006",
                "healthBenefit": "mood",
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body = expect_json(
        server
            .post_json(
                "/api/products",
                &json!({
                    "name": "  ",
                    "description": "No name",
                    "sku": "CLF-007",
                    "healthBenefit": "mood",
                }),
            )
            .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(body["errors"][0]["field"], "name");

    let resp = server
        .post_json(
            "/api/products",
            &json!({
                "name": "Bad benefit",
                "description": "x",
                "sku": "CLF-008",
                "healthBenefit": "longevity",
            }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let updated = expect_json(
        server
            .put_json(&format!("/api/products/{id}"), &json!({"status": "active"}))
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(updated["status"], "active");
    assert_eq!(updated["name"], "Deep Rest");

    let resp = server
        .put_json("/api/products/999", &json!({"status": "active"}))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Missing product wins over a SKU that is already taken
    let resp = server
        .put_json("/api/products/999", &json!({"sku": "CLF-001"}))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server.delete(&format!("/api/products/{id}")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = server.delete(&format!("/api/products/{id}")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_composition_management() {
    let server = TestServer::spawn().await;
    server.login_admin().await;

    let ingredient = expect_json(
        server
            .post_json(
                "/api/ingredients",
                &json!({"name": "Chaga", "scientificName": "Inonotus obliquus"}),
            )
            .await,
        StatusCode::CREATED,
    )
    .await;
    let ingredient_id = ingredient["id"].as_i64().unwrap();

    let renamed = expect_json(
        server
            .put_json(
                &format!("/api/ingredients/{ingredient_id}"),
                &json!({"description": "Birch conk"}),
            )
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(renamed["name"], "Chaga");
    assert_eq!(renamed["description"], "Birch conk");

    let row = expect_json(
        server
            .post_json(
                "/api/product-ingredients",
                &json!({"productId": 3, "ingredientId": ingredient_id, "percentage": 25}),
            )
            .await,
        StatusCode::CREATED,
    )
    .await;
    let row_id = row["id"].as_i64().unwrap();

    let updated = expect_json(
        server
            .put_json(
                &format!("/api/product-ingredients/{row_id}"),
                &json!({"percentage": 30}),
            )
            .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(updated["percentage"], 30);

    let product = expect_json(server.get("/api/products/3").await, StatusCode::OK).await;
    assert!(product["ingredients"]
        .as_array()
        .unwrap()
        .iter()
        .any(|i| i["ingredient"]["name"] == "Chaga" && i["percentage"] == 30));

    let resp = server
        .post_json(
            "/api/product-ingredients",
            &json!({"productId": 3, "ingredientId": ingredient_id, "percentage": 101}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = server
        .delete(&format!("/api/product-ingredients/{row_id}"))
        .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let message = expect_error(
        server
            .delete(&format!("/api/product-ingredients/{row_id}"))
            .await,
        StatusCode::NOT_FOUND,
    )
    .await;
    assert_eq!(message, "Product ingredient not found");

    let message = expect_error(
        server.delete("/api/product-ingredients/x").await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(message, "Invalid product ingredient ID");
}

#[tokio::test]
async fn test_document_create() {
    let server = TestServer::spawn().await;
    server.login_admin().await;

    // Warm the batch cache
    let batch = expect_json(
        server.get("/api/batches/code/CLF001-2304").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(batch["documents"].as_array().unwrap().len(), 1);

    let doc = expect_json(
        server
            .post_json(
                "/api/documents",
                &json!({
                    "title": "Heavy metals panel",
                    "url": "https://crowelogic.com/lab/clf001-2304-metals.pdf",
                    "type": "lab_result",
                    "batchId": 1,
                }),
            )
            .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(doc["type"], "lab_result");

    // Creating a document drops the cached page
    let batch = expect_json(
        server.get("/api/batches/code/CLF001-2304").await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(batch["documents"].as_array().unwrap().len(), 2);

    let resp = server
        .post_json(
            "/api/documents",
            &json!({"title": "Relative", "url": "/docs/a.pdf", "type": "research"}),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
