//! Tests for the HTTP wishlist client against a mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wishclip::services::wishlist_api::{HttpWishlistApi, WishlistApi};
use wishclip::types::errors::ApiError;
use wishclip::types::settings::ApiSettings;
use wishclip::types::submission::AddItemRequest;

fn client(server: &MockServer, timeout_ms: u64) -> HttpWishlistApi {
    HttpWishlistApi::new(&ApiSettings {
        base_url: format!("{}/api/", server.uri()),
        cookie_domain: "localhost".to_string(),
        timeout_ms,
    })
    .unwrap()
}

fn train_request() -> AddItemRequest {
    AddItemRequest {
        kid_id: Some("k1".to_string()),
        registry_id: None,
        title: "Wooden Train Set".to_string(),
        image: "https://cdn.example.com/train.jpg".to_string(),
        price: "34.99".to_string(),
        url: "https://toybarn.example.com/train".to_string(),
    }
}

#[tokio::test]
async fn test_who_am_i_sends_bearer_and_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "isLoggedIn": true,
            "userId": "u1",
            "email": "parent@example.com",
            "kids": [{"id": "k1", "name": "Ava", "avatar": "ignored"}],
            "registries": [{"id": "r1", "name": "Baby Shower", "occasion": "baby"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client(&server, 5_000).who_am_i("tok-123").await.unwrap();

    assert!(payload.is_logged_in);
    assert_eq!(payload.user_id.as_deref(), Some("u1"));
    assert_eq!(payload.kids[0].name, "Ava");
    assert_eq!(payload.registries[0].occasion.as_deref(), Some("baby"));
}

#[tokio::test]
async fn test_who_am_i_unauthorized_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Unauthorized"})))
        .mount(&server)
        .await;

    let err = client(&server, 5_000).who_am_i("expired").await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected { status: 401, .. }));
}

#[tokio::test]
async fn test_who_am_i_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client(&server, 5_000).who_am_i("t").await.unwrap_err();
    assert!(matches!(err, ApiError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_add_item_posts_camel_case_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/wishlist/add-external"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({
            "kidId": "k1",
            "title": "Wooden Train Set",
            "image": "https://cdn.example.com/train.jpg",
            "price": "34.99",
            "url": "https://toybarn.example.com/train"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "item": {"id": "item-9"},
            "message": "Added to Ava's wishlist!"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = client(&server, 5_000).add_item("tok", &train_request()).await.unwrap();

    assert!(response.success);
    assert_eq!(response.item["id"], "item-9");
    assert_eq!(response.message.as_deref(), Some("Added to Ava's wishlist!"));
}

#[tokio::test]
async fn test_add_item_conflict_keeps_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/wishlist/add-external"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"error": "This item is already on the wishlist"})),
        )
        .mount(&server)
        .await;

    let err = client(&server, 5_000).add_item("tok", &train_request()).await.unwrap_err();

    assert!(matches!(err, ApiError::Rejected { status: 409, .. }));
    assert_eq!(err.server_message(), Some("This item is already on the wishlist"));
}

#[tokio::test]
async fn test_add_item_error_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/wishlist/add-external"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client(&server, 5_000).add_item("tok", &train_request()).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected { status: 500, message: None }));
}

#[tokio::test]
async fn test_add_item_empty_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/wishlist/add-external"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let response = client(&server, 5_000).add_item("tok", &train_request()).await.unwrap();
    assert!(response.success);
    assert!(response.message.is_none());
}

#[tokio::test]
async fn test_hung_request_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/wishlist/add-external"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(2_000)))
        .mount(&server)
        .await;

    let err = client(&server, 200).add_item("tok", &train_request()).await.unwrap_err();
    assert!(matches!(err, ApiError::TimedOut), "got {:?}", err);
}

#[tokio::test]
async fn test_unreachable_server_is_network_error() {
    let api = HttpWishlistApi::new(&ApiSettings {
        base_url: "http://127.0.0.1:9".to_string(),
        cookie_domain: "localhost".to_string(),
        timeout_ms: 2_000,
    })
    .unwrap();

    let err = api.who_am_i("t").await.unwrap_err();
    assert!(matches!(err, ApiError::NetworkError(_) | ApiError::TimedOut));
}
