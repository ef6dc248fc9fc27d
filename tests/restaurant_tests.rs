mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use food_platform::model::user::UserRole;
use serde_json::json;

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-image-bytes";

fn restaurant_fields(name: &str) -> Vec<(&str, &str)> {
    vec![
        ("storeName", name),
        ("brandName", "Napoli Group"),
        ("description", "Wood-fired pizza"),
        ("street", "1 Main St"),
        ("city", "Springfield"),
        ("postalCode", "12345"),
        ("country", "US"),
        ("phone", "5551234567"),
        ("email", "Owner@Pizza.example"),
    ]
}

/// Customer applies, admin approves; returns (restaurant id, owner token, admin token).
async fn approved_restaurant(app: &TestApp) -> (String, String, String) {
    let (_, owner) = app.seed_user("owner@example.com", UserRole::Customer, true).await;
    let (_, admin) = app.seed_user("root@example.com", UserRole::SystemAdmin, true).await;
    let res = app
        .multipart(Method::POST, "/api/restaurants", &owner, &restaurant_fields("Napoli"), Some(("image/png", PNG)))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let id = res.body["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/restaurants/{}/availability", id);
    let res = app.call(Method::PATCH, &uri, Some(&admin), Some(json!({ "isAvailable": true }))).await;
    assert_eq!(res.status, StatusCode::OK);
    (id, owner, admin)
}

#[tokio::test]
async fn test_application_is_pending_until_approved() {
    let app = TestApp::new();
    let (owner, token) = app.seed_user("chef@example.com", UserRole::Customer, true).await;
    let (_, admin) = app.seed_user("root@example.com", UserRole::SystemAdmin, true).await;

    let res = app
        .multipart(Method::POST, "/api/restaurants", &token, &restaurant_fields("Napoli"), Some(("image/png", PNG)))
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let data = &res.body["data"];
    assert_eq!(data["isAvailable"], false);
    assert_eq!(data["email"], "owner@pizza.example");
    assert_eq!(data["owner"], owner.id_hex());
    let image = data["image"].as_str().unwrap().to_string();
    assert!(image.starts_with("/uploads/restaurant-"));
    assert!(image.ends_with(".png"));
    let id = data["id"].as_str().unwrap().to_string();

    let served = app.call(Method::GET, &image, None, None).await;
    assert_eq!(served.status, StatusCode::OK);

    let res = app
        .multipart(Method::POST, "/api/restaurants", &token, &restaurant_fields("Second"), None)
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body["error"], "You already own a restaurant");

    let res = app.call(Method::GET, "/api/restaurants?available=true", None, None).await;
    assert_eq!(res.body["data"], json!([]));

    let res = app.call(Method::GET, "/api/restaurants/unavailable", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = app.call(Method::GET, "/api/restaurants/unavailable", Some(&admin), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"][0]["id"], id);

    let uri = format!("/api/restaurants/{}/availability", id);
    let res = app.call(Method::PATCH, &uri, Some(&admin), Some(json!({ "isAvailable": true }))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["isAvailable"], true);
    assert_eq!(app.users.get(&owner.id.unwrap()).unwrap().role, UserRole::RestaurantAdmin);

    let res = app.call(Method::GET, "/api/restaurants/owner", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["id"], id);

    let res = app.call(Method::GET, "/api/restaurants?available=true", None, None).await;
    assert_eq!(res.body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_application_rejects_bad_uploads_and_roles() {
    let app = TestApp::new();
    let (_, token) = app.seed_user("chef@example.com", UserRole::Customer, true).await;
    let (_, courier) = app.seed_user("courier@example.com", UserRole::DeliveryPersonnel, true).await;

    let res = app
        .multipart(Method::POST, "/api/restaurants", &token, &restaurant_fields("Napoli"), Some(("text/plain", &b"hello"[..])))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Only image files are allowed");

    let mut fields = restaurant_fields("Napoli");
    fields.retain(|(k, _)| *k != "city");
    let res = app.multipart(Method::POST, "/api/restaurants", &token, &fields, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "city is required");

    let res = app
        .multipart(Method::POST, "/api/restaurants", &courier, &restaurant_fields("Napoli"), None)
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["error"], "You do not have permission to perform this action");
}

#[tokio::test]
async fn test_only_owner_or_system_admin_may_edit() {
    let app = TestApp::new();
    let (id, owner, admin) = approved_restaurant(&app).await;
    let (_, rival) = app.seed_user("rival@example.com", UserRole::RestaurantAdmin, true).await;
    let uri = format!("/api/restaurants/{}", id);

    let res = app.multipart(Method::PUT, &uri, &rival, &[("city", "Shelbyville")], None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["error"], "You do not own this restaurant");

    let res = app.multipart(Method::PUT, &uri, &owner, &[("city", "Capital City")], None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["city"], "Capital City");
    assert_eq!(res.body["data"]["storeName"], "Napoli");

    let res = app.multipart(Method::PUT, &uri, &admin, &[("storeName", "Napoli Centrale")], None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["storeName"], "Napoli Centrale");

    let res = app.call(Method::GET, &uri, None, None).await;
    assert_eq!(res.body["data"]["city"], "Capital City");

    let res = app.call(Method::GET, "/api/restaurants/not-an-id", None, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_menu_lifecycle() {
    let app = TestApp::new();
    let (restaurant_id, owner, _) = approved_restaurant(&app).await;
    let (_, rival) = app.seed_user("rival@example.com", UserRole::RestaurantAdmin, true).await;

    let res = app
        .multipart(
            Method::POST,
            "/api/menu",
            &owner,
            &[("name", "Margherita"), ("price", "11.5"), ("category", "Pizza")],
            Some(("image/jpeg", &b"jpeg-bytes"[..])),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["data"]["restaurant"], restaurant_id);
    assert_eq!(res.body["data"]["isAvailable"], true);
    let item_id = res.body["data"]["id"].as_str().unwrap().to_string();

    let res = app
        .multipart(Method::POST, "/api/menu", &owner, &[("name", "Free"), ("price", "0"), ("category", "Pizza")], None)
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .multipart(Method::POST, "/api/menu", &rival, &[("name", "Orphan"), ("price", "3"), ("category", "Misc")], None)
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    let res = app.call(Method::GET, "/api/menu/mine", Some(&owner), None).await;
    assert_eq!(res.body["data"].as_array().unwrap().len(), 1);

    let item_uri = format!("/api/menu/{}", item_id);
    let res = app.multipart(Method::PUT, &item_uri, &rival, &[("price", "1")], None).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.multipart(Method::PUT, &item_uri, &owner, &[("price", "12.0")], None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["price"], 12.0);

    let res = app
        .call(Method::PATCH, &format!("{}/availability", item_uri), Some(&owner), Some(json!({ "isAvailable": false })))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["isAvailable"], false);

    let public_menu = format!("/api/restaurants/menu?restaurantId={}", restaurant_id);
    let res = app.call(Method::GET, &public_menu, None, None).await;
    assert_eq!(res.body["data"], json!([]));
    let res = app.call(Method::GET, &format!("/api/menu?restaurantId={}", restaurant_id), None, None).await;
    assert_eq!(res.body["data"].as_array().unwrap().len(), 1);

    let res = app.call(Method::GET, "/api/restaurants/menu", None, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.call(Method::DELETE, &item_uri, Some(&owner), None).await;
    assert_eq!(res.status, StatusCode::OK);
    let res = app.call(Method::GET, &item_uri, None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_deleting_restaurant_removes_its_menu() {
    let app = TestApp::new();
    let (restaurant_id, owner, _) = approved_restaurant(&app).await;
    for name in ["Marinara", "Diavola"] {
        let res = app
            .multipart(Method::POST, "/api/menu", &owner, &[("name", name), ("price", "9"), ("category", "Pizza")], None)
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
    }
    assert_eq!(app.menu_items.count(), 2);

    let res = app.call(Method::DELETE, &format!("/api/restaurants/{}", restaurant_id), Some(&owner), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(app.menu_items.count(), 0);

    let res = app.call(Method::GET, &format!("/api/restaurants/{}", restaurant_id), None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}
