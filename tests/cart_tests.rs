mod common;

use axum::http::{Method, StatusCode};
use bson::oid::ObjectId;
use common::TestApp;
use food_platform::model::user::UserRole;
use serde_json::json;

fn add_body(price: serde_json::Value, restaurant: &ObjectId, quantity: serde_json::Value) -> serde_json::Value {
    json!({ "price": price, "restaurant": restaurant.to_hex(), "quantity": quantity })
}

#[tokio::test]
async fn test_cart_requires_authentication() {
    let app = TestApp::new();
    let res = app.call(Method::GET, "/api/cart", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["success"], false);
}

#[tokio::test]
async fn test_same_item_merges_quantity_and_keeps_first_price() {
    let app = TestApp::new();
    let (_, token) = app.seed_user("eater@example.com", UserRole::Customer, true).await;
    let restaurant = ObjectId::new();
    let item = ObjectId::new();
    let uri = format!("/api/cart/{}", item.to_hex());

    let res = app.call(Method::POST, &uri, Some(&token), Some(add_body(json!(9.5), &restaurant, json!(2)))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["cart"][0]["quantity"], 2);

    let res = app.call(Method::POST, &uri, Some(&token), Some(add_body(json!("12"), &restaurant, json!("x")))).await;
    assert_eq!(res.status, StatusCode::OK);
    let cart = &res.body["data"]["cart"];
    assert_eq!(cart.as_array().unwrap().len(), 1);
    assert_eq!(cart[0]["quantity"], 3);
    assert_eq!(cart[0]["price"], 9.5);
    assert_eq!(cart[0]["menuItem"], item.to_hex());
}

#[tokio::test]
async fn test_items_from_a_second_restaurant_are_rejected() {
    let app = TestApp::new();
    let (_, token) = app.seed_user("mixed@example.com", UserRole::Customer, true).await;

    let first = format!("/api/cart/{}", ObjectId::new().to_hex());
    let res = app.call(Method::POST, &first, Some(&token), Some(add_body(json!(5), &ObjectId::new(), json!(1)))).await;
    assert_eq!(res.status, StatusCode::OK);

    let second = format!("/api/cart/{}", ObjectId::new().to_hex());
    let res = app.call(Method::POST, &second, Some(&token), Some(add_body(json!(5), &ObjectId::new(), json!(1)))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Cart can only contain items from one restaurant");
}

#[tokio::test]
async fn test_invalid_add_requests() {
    let app = TestApp::new();
    let (_, token) = app.seed_user("sloppy@example.com", UserRole::Customer, true).await;
    let restaurant = ObjectId::new();

    let res = app
        .call(Method::POST, "/api/cart/not-an-id", Some(&token), Some(add_body(json!(5), &restaurant, json!(1))))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "Valid menu item ID, price, and restaurant are required");

    let uri = format!("/api/cart/{}", ObjectId::new().to_hex());
    let res = app.call(Method::POST, &uri, Some(&token), Some(add_body(json!(0), &restaurant, json!(1)))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.call(Method::POST, &uri, Some(&token), Some(json!({ "price": 4 }))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_decrement_remove_and_clear() {
    let app = TestApp::new();
    let (_, token) = app.seed_user("trim@example.com", UserRole::Customer, true).await;
    let restaurant = ObjectId::new();
    let a = format!("/api/cart/{}", ObjectId::new().to_hex());
    let b = format!("/api/cart/{}", ObjectId::new().to_hex());
    app.call(Method::POST, &a, Some(&token), Some(add_body(json!(3), &restaurant, json!(2)))).await;
    app.call(Method::POST, &b, Some(&token), Some(add_body(json!(4), &restaurant, json!(1)))).await;

    let res = app.call(Method::PATCH, &a, Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["cart"][0]["quantity"], 1);

    let res = app.call(Method::PATCH, &a, Some(&token), None).await;
    assert_eq!(res.body["data"]["cart"].as_array().unwrap().len(), 1);

    let res = app.call(Method::PATCH, &a, Some(&token), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"], "Item not in cart");

    let res = app.call(Method::DELETE, &a, Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["cart"].as_array().unwrap().len(), 1);

    let res = app.call(Method::DELETE, "/api/cart", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Cart cleared successfully");
    assert_eq!(res.body["data"]["cart"], json!([]));
}

#[tokio::test]
async fn test_get_cart_enriches_lines_with_placeholder_on_failure() {
    let app = TestApp::new();
    let (user, token) = app.seed_user("reader@example.com", UserRole::Customer, true).await;
    let restaurant = ObjectId::new();
    let known = ObjectId::new();
    let unknown = ObjectId::new();
    app.catalog.know(&known, "Margherita", "/uploads/menu-1.png");

    for id in [&known, &unknown] {
        let uri = format!("/api/cart/{}", id.to_hex());
        app.call(Method::POST, &uri, Some(&token), Some(add_body(json!(8), &restaurant, json!(1)))).await;
    }

    let res = app.call(Method::GET, "/api/cart", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);
    let lines = res.body["data"].as_array().unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["name"], "Margherita");
    assert_eq!(lines[0]["image"], "/uploads/menu-1.png");
    assert_eq!(lines[1]["name"], "Unknown Item");
    assert_eq!(lines[1]["image"], "");
    assert_eq!(lines[1]["menuItem"], unknown.to_hex());

    assert!(app.catalog.seen_authorization.lock().unwrap().contains(&token));
    assert_eq!(app.users.get(&user.id.unwrap()).unwrap().cart.len(), 2);
}

#[tokio::test]
async fn test_nameless_catalog_entry_keeps_image() {
    let app = TestApp::new();
    let (_, token) = app.seed_user("nameless@example.com", UserRole::Customer, true).await;
    let item = ObjectId::new();
    app.catalog.know(&item, "", "/uploads/menu-2.png");

    let uri = format!("/api/cart/{}", item.to_hex());
    app.call(Method::POST, &uri, Some(&token), Some(add_body(json!(6), &ObjectId::new(), json!(1)))).await;

    let res = app.call(Method::GET, "/api/cart", Some(&token), None).await;
    assert_eq!(res.body["data"][0]["name"], "Unknown Item");
    assert_eq!(res.body["data"][0]["image"], "/uploads/menu-2.png");
}
