mod common;

use axum::http::{Method, StatusCode};
use common::TestApp;
use food_platform::model::user::UserRole;
use serde_json::json;

#[tokio::test]
async fn test_profile_update_and_delete() {
    let app = TestApp::new();
    let (user, token) = app.seed_user("me@example.com", UserRole::Customer, true).await;

    let res = app.call(Method::GET, "/api/user/profile", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["email"], "me@example.com");

    let res = app.call(Method::PATCH, "/api/user/update", Some(&token), Some(json!({}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"], "No fields to update");

    let res = app
        .call(Method::PATCH, "/api/user/update", Some(&token), Some(json!({ "firstName": "Grace", "phone": "5550001111" })))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["firstName"], "Grace");
    assert_eq!(res.body["data"]["phone"], "5550001111");

    let res = app.call(Method::GET, &format!("/api/user/{}", user.id_hex()), None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["firstName"], "Grace");
    assert!(res.body["data"].get("passwordHash").is_none());

    let res = app.call(Method::DELETE, "/api/user/delete", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.call(Method::GET, "/api/user/profile", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"], "User not found");
}

#[tokio::test]
async fn test_role_change_is_restricted_to_system_admin() {
    let app = TestApp::new();
    let (target, customer) = app.seed_user("target@example.com", UserRole::Customer, true).await;
    let (_, admin) = app.seed_user("root@example.com", UserRole::SystemAdmin, true).await;
    let uri = format!("/api/user/{}/role", target.id_hex());

    let res = app.call(Method::PATCH, &uri, Some(&customer), Some(json!({ "role": "system_admin" }))).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.body["error"], "You do not have permission to perform this action");

    let res = app.call(Method::PATCH, &uri, Some(&admin), Some(json!({ "role": "wizard" }))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app.call(Method::PATCH, &uri, Some(&admin), Some(json!({ "role": "delivery_personnel" }))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["role"], "delivery_personnel");
    assert_eq!(app.users.get(&target.id.unwrap()).unwrap().role, UserRole::DeliveryPersonnel);
}

#[tokio::test]
async fn test_unknown_user_lookups() {
    let app = TestApp::new();
    let res = app.call(Method::GET, "/api/user/000000000000000000000000", None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    let res = app.call(Method::GET, "/api/user/garbage", None, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}
