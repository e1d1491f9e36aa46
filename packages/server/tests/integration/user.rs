use sea_orm::EntityTrait;
use serde_json::json;

use server::entity::user;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn create_user_hashes_the_password_and_hides_it() {
    let app = TestApp::spawn().await;

    let res = app
        .post_json(
            routes::USERS,
            &json!({
                "name": "Marti",
                "email": "marti@example.com",
                "password": "correct horse battery",
            }),
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["email"], "marti@example.com");
    assert_eq!(res.body["role"], "customer");
    assert!(
        res.body.get("password").is_none(),
        "password must not appear in responses"
    );

    let row = user::Entity::find_by_id(res.id())
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert!(
        row.password.starts_with("$argon2"),
        "stored password is not an argon2 hash: {}",
        row.password
    );
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = TestApp::spawn().await;

    let body = json!({
        "name": "Marti",
        "email": "marti@example.com",
        "password": "correct horse battery",
    });
    let first = app.post_json(routes::USERS, &body).await;
    assert_eq!(first.status, 201, "{}", first.text);

    let second = app.post_json(routes::USERS, &body).await;
    assert_eq!(second.status, 400, "{}", second.text);
    assert_eq!(second.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn update_user_replaces_fields() {
    let app = TestApp::spawn().await;

    let created = app
        .post_json(
            routes::USERS,
            &json!({
                "name": "Marti",
                "email": "marti@example.com",
                "password": "correct horse battery",
            }),
        )
        .await;
    assert_eq!(created.status, 201, "{}", created.text);
    let id = created.id();

    let updated = app
        .put_json(
            &routes::user(id),
            &json!({
                "name": "Marti Admin",
                "email": "admin@example.com",
                "password": "another fine password",
                "role": "admin",
            }),
        )
        .await;

    assert_eq!(updated.status, 200, "{}", updated.text);
    assert_eq!(updated.body["name"], "Marti Admin");
    assert_eq!(updated.body["email"], "admin@example.com");
    assert_eq!(updated.body["role"], "admin");

    let fetched = app.get(&routes::user(id)).await;
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.body["email"], "admin@example.com");
}

#[tokio::test]
async fn short_password_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .post_json(
            routes::USERS,
            &json!({
                "name": "Marti",
                "email": "marti@example.com",
                "password": "short",
            }),
        )
        .await;

    assert_eq!(res.status, 400, "{}", res.text);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn missing_user_is_404() {
    let app = TestApp::spawn().await;
    let res = app.get(&routes::user(777)).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
}
