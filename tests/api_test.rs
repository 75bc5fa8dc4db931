//! API contract tests: auth, user management, item/store CRUD.

mod common;

use common::{detail, spawn_app, ADMIN_PASSWORD, ADMIN_USERNAME};

#[tokio::test]
async fn test_root_serves_banner() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().await.unwrap(), "pos");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = spawn_app().await;

    // Unknown user and wrong password get the same answer.
    for (username, password) in [("nobody", "whatever"), (ADMIN_USERNAME, "wrong")] {
        let response = app.login(username, password).await;
        assert_eq!(response.status().as_u16(), 401);
        assert_eq!(
            response
                .headers()
                .get("www-authenticate")
                .and_then(|v| v.to_str().ok()),
            Some("Bearer")
        );
        assert_eq!(detail(response).await, "Incorrect username or password");
    }
}

#[tokio::test]
async fn test_login_and_me_roundtrip() {
    let app = spawn_app().await;

    let response = app.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["token_type"], "bearer");
    assert!(body["expiry"].is_string());

    let token = body["access_token"].as_str().unwrap();
    let me: serde_json::Value = app
        .client
        .get(app.url("/users/me"))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["username"], ADMIN_USERNAME);
    assert_eq!(me["is_superuser"], true);
}

#[tokio::test]
async fn test_requests_without_token_rejected() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/item")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(detail(response).await, "Could not validate credentials");

    let response = app
        .client
        .get(app.url("/item"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn test_user_management_requires_superuser() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let response = app.create_user(&admin, "bob", "bobs-password", false).await;
    assert_eq!(response.status().as_u16(), 200);
    let bob_token = app.token("bob", "bobs-password").await;

    // Ordinary users can see themselves but not manage accounts.
    let response = app.create_user(&bob_token, "eve", "eves-password", false).await;
    assert_eq!(response.status().as_u16(), 401);
    assert_eq!(
        detail(response).await,
        "You are unauthorised to create a new user."
    );

    let response = app
        .client
        .get(app.url("/users"))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    // The superuser sees the full listing.
    let listing: serde_json::Value = app
        .client
        .get(app.url("/users"))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let response = app.create_user(&admin, "bob", "first", false).await;
    assert_eq!(response.status().as_u16(), 200);

    let response = app.create_user(&admin, "bob", "second", false).await;
    assert_eq!(response.status().as_u16(), 409);
    assert!(detail(response).await.contains("bob"));
}

#[tokio::test]
async fn test_disabled_account_rejected() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    app.create_user(&admin, "bob", "bobs-password", false).await;
    let bob_token = app.token("bob", "bobs-password").await;

    sqlx::query("UPDATE user SET disabled = 1 WHERE username = 'bob'")
        .execute(&app.db)
        .await
        .unwrap();

    let response = app
        .client
        .get(app.url("/users/me"))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(detail(response).await, "Inactive user");
}

#[tokio::test]
async fn test_item_crud_contract() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    // Create.
    let response = app
        .client
        .post(app.url("/item"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "name": "Blue Slush 10ml" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let item: serde_json::Value = response.json().await.unwrap();
    let id = item["id"].as_i64().unwrap();
    assert_eq!(item["name"], "Blue Slush 10ml");
    assert!(item["category"].is_null());

    // Read.
    let fetched: serde_json::Value = app
        .client
        .get(app.url(&format!("/item/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["id"], id);

    // Update via query parameters.
    let updated: serde_json::Value = app
        .client
        .put(app.url(&format!("/item/{id}")))
        .query(&[("name", "Blue Slush 50ml"), ("category", "liquids/fruity")])
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["name"], "Blue Slush 50ml");
    assert_eq!(updated["category"], "liquids/fruity");

    // Renaming again without a category keeps the stored one.
    let renamed: serde_json::Value = app
        .client
        .put(app.url(&format!("/item/{id}")))
        .query(&[("name", "Blue Slush 100ml")])
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(renamed["category"], "liquids/fruity");

    // List.
    let listing: serde_json::Value = app
        .client
        .get(app.url("/item"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listing.as_array().unwrap().len(), 1);

    // Delete, then the 404 contract.
    let response = app
        .client
        .delete(app.url(&format!("/item/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = app
        .client
        .get(app.url(&format!("/item/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(detail(response).await, format!("item with id {id} not found"));
}

#[tokio::test]
async fn test_store_crud_contract() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let id = app.create_store(&token, "High Street").await;

    let updated: serde_json::Value = app
        .client
        .put(app.url(&format!("/store/{id}")))
        .query(&[("name", "Market Square")])
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["name"], "Market Square");

    let response = app
        .client
        .delete(app.url(&format!("/store/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = app
        .client
        .get(app.url(&format!("/store/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(detail(response).await, format!("store with id {id} not found"));
}

#[tokio::test]
async fn test_item_tree_groups_by_category() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let fruity = app
        .create_item(&token, "Blue Slush", Some("liquids/fruity"))
        .await;
    let menthol = app
        .create_item(&token, "Arctic Mint", Some("liquids/menthol"))
        .await;
    let loose = app.create_item(&token, "Gift Card", None).await;

    let tree: serde_json::Value = app
        .client
        .get(app.url("/item/tree"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(tree["name"], "stock");
    assert_eq!(tree["ids"], serde_json::json!([loose]));

    let liquids = &tree["children"][0];
    assert_eq!(liquids["name"], "liquids");
    assert_eq!(liquids["ids"], serde_json::json!([fruity, menthol]));
    assert_eq!(liquids["children"][0]["name"], "fruity");
    assert_eq!(liquids["children"][0]["ids"], serde_json::json!([fruity]));
    assert_eq!(liquids["children"][1]["name"], "menthol");
}
