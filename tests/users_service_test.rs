// ============================================================================
// Users Service Integration Tests
// ============================================================================

use serde_json::{json, Value};

use test_utils::{login, spawn_users_service, token_service, ADMIN_EMAIL, ADMIN_PASSWORD};

#[tokio::test]
async fn test_login_issues_verifiable_token() {
    let users = spawn_users_service().await;
    let client = reqwest::Client::new();

    let token = login(&client, &users, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    // Any holder of the shared secret can verify it
    let identity = token_service().verify(&token).unwrap();
    assert_eq!(identity.id, 1);
    assert_eq!(identity.email, ADMIN_EMAIL);
    assert_eq!(identity.role.to_string(), "admin");
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let users = spawn_users_service().await;
    let client = reqwest::Client::new();

    let attempts = [
        json!({ "email": ADMIN_EMAIL, "password": "wrong" }),
        json!({ "email": "noexiste@test.cl", "password": ADMIN_PASSWORD }),
        json!({ "email": ADMIN_EMAIL }),
        json!({}),
    ];

    let mut bodies = Vec::new();
    for attempt in attempts {
        let response = client
            .post(format!("{}/login", users))
            .json(&attempt)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401);
        bodies.push(response.json::<Value>().await.unwrap());
    }

    assert_eq!(bodies[0]["error"], "Invalid credentials");
    assert!(bodies.iter().all(|body| body == &bodies[0]));
}

#[tokio::test]
async fn test_login_with_unparseable_body() {
    let users = spawn_users_service().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/login", users))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_me_requires_token() {
    let users = spawn_users_service().await;
    let client = reqwest::Client::new();

    let response = client.get(format!("{}/me", users)).send().await.unwrap();
    assert_eq!(response.status(), 401);

    let token = login(&client, &users, "alumno@test.cl", "alumno123").await;
    let identity: Value = client
        .get(format!("{}/me", users))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(identity["id"], 2);
    assert_eq!(identity["role"], "user");
}

#[tokio::test]
async fn test_health() {
    let users = spawn_users_service().await;

    let body: Value = reqwest::get(format!("{}/health", users))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "users-service OK");
}
