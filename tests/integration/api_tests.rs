//! API integration tests
//!
//! These need a running server with a fresh store and the default admin
//! credentials. Run with: cargo test -- --ignored

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:5000/api/v1";

async fn login(client: &Client, email: &str, password: &str) -> reqwest::Response {
    client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("Failed to send login request")
}

/// Token for the administrative principal
async fn admin_token(client: &Client) -> String {
    let body: Value = login(client, "admin@gmail.com", "Admin@123")
        .await
        .json()
        .await
        .expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Register a throwaway user, returning (id, token)
async fn signup(client: &Client) -> (String, String) {
    let email = format!("user-{}@example.com", Uuid::new_v4().simple());
    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({
            "name": "Test User",
            "email": email,
            "password": "secret123",
            "role": "admin"
        }))
        .send()
        .await
        .expect("Failed to send signup request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse signup response");
    assert_eq!(body["role"], "user");
    (
        body["id"].as_str().expect("No id").to_string(),
        body["token"].as_str().expect("No token").to_string(),
    )
}

fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_admin_login() {
    let client = Client::new();
    let response = login(&client, "ADMIN@gmail.com", "Admin@123").await;
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();
    let response = login(&client, "admin@gmail.com", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["error"], "Unauthenticated");
}

#[tokio::test]
#[ignore]
async fn test_signup_with_reserved_email_is_forbidden() {
    let client = Client::new();
    let response = client
        .post(format!("{}/auth/signup", BASE_URL))
        .json(&json!({ "name": "Mallory", "email": "Admin@Gmail.com", "password": "x" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore]
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/requests", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .get(format!("{}/equipment", BASE_URL))
        .bearer_auth("garbage")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore]
async fn test_admin_routes_reject_plain_users() {
    let client = Client::new();
    let (_, token) = signup(&client).await;

    for path in ["admin/users", "admin/dashboard-stats", "admin/reports"] {
        let response = client
            .get(format!("{}/{}", BASE_URL, path))
            .bearer_auth(&token)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{path}");
    }
}

#[tokio::test]
#[ignore]
async fn test_request_lifecycle() {
    let client = Client::new();
    let admin = admin_token(&client).await;
    let (user_id, user_token) = signup(&client).await;
    let team_name = unique("HVAC");
    let serial = unique("SN");

    // Promote and enrol the user
    let response = client
        .put(format!("{}/admin/users/{}/role", BASE_URL, user_id))
        .bearer_auth(&admin)
        .json(&json!({ "role": "technician" }))
        .send()
        .await
        .expect("Failed to update role");
    assert!(response.status().is_success());

    let response = client
        .post(format!("{}/teams", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({ "teamName": team_name, "technicians": [user_id] }))
        .send()
        .await
        .expect("Failed to create team");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({
            "name": "Rooftop unit",
            "serialNumber": serial,
            "department": "Facilities",
            "maintenanceTeam": team_name,
            "location": "Roof",
            "purchaseDate": "2023-01-10",
            "warrantyDate": "2026-01-10"
        }))
        .send()
        .await
        .expect("Failed to create equipment");
    assert_eq!(response.status(), StatusCode::CREATED);
    let equipment: Value = response.json().await.expect("Failed to parse equipment");
    let equipment_id = equipment["id"].as_str().expect("No equipment id").to_string();

    // Same serial again
    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .bearer_auth(&admin)
        .json(&json!({
            "name": "Copy",
            "serialNumber": serial,
            "department": "Facilities",
            "maintenanceTeam": team_name,
            "location": "Roof",
            "purchaseDate": "2023-01-10",
            "warrantyDate": "2026-01-10"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let yesterday = (chrono::Utc::now() - chrono::Duration::days(1)).to_rfc3339();
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .bearer_auth(&user_token)
        .json(&json!({
            "subject": "Fan bearing noise",
            "equipment": equipment_id,
            "requestType": "corrective",
            "scheduledDate": yesterday,
            "duration": 2
        }))
        .send()
        .await
        .expect("Failed to create request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let request: Value = response.json().await.expect("Failed to parse request");
    let request_id = request["id"].as_str().expect("No request id").to_string();
    assert_eq!(request["status"], "new");

    let listed: Value = client
        .get(format!("{}/requests", BASE_URL))
        .bearer_auth(&user_token)
        .send()
        .await
        .expect("Failed to list requests")
        .json()
        .await
        .expect("Failed to parse list");
    let mine = listed
        .as_array()
        .expect("Expected an array")
        .iter()
        .find(|r| r["id"] == request_id.as_str())
        .expect("Request missing from list");
    assert_eq!(mine["isOverdue"], true);
    assert_eq!(mine["maintenanceTeam"]["teamName"], team_name.as_str());

    let response = client
        .put(format!("{}/requests/{}", BASE_URL, request_id))
        .bearer_auth(&user_token)
        .json(&json!({ "status": "scrap" }))
        .send()
        .await
        .expect("Failed to update request");
    assert!(response.status().is_success());

    let equipment: Value = client
        .get(format!("{}/equipment", BASE_URL))
        .bearer_auth(&user_token)
        .send()
        .await
        .expect("Failed to list equipment")
        .json()
        .await
        .expect("Failed to parse equipment");
    let scrapped = equipment
        .as_array()
        .expect("Expected an array")
        .iter()
        .find(|e| e["id"] == equipment_id.as_str())
        .expect("Equipment missing");
    assert_eq!(scrapped["isScrapped"], true);

    // Only admins delete
    let response = client
        .delete(format!("{}/requests/{}", BASE_URL, request_id))
        .bearer_auth(&user_token)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = client
        .delete(format!("{}/requests/{}", BASE_URL, request_id))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to delete request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_dashboard_stats_shape() {
    let client = Client::new();
    let admin = admin_token(&client).await;

    let body: Value = client
        .get(format!("{}/admin/dashboard-stats", BASE_URL))
        .bearer_auth(&admin)
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert!(body["totalRequests"].is_i64());
    assert!(body["openRequests"].is_i64());
    assert!(body["overdueRequests"].is_i64());
    assert_eq!(body["lowStockParts"], 0);
}
