//! API integration tests
//!
//! Run against a live server (default config) with:
//! cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use std::time::{SystemTime, UNIX_EPOCH};

use steward_server::models::claims::{OrgClaims, OrgRole};

const BASE_URL: &str = "http://localhost:8080/api/v1";
const JWT_SECRET: &str = "change-this-secret-in-production";

/// Fresh org id per test so tenants do not interfere
fn unique_org() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("org_test_{}", nanos)
}

fn token(org_id: &str, sub: &str, role: OrgRole) -> String {
    let now = chrono::Utc::now().timestamp();
    OrgClaims {
        sub: sub.to_string(),
        org_id: org_id.to_string(),
        org_role: role,
        exp: now + 3600,
        iat: now,
    }
    .create_token(JWT_SECRET)
    .expect("Failed to create token")
}

async fn create_asset(client: &Client, admin: &str, name: &str, value: f64) -> Value {
    let response = client
        .post(format!("{}/assets", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({
            "name": name,
            "description": "integration test asset",
            "estimated_value": value
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse response")
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
async fn test_unauthorized_access() {
    let client = Client::new();

    let response = client
        .get(format!("{}/assets", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_member_cannot_create_asset() {
    let client = Client::new();
    let org = unique_org();
    let member = token(&org, "user_member", OrgRole::Member);

    let response = client
        .post(format!("{}/assets", BASE_URL))
        .header("Authorization", format!("Bearer {}", member))
        .json(&json!({ "name": "Forbidden Asset" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore]
async fn test_create_asset_generates_qr_code() {
    let client = Client::new();
    let org = unique_org();
    let admin = token(&org, "user_admin", OrgRole::Admin);

    let asset = create_asset(&client, &admin, "Canon R5", 3500.0).await;
    assert_eq!(asset["status"], "Available");
    assert!(asset["qr_code"].as_str().unwrap().starts_with("QR-"));
}

#[tokio::test]
#[ignore]
async fn test_create_asset_validation() {
    let client = Client::new();
    let org = unique_org();
    let admin = token(&org, "user_admin", OrgRole::Admin);

    let response = client
        .post(format!("{}/assets", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "name": "" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["detail"].is_string());
}

/// The full lifecycle scenario: checkout, critical incident, check-in.
/// The incident-driven Maintenance status survives the check-in.
#[tokio::test]
#[ignore]
async fn test_checkout_incident_checkin_scenario() {
    let client = Client::new();
    let org = unique_org();
    let admin = token(&org, "user_admin", OrgRole::Admin);

    let asset = create_asset(&client, &admin, "Canon R5", 3500.0).await;
    let asset_id = asset["id"].as_i64().expect("No asset ID");

    // Checkout -> asset becomes Checked Out
    let response = client
        .post(format!("{}/assignments/checkout", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({
            "asset_id": asset_id,
            "assigned_to": "user_42",
            "expected_return_at": "2030-01-10T00:00:00Z"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let assignment: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(assignment["status"], "Active");

    let asset: Value = client
        .get(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(asset["status"], "Checked Out");

    // Critical incident -> Maintenance, assignment stays active
    let response = client
        .post(format!("{}/incidents", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({
            "asset_id": asset_id,
            "title": "Lens cracked",
            "description": "Front element shattered during transport",
            "severity": "Critical"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let asset: Value = client
        .get(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(asset["status"], "Maintenance");

    let active: Value = client
        .get(format!("{}/assignments/active", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(active.as_array().unwrap().len(), 1);

    // Check-in -> assignment returned, Maintenance preserved
    let response = client
        .post(format!("{}/assignments/checkin/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let returned: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(returned["status"], "Returned");
    assert!(returned["actual_return_at"].is_string());

    let asset: Value = client
        .get(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(asset["status"], "Maintenance");
}

#[tokio::test]
#[ignore]
async fn test_checkout_round_trip_restores_available() {
    let client = Client::new();
    let org = unique_org();
    let admin = token(&org, "user_admin", OrgRole::Admin);

    let asset = create_asset(&client, &admin, "Zoom H6", 350.0).await;
    let asset_id = asset["id"].as_i64().expect("No asset ID");

    let response = client
        .post(format!("{}/assignments/checkout", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "asset_id": asset_id, "assigned_to": "user_42" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/assignments/checkin/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let asset: Value = client
        .get(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(asset["status"], "Available");
}

#[tokio::test]
#[ignore]
async fn test_double_checkout_conflicts() {
    let client = Client::new();
    let org = unique_org();
    let admin = token(&org, "user_admin", OrgRole::Admin);

    let asset = create_asset(&client, &admin, "Aputure 600d", 900.0).await;
    let asset_id = asset["id"].as_i64().expect("No asset ID");

    let checkout = json!({ "asset_id": asset_id, "assigned_to": "user_42" });

    let response = client
        .post(format!("{}/assignments/checkout", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&checkout)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/assignments/checkout", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&checkout)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_checkin_without_active_assignment() {
    let client = Client::new();
    let org = unique_org();
    let admin = token(&org, "user_admin", OrgRole::Admin);

    let asset = create_asset(&client, &admin, "Manfrotto Tripod", 200.0).await;
    let asset_id = asset["id"].as_i64().expect("No asset ID");

    let response = client
        .post(format!("{}/assignments/checkin/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_low_severity_incident_keeps_status() {
    let client = Client::new();
    let org = unique_org();
    let admin = token(&org, "user_admin", OrgRole::Admin);

    let asset = create_asset(&client, &admin, "HDMI Cable 50ft", 50.0).await;
    let asset_id = asset["id"].as_i64().expect("No asset ID");

    let response = client
        .post(format!("{}/incidents", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({
            "asset_id": asset_id,
            "title": "Scuffed connector",
            "description": "Cosmetic wear on the plug housing",
            "severity": "Low"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let asset: Value = client
        .get(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    assert_eq!(asset["status"], "Available");
}

#[tokio::test]
#[ignore]
async fn test_delete_checked_out_asset_conflicts() {
    let client = Client::new();
    let org = unique_org();
    let admin = token(&org, "user_admin", OrgRole::Admin);

    let asset = create_asset(&client, &admin, "MacBook Pro 16", 2400.0).await;
    let asset_id = asset["id"].as_i64().expect("No asset ID");

    let response = client
        .post(format!("{}/assignments/checkout", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "asset_id": asset_id, "assigned_to": "user_42" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .delete(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_activity_log_records_each_mutation() {
    let client = Client::new();
    let org = unique_org();
    let admin = token(&org, "user_admin", OrgRole::Admin);

    let asset = create_asset(&client, &admin, "Sony A7S III", 3200.0).await;
    let asset_id = asset["id"].as_i64().expect("No asset ID");

    let response = client
        .post(format!("{}/assignments/checkout", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "asset_id": asset_id, "assigned_to": "user_42" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/assignments/checkin/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let entries: Value = client
        .get(format!("{}/activity", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let entries = entries.as_array().expect("Expected an array");
    let event_types: Vec<&str> = entries
        .iter()
        .map(|e| e["event_type"].as_str().unwrap())
        .collect();

    // Newest first: checked_in, checked_out, created
    assert_eq!(event_types, vec!["checked_in", "checked_out", "created"]);
    assert!(entries[0]["details"]["returned_at"].is_string());
    assert_eq!(entries[1]["details"]["assigned_to"], "user_42");
}

#[tokio::test]
#[ignore]
async fn test_failed_checkout_leaves_no_activity_entry() {
    let client = Client::new();
    let org = unique_org();
    let admin = token(&org, "user_admin", OrgRole::Admin);

    let asset = create_asset(&client, &admin, "iPad Pro", 900.0).await;
    let asset_id = asset["id"].as_i64().expect("No asset ID");

    // Retire the asset, then try to check it out
    let response = client
        .put(format!("{}/assets/{}", BASE_URL, asset_id))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "status": "Retired" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let response = client
        .post(format!("{}/assignments/checkout", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .json(&json!({ "asset_id": asset_id, "assigned_to": "user_42" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let entries: Value = client
        .get(format!("{}/activity", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    let checked_out = entries
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["event_type"] == "checked_out")
        .count();
    assert_eq!(checked_out, 0);
}

#[tokio::test]
#[ignore]
async fn test_dashboard_summary_shape() {
    let client = Client::new();
    let org = unique_org();
    let admin = token(&org, "user_admin", OrgRole::Admin);

    create_asset(&client, &admin, "Godox SL60W", 150.0).await;

    let body: Value = client
        .get(format!("{}/dashboard/summary", BASE_URL))
        .header("Authorization", format!("Bearer {}", admin))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");

    assert_eq!(body["counts"]["totalAssets"], 1);
    assert_eq!(body["counts"]["checkedOut"], 0);
    assert_eq!(body["healthBreakdown"]["good"], 1);
    assert!(body["overdueTrend"].is_array());
    assert!(body["insights"].is_array());
}
