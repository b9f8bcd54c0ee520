//! Integration tests for the allocation engine HTTP API.
//!
//! This test suite covers:
//! - Laundry-weighted and equal shared-usage splits
//! - Monetary settlement and rounding reconciliation
//! - The configured room registry and per-request overrides
//! - Legacy field names and raw laundry records
//! - Error cases
//! - Response shape and determinism

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use allocation_engine::api::{AppState, create_router};
use allocation_engine::config::ConfigLoader;

// =============================================================================
// Test Helpers
// =============================================================================

fn create_test_state() -> AppState {
    let config = ConfigLoader::load("./config/default").expect("Failed to load config");
    AppState::new(config)
}

fn create_router_for_test() -> Router {
    create_router(create_test_state())
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

async fn post_calculate(router: Router, body: Value) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri("/api/electric/calculate")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

fn reading(room_id: u64, start: i64, end: i64) -> Value {
    json!({ "roomId": room_id, "startElectric": start, "endElectric": end })
}

fn laundry(room_id: u64, count: u32) -> Value {
    json!({ "roomId": room_id, "count": count })
}

/// A request with an empty room override, so only the given readings count.
fn create_request(
    total_money: i64,
    total_electricity: i64,
    readings: Vec<Value>,
    laundry_counts: Vec<Value>,
) -> Value {
    json!({
        "month": "2025-10",
        "totalMoney": total_money,
        "totalElectricity": total_electricity,
        "readings": readings,
        "laundryCounts": laundry_counts,
        "rooms": []
    })
}

fn room<'a>(result: &'a Value, room_id: u64) -> &'a Value {
    result["rooms"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["roomId"] == room_id)
        .unwrap_or_else(|| panic!("room {} not in result", room_id))
}

fn sum_of(result: &Value, field: &str) -> i64 {
    result["rooms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r[field].as_i64().unwrap())
        .sum()
}

fn assert_error_code(status: StatusCode, body: &Value, expected: &str) {
    assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
    assert_eq!(body["code"], expected, "body: {}", body);
}

fn warning_codes(result: &Value) -> Vec<String> {
    result["auditTrace"]["warnings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["code"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// SECTION 1: Shared Usage Apportionment
// =============================================================================

#[tokio::test]
async fn test_shared_usage_weighted_by_laundry_cycles() {
    let request = create_request(
        350_000,
        100,
        vec![reading(1, 100, 150), reading(2, 200, 230)],
        vec![laundry(1, 3), laundry(2, 1)],
    );

    let (status, result) = post_calculate(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(room(&result, 1)["directUsage"], 50);
    assert_eq!(room(&result, 1)["sharedUsage"], 15);
    assert_eq!(room(&result, 1)["totalUsage"], 65);
    assert_eq!(room(&result, 2)["directUsage"], 30);
    assert_eq!(room(&result, 2)["sharedUsage"], 5);
    assert_eq!(room(&result, 2)["totalUsage"], 35);
    assert_eq!(result["sharedElectricity"], 20);
    assert_eq!(result["splitBasis"], "laundry_cycles");
}

#[tokio::test]
async fn test_overconsumed_meter_is_rejected() {
    let request = create_request(
        350_000,
        70,
        vec![reading(1, 100, 150), reading(2, 200, 230)],
        vec![laundry(1, 3), laundry(2, 1)],
    );

    let (status, body) = post_calculate(create_router_for_test(), request).await;

    assert_error_code(status, &body, "OVERCONSUMED_METER");
    assert!(body["message"].as_str().unwrap().contains("80"));
}

#[tokio::test]
async fn test_equal_split_without_laundry() {
    let request = create_request(
        1_000_000,
        100,
        vec![reading(1, 0, 40), reading(2, 0, 50)],
        vec![],
    );

    let (status, result) = post_calculate(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(room(&result, 1)["sharedUsage"], 5);
    assert_eq!(room(&result, 2)["sharedUsage"], 5);
    assert_eq!(result["splitBasis"], "equal_split");
}

#[tokio::test]
async fn test_room_without_cycles_pays_no_shared_usage() {
    let request = create_request(
        600_000,
        60,
        vec![reading(1, 0, 10), reading(2, 0, 10), reading(3, 0, 10)],
        vec![laundry(1, 2), laundry(3, 1)],
    );

    let (status, result) = post_calculate(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(room(&result, 1)["sharedUsage"], 20);
    assert_eq!(room(&result, 2)["sharedUsage"], 0);
    assert_eq!(room(&result, 3)["sharedUsage"], 10);
    assert_eq!(sum_of(&result, "totalUsage"), 60);
}

#[tokio::test]
async fn test_no_shared_usage_when_meters_cover_total() {
    let request = create_request(
        500_000,
        80,
        vec![reading(1, 100, 150), reading(2, 200, 230)],
        vec![laundry(1, 3)],
    );

    let (status, result) = post_calculate(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["sharedElectricity"], 0);
    assert_eq!(result["sharedMoney"], 0);
    assert_eq!(sum_of(&result, "sharedUsage"), 0);
}

// =============================================================================
// SECTION 2: Monetary Settlement
// =============================================================================

#[tokio::test]
async fn test_money_follows_total_usage() {
    let request = create_request(
        350_000,
        100,
        vec![reading(1, 100, 150), reading(2, 200, 230)],
        vec![laundry(1, 3), laundry(2, 1)],
    );

    let (status, result) = post_calculate(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["pricePerUnit"], "3500");
    assert_eq!(room(&result, 1)["totalMoney"], 227_500);
    assert_eq!(room(&result, 2)["totalMoney"], 122_500);
    assert_eq!(result["sharedMoney"], 70_000);
}

#[tokio::test]
async fn test_rounding_residual_reconciles_to_bill() {
    let request = create_request(
        1_000,
        30,
        vec![reading(1, 0, 10), reading(2, 0, 10), reading(3, 0, 10)],
        vec![],
    );

    let (status, result) = post_calculate(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(room(&result, 1)["totalMoney"], 334);
    assert_eq!(room(&result, 2)["totalMoney"], 333);
    assert_eq!(room(&result, 3)["totalMoney"], 333);
    assert_eq!(sum_of(&result, "totalMoney"), 1_000);
}

#[tokio::test]
async fn test_residual_goes_to_largest_usage_room() {
    // 1001 / 4 units: 250.25, 250.25, 500.5 -> 250, 250, 500; residual 1 to room 3
    let request = create_request(
        1_001,
        4,
        vec![reading(1, 0, 1), reading(2, 0, 1), reading(3, 0, 2)],
        vec![],
    );

    let (status, result) = post_calculate(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(room(&result, 3)["totalMoney"], 501);
    assert_eq!(sum_of(&result, "totalMoney"), 1_001);
}

#[tokio::test]
async fn test_large_bill_is_conserved() {
    let request = create_request(
        9_876_543_210,
        997,
        vec![
            reading(1, 1_000, 1_123),
            reading(2, 5_000, 5_311),
            reading(3, 42, 97),
            reading(4, 0, 201),
        ],
        vec![laundry(1, 7), laundry(2, 2), laundry(4, 5)],
    );

    let (status, result) = post_calculate(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(sum_of(&result, "totalUsage"), 997);
    assert_eq!(sum_of(&result, "totalMoney"), 9_876_543_210);
    for room in result["rooms"].as_array().unwrap() {
        assert!(room["totalMoney"].as_i64().unwrap() >= 0);
    }
}

// =============================================================================
// SECTION 3: Room Registry
// =============================================================================

#[tokio::test]
async fn test_configured_registry_labels_rooms() {
    let ids = [101, 102, 103, 201, 202, 203];
    let readings: Vec<Value> = ids.iter().map(|id| reading(*id, 500, 510)).collect();
    let request = json!({
        "month": "2025-10",
        "totalMoney": 1_200_000,
        "totalElectricity": 120,
        "readings": readings
    });

    let (status, result) = post_calculate(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["rooms"].as_array().unwrap().len(), 6);
    for id in ids {
        assert_eq!(room(&result, id)["roomName"], format!("Phòng {}", id));
        assert_eq!(room(&result, id)["totalUsage"], 20);
        assert_eq!(room(&result, id)["totalMoney"], 200_000);
    }
}

#[tokio::test]
async fn test_configured_registry_rejects_missing_reading() {
    let request = json!({
        "month": "2025-10",
        "totalMoney": 1_200_000,
        "totalElectricity": 120,
        "readings": [reading(101, 0, 10), reading(102, 0, 10)]
    });

    let (status, body) = post_calculate(create_router_for_test(), request).await;

    assert_error_code(status, &body, "MISSING_READING");
    assert!(body["message"].as_str().unwrap().contains("room 103"));
}

#[tokio::test]
async fn test_unregistered_room_is_allocated_with_warning() {
    let request = json!({
        "month": "2025-10",
        "totalMoney": 300_000,
        "totalElectricity": 30,
        "readings": [reading(1, 0, 10), reading(999, 0, 10)],
        "rooms": [{ "id": 1, "roomName": "Front" }]
    });

    let (status, result) = post_calculate(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(room(&result, 1)["roomName"], "Front");
    assert_eq!(room(&result, 999)["roomName"], "Room 999");
    assert_eq!(warning_codes(&result), vec!["UNREGISTERED_ROOM"]);
}

#[tokio::test]
async fn test_duplicate_room_in_override_is_rejected() {
    let request = json!({
        "month": "2025-10",
        "totalMoney": 300_000,
        "totalElectricity": 30,
        "readings": [reading(1, 0, 10)],
        "rooms": [{ "id": 1, "roomName": "A" }, { "id": 1, "roomName": "B" }]
    });

    let (status, body) = post_calculate(create_router_for_test(), request).await;

    assert_error_code(status, &body, "DUPLICATE_ROOM");
}

#[tokio::test]
async fn test_laundry_for_room_without_reading_is_ignored() {
    let request = create_request(
        100_000,
        100,
        vec![reading(1, 0, 40), reading(2, 0, 40)],
        vec![laundry(1, 1), laundry(2, 1), laundry(7, 10)],
    );

    let (status, result) = post_calculate(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(room(&result, 1)["sharedUsage"], 10);
    assert_eq!(room(&result, 2)["sharedUsage"], 10);
    assert_eq!(warning_codes(&result), vec!["LAUNDRY_WITHOUT_READING"]);
}

#[tokio::test]
async fn test_room_list_endpoint() {
    let (status, rooms) = send(
        create_router_for_test(),
        Request::builder()
            .uri("/api/room/list")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let rooms = rooms.as_array().unwrap();
    assert_eq!(rooms.len(), 6);
    assert_eq!(rooms[0], json!({ "id": 101, "roomName": "Phòng 101" }));
    assert_eq!(rooms[5]["id"], 203);
}

// =============================================================================
// SECTION 4: Input Formats
// =============================================================================

#[tokio::test]
async fn test_legacy_field_names_and_month_format() {
    let request = json!({
        "month": "10-2025",
        "totalMoney": 350_000,
        "totalElectric": 100,
        "electrics": [reading(1, 100, 150), reading(2, 200, 230)],
        "laundryCounts": [laundry(1, 3), laundry(2, 1)],
        "rooms": []
    });

    let (status, result) = post_calculate(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["month"], "2025-10");
    assert_eq!(room(&result, 1)["totalUsage"], 65);
}

#[tokio::test]
async fn test_laundry_records_counted_for_billing_month() {
    let request = json!({
        "month": "10-2025",
        "totalMoney": 100_000,
        "totalElectricity": 100,
        "readings": [reading(1, 0, 50), reading(2, 0, 30)],
        "laundryRecords": [
            { "id": 1, "roomId": 1, "createdAt": "2025-10-01T07:15:00" },
            { "id": 2, "roomId": 1, "createdAt": "2025-10-20T21:00:00" },
            { "id": 3, "roomId": 1, "createdAt": "2025-11-01T09:00:00" },
            { "id": 4, "roomId": 2, "createdAt": "2025-10-31T23:59:59" }
        ],
        "rooms": []
    });

    let (status, result) = post_calculate(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(room(&result, 1)["laundryCycles"], 2);
    assert_eq!(room(&result, 2)["laundryCycles"], 1);
    // 20 shared units at 2:1 -> 13.33 / 6.67 -> 13 / 7
    assert_eq!(room(&result, 1)["sharedUsage"], 13);
    assert_eq!(room(&result, 2)["sharedUsage"], 7);
}

// =============================================================================
// SECTION 5: Error Cases
// =============================================================================

#[tokio::test]
async fn test_end_not_above_start_is_invalid_reading() {
    let request = create_request(1_000, 100, vec![reading(1, 150, 150)], vec![]);

    let (status, body) = post_calculate(create_router_for_test(), request).await;

    assert_error_code(status, &body, "INVALID_READING");
    assert!(body["message"].as_str().unwrap().contains("room 1"));
}

#[tokio::test]
async fn test_negative_start_is_invalid_reading() {
    let request = create_request(1_000, 100, vec![reading(4, -5, 10)], vec![]);

    let (status, body) = post_calculate(create_router_for_test(), request).await;

    assert_error_code(status, &body, "INVALID_READING");
}

#[tokio::test]
async fn test_duplicate_reading() {
    let request = create_request(
        1_000,
        100,
        vec![reading(1, 0, 10), reading(1, 10, 20)],
        vec![],
    );

    let (status, body) = post_calculate(create_router_for_test(), request).await;

    assert_error_code(status, &body, "DUPLICATE_READING");
}

#[tokio::test]
async fn test_zero_electricity_total() {
    let request = create_request(1_000, 0, vec![reading(1, 0, 10)], vec![]);

    let (status, body) = post_calculate(create_router_for_test(), request).await;

    assert_error_code(status, &body, "ZERO_ELECTRICITY_TOTAL");
}

#[tokio::test]
async fn test_non_positive_money_is_invalid_period() {
    let request = create_request(0, 100, vec![reading(1, 0, 10)], vec![]);

    let (status, body) = post_calculate(create_router_for_test(), request).await;

    assert_error_code(status, &body, "INVALID_BILLING_PERIOD");
}

#[tokio::test]
async fn test_no_readings_is_empty_room_set() {
    let request = create_request(1_000, 100, vec![], vec![]);

    let (status, body) = post_calculate(create_router_for_test(), request).await;

    assert_error_code(status, &body, "EMPTY_ROOM_SET");
}

#[tokio::test]
async fn test_invalid_month_is_validation_error() {
    let mut request = create_request(1_000, 100, vec![reading(1, 0, 10)], vec![]);
    request["month"] = json!("2025-13");

    let (status, body) = post_calculate(create_router_for_test(), request).await;

    assert_error_code(status, &body, "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_content_type() {
    let body = create_request(1_000, 100, vec![reading(1, 0, 10)], vec![]);

    let (status, body) = send(
        create_router_for_test(),
        Request::builder()
            .method("POST")
            .uri("/api/electric/calculate")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await;

    assert_error_code(status, &body, "MISSING_CONTENT_TYPE");
}

// =============================================================================
// SECTION 6: Response Shape and Determinism
// =============================================================================

#[tokio::test]
async fn test_result_contains_all_required_fields() {
    let request = create_request(
        350_000,
        100,
        vec![reading(1, 100, 150), reading(2, 200, 230)],
        vec![laundry(1, 3), laundry(2, 1)],
    );

    let (status, result) = post_calculate(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(result["month"].is_string());
    assert!(result["pricePerUnit"].is_string());
    assert!(result["totalMoney"].is_i64());
    assert!(result["totalElectricity"].is_i64());
    assert!(result["sharedElectricity"].is_i64());
    assert!(result["sharedMoney"].is_i64());
    assert_eq!(result["inputFingerprint"].as_str().unwrap().len(), 64);

    let first = &result["rooms"][0];
    for field in [
        "roomId",
        "roomName",
        "laundryCycles",
        "directUsage",
        "sharedUsage",
        "totalUsage",
        "totalMoney",
    ] {
        assert!(!first[field].is_null(), "missing room field {}", field);
    }

    let steps = result["auditTrace"]["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 4);
    assert_eq!(steps[0]["ruleId"], "direct_usage");
    assert_eq!(steps[3]["ruleId"], "conservation_check");
    assert!(result["timestamp"].is_null());
}

#[tokio::test]
async fn test_identical_requests_give_identical_bodies() {
    let request = create_request(
        987_654,
        313,
        vec![reading(3, 10, 87), reading(1, 0, 99), reading(2, 5, 61)],
        vec![laundry(2, 4), laundry(3, 1), laundry(1, 2)],
    );

    let first = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/electric/calculate")
                .header("Content-Type", "application/json")
                .body(Body::from(request.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let second = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/electric/calculate")
                .header("Content-Type", "application/json")
                .body(Body::from(request.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let first = axum::body::to_bytes(first.into_body(), usize::MAX)
        .await
        .unwrap();
    let second = axum::body::to_bytes(second.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_rooms_listed_in_id_order() {
    let request = create_request(
        1_000,
        30,
        vec![reading(3, 0, 10), reading(1, 0, 10), reading(2, 0, 10)],
        vec![],
    );

    let (status, result) = post_calculate(create_router_for_test(), request).await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = result["rooms"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["roomId"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = send(
        create_router_for_test(),
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}
