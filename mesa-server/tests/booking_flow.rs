//! 端到端预订流程 — 经由 HTTP 路由与内存数据库
//!
//! 覆盖：门店/桌台/班次建档 → 可用性试算 → 创建预订 (201) →
//! 幂等重放 (200) → 满座拒绝 (409 NO_AVAILABILITY) → 取消释放时段。

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Days, Utc};
use chrono_tz::Tz;
use serde_json::{Value, json};
use tower::ServiceExt;

use mesa_server::core::{Config, ServerState, build_app};
use mesa_server::db::DbService;

const TZ_NAME: &str = "Europe/Madrid";

async fn test_app() -> Router {
    let config = Config::with_overrides("/tmp/mesa-test", 0);
    let db = DbService::new_in_memory().await.unwrap();
    build_app(ServerState::with_db(config, db))
}

/// 30 天后的本地 `hour:minute` → Unix millis
fn future_time(hour: u32, minute: u32) -> i64 {
    let tz: Tz = TZ_NAME.parse().unwrap();
    let date = Utc::now()
        .date_naive()
        .checked_add_days(Days::new(30))
        .unwrap();
    date.and_hms_opt(hour, minute, 0)
        .unwrap()
        .and_local_timezone(tz)
        .latest()
        .unwrap()
        .timestamp_millis()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(json_body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// 建档：1 门店 + 全天班次 + 指定容量的桌台，返回 location id
async fn seed_via_api(app: &Router, capacities: &[i32]) -> String {
    let (status, location) = send(
        app,
        "POST",
        "/api/locations",
        Some(json!({
            "name": "Casa Mesa",
            "timezone": TZ_NAME,
            "policy": {
                "allow_same_day": true,
                "cancellation_hours": 2,
                "max_party_size": 12,
                "default_duration_minutes": 90,
                "deposit": null
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let location_id = location["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app,
        "POST",
        "/api/shifts",
        Some(json!({
            "location": location_id,
            "name": "All Day",
            "days": [0, 1, 2, 3, 4, 5, 6],
            "start_minutes": 0,
            "end_minutes": 1440,
            "max_parallel": null
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    for (i, max) in capacities.iter().enumerate() {
        let (status, _) = send(
            app,
            "POST",
            "/api/tables",
            Some(json!({
                "name": format!("T{}", i + 1),
                "location": location_id,
                "min_capacity": 1,
                "max_capacity": max,
                "combinable": false,
                "combination_group": null
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    location_id
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/health/detailed", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["checks"]["database"]["status"], "ok");
}

#[tokio::test]
async fn booking_lifecycle_over_http() {
    let app = test_app().await;
    let location_id = seed_via_api(&app, &[4]).await;
    let start_time = future_time(20, 0);

    // 可用性试算
    let (status, probe) = send(
        &app,
        "GET",
        &format!(
            "/api/locations/{location_id}/availability?start_time={start_time}&party_size=2"
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(probe["available"], true);

    // 创建预订 → 201
    let create_body = json!({
        "location_id": location_id,
        "start_time": start_time,
        "party_size": 2,
        "idempotency_key": "http-key-1",
        "guest_name": "Ada"
    });
    let (status, created) = send(&app, "POST", "/api/bookings", Some(create_body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "CONFIRMED");
    let booking_id = created["booking_id"].as_str().unwrap().to_string();

    // 幂等重放 → 200，同一预订
    let (status, replayed) = send(&app, "POST", "/api/bookings", Some(create_body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replayed["booking_id"].as_str().unwrap(), booking_id);

    // 唯一的桌台已被占 → 409 NO_AVAILABILITY
    let (status, rejected) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(json!({
            "location_id": location_id,
            "start_time": future_time(20, 30),
            "party_size": 2,
            "idempotency_key": "http-key-2"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(rejected["code"], "NO_AVAILABILITY");

    // 取消后时段释放
    let (status, cancelled) = send(
        &app,
        "POST",
        &format!("/api/bookings/{booking_id}/cancel"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "CANCELLED");

    let (status, rebooked) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(json!({
            "location_id": location_id,
            "start_time": start_time,
            "party_size": 2,
            "idempotency_key": "http-key-3"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(rebooked["status"], "CONFIRMED");
}

#[tokio::test]
async fn booking_for_unknown_location_is_404() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/bookings",
        Some(json!({
            "location_id": "location:missing",
            "start_time": future_time(20, 0),
            "party_size": 2,
            "idempotency_key": "http-404"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "LOCATION_NOT_FOUND");
}

#[tokio::test]
async fn list_bookings_by_local_date() {
    let app = test_app().await;
    let location_id = seed_via_api(&app, &[4, 4]).await;
    let start_time = future_time(20, 0);

    for key in ["list-1", "list-2"] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/bookings",
            Some(json!({
                "location_id": location_id,
                "start_time": start_time,
                "party_size": 2,
                "idempotency_key": key
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let date = Utc::now()
        .date_naive()
        .checked_add_days(Days::new(30))
        .unwrap()
        .format("%Y-%m-%d")
        .to_string();
    let (status, listed) = send(
        &app,
        "GET",
        &format!("/api/bookings?location_id={location_id}&date={date}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 2);
}
