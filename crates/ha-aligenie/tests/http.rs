//! Home skill endpoint over HTTP

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{control, discovery, query, TestHomeAssistant};
use ha_aligenie::http::{router, HOME_SKILL_HTTP_ENDPOINT};
use ha_aligenie::{EntityFilterConfig, HomeSkill, HomeSkillConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn setup() -> (TestHomeAssistant, Router) {
    let test = TestHomeAssistant::new();
    test.set_state(
        "light.test",
        "on",
        json!({"supported_features": 1, "brightness": 77}),
    );
    test.set_state("climate.cool", "cool", json!({"supported_features": 91}));
    test.set_state("fan.fan1", "on", json!({"supported_features": 1}));

    let config = HomeSkillConfig {
        filter: EntityFilterConfig {
            exclude_entities: vec!["fan.fan1".to_string()],
            ..Default::default()
        },
        ..Default::default()
    };
    let skill = HomeSkill::new(config).unwrap();
    let app = router(Arc::new(test.hass.clone()), Arc::new(skill));
    (test, app)
}

async fn post(app: &Router, body: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri(HOME_SKILL_HTTP_ENDPOINT)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_discovery_respects_filter() {
    let (_test, app) = setup();

    let (status, json) = post(&app, discovery()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["header"]["name"], "DiscoveryDevicesResponse");
    assert_eq!(json["header"]["payloadVersion"], 1);

    let ids: Vec<&str> = json["payload"]["devices"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["deviceId"].as_str())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&"light.test"));
    assert!(ids.contains(&"climate.cool"));
}

#[tokio::test]
async fn test_control_calls_service() {
    let (test, app) = setup();

    let message = control("TurnOn", "light.test", None);
    let message_id = message["header"]["messageId"].clone();
    let (status, json) = post(&app, message).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["header"]["name"], "TurnOnResponse");
    assert_eq!(json["header"]["messageId"], message_id);
    assert_eq!(json["payload"]["deviceId"], "light.test");

    let calls = test.service_calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].service_id(), "light.turn_on");
}

#[tokio::test]
async fn test_query_returns_properties() {
    let (_test, app) = setup();

    let (status, json) = post(&app, query("Query", "light.test")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["header"]["name"], "QueryResponse");
    assert_eq!(
        json["properties"],
        json!([
            {"name": "powerstate", "value": "on"},
            {"name": "brightness", "value": "30"}
        ])
    );
}

#[tokio::test]
async fn test_malformed_request() {
    let (_test, app) = setup();

    let mut message = discovery();
    message["header"]["payloadVersion"] = json!(2);
    let (status, json) = post(&app, message).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_body_without_json_content_type() {
    let (_test, app) = setup();

    let request = Request::builder()
        .method("POST")
        .uri(HOME_SKILL_HTTP_ENDPOINT)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(discovery().to_string()))
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["header"]["name"], "DiscoveryDevicesResponse");

    let request = Request::builder()
        .method("POST")
        .uri(HOME_SKILL_HTTP_ENDPOINT)
        .body(Body::from("not json"))
        .unwrap();
    let (status, json) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().starts_with("invalid JSON body"));
}
