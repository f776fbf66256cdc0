//! Unary RPC endpoints driven through the router.

mod common;

use axum::http::StatusCode;
use common::{body_json, build_test_app, call, get, test_state};
use futures_util::StreamExt;
use serde_json::json;
use smart_home_server::devices::provisioning::ServerInstance;
use smart_home_server::handlers;
use smart_home_server::models::MonitorRequest;
use tokio_util::sync::CancellationToken;

// ---------------------------------------------------------------------------
// ListDevices
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_devices_returns_every_device_in_order() {
    let app = build_test_app(ServerInstance::First);
    let (status, body) = call(app, "/rpc/list_devices", json!({ "user_id": "user1" })).await;

    assert_eq!(status, StatusCode::OK);
    let devices = body["devices"].as_array().unwrap();
    let ids: Vec<_> = devices.iter().map(|d| d["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["cam1", "cam2", "therm1", "therm2", "fridge1"]);

    // summaries only, no info payload
    assert!(devices.iter().all(|d| d.get("info").is_none()));
    assert_eq!(devices[0]["type"], "security_camera");
    assert_eq!(devices[0]["sub_type"], "PTZ");
    assert_eq!(devices[0]["online"], true);
}

#[tokio::test]
async fn list_devices_is_stable_after_control_activity() {
    let state = test_state(ServerInstance::Second, 4);
    let app = handlers::router(state);

    let (status, _) = call(
        app.clone(),
        "/rpc/control_device",
        json!({ "device_id": "therm3", "command": { "kind": "set_temperature", "temperature": 18.0 } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(app, "/rpc/list_devices", json!({})).await;
    let ids: Vec<_> = body["devices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, ["cam3", "therm3", "fridge2"]);
}

#[tokio::test]
async fn list_devices_is_stable_after_monitor_activity() {
    let state = test_state(ServerInstance::First, 4);
    let cancel = CancellationToken::new();
    let request = MonitorRequest {
        device_id: "fridge1".into(),
        interval: 0.01,
    };
    let mut stream = state.service.monitor_device(request, cancel.clone()).await.unwrap();
    for _ in 0..3 {
        stream.next().await.unwrap().unwrap();
    }
    cancel.cancel();
    drop(stream);

    let (status, body) = call(handlers::router(state), "/rpc/list_devices", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<_> = body["devices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(ids, ["cam1", "cam2", "therm1", "therm2", "fridge1"]);
}

// ---------------------------------------------------------------------------
// GetDeviceInfo
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_device_info_has_exactly_one_matching_payload() {
    for (id, key) in [("cam1", "security_camera"), ("therm2", "thermostat"), ("fridge1", "refrigerator")] {
        let app = build_test_app(ServerInstance::First);
        let (status, body) = call(app, "/rpc/get_device_info", json!({ "device_id": id })).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["device"]["id"], id);
        assert_eq!(body["device"]["type"], key);
        let info = body["info"].as_object().unwrap();
        assert_eq!(info.len(), 1, "payload for {id}: {info:?}");
        assert!(info.contains_key(key));
    }
}

#[tokio::test]
async fn get_device_info_reports_provisioned_values() {
    let app = build_test_app(ServerInstance::Second);
    let (_, body) = call(app, "/rpc/get_device_info", json!({ "device_id": "fridge2" })).await;

    let fridge = &body["info"]["refrigerator"];
    assert_eq!(fridge["mode"], "eco");
    assert_eq!(fridge["door_open"], false);
    assert_eq!(fridge["compartments"][0]["name"], "Main");
    assert_eq!(fridge["compartments"][1]["target_temperature"], -16.0);
}

#[tokio::test]
async fn get_device_info_unknown_device_is_404() {
    let app = build_test_app(ServerInstance::First);
    let (status, body) = call(app, "/rpc/get_device_info", json!({ "device_id": "fridge2" })).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "Device with ID fridge2 not found");
}

// ---------------------------------------------------------------------------
// ControlDevice
// ---------------------------------------------------------------------------

#[tokio::test]
async fn set_position_is_reflected_by_get_device_info() {
    let app = build_test_app(ServerInstance::First);
    let (status, body) = call(
        app.clone(),
        "/rpc/control_device",
        json!({ "device_id": "cam1", "command": { "kind": "set_position", "pan": 10.0, "tilt": 5.0, "zoom": 2.0 } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "device_id": "cam1", "success": true, "message": "Position updated successfully" }));

    let (_, body) = call(app, "/rpc/get_device_info", json!({ "device_id": "cam1" })).await;
    let position = &body["info"]["security_camera"]["position"];
    assert_eq!(position["pan"], 10.0);
    assert_eq!(position["tilt"], 5.0);
    assert_eq!(position["zoom"], 2.0);
}

#[tokio::test]
async fn set_temperature_on_camera_is_a_business_failure() {
    let app = build_test_app(ServerInstance::First);
    let (_, before) = call(app.clone(), "/rpc/get_device_info", json!({ "device_id": "cam2" })).await;

    let (status, body) = call(
        app.clone(),
        "/rpc/control_device",
        json!({ "device_id": "cam2", "command": { "kind": "set_temperature", "temperature": 30.0 } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Device does not support temperature control");

    let (_, after) = call(app, "/rpc/get_device_info", json!({ "device_id": "cam2" })).await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn control_unknown_device_is_404_with_failed_response() {
    let app = build_test_app(ServerInstance::Second);
    let (status, body) = call(
        app,
        "/rpc/control_device",
        json!({ "device_id": "cam1", "command": { "kind": "set_recording", "recording": true } }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["device_id"], "cam1");
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Device with ID cam1 not found");
}

#[tokio::test]
async fn control_without_command_is_unknown_command() {
    let app = build_test_app(ServerInstance::First);
    let (status, body) = call(app.clone(), "/rpc/control_device", json!({ "device_id": "therm1" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Unknown command");

    let (_, body) = call(
        app,
        "/rpc/control_device",
        json!({ "device_id": "therm1", "command": { "kind": "reboot" } }),
    )
    .await;
    assert_eq!(body["message"], "Unknown command");
}

#[tokio::test]
async fn set_mode_and_recording_echo_their_effect() {
    let app = build_test_app(ServerInstance::First);
    let (_, body) = call(
        app.clone(),
        "/rpc/control_device",
        json!({ "device_id": "fridge1", "command": { "kind": "set_mode", "mode": "quick" } }),
    )
    .await;
    assert_eq!(body["message"], "Mode set to Quick");

    let (_, body) = call(
        app,
        "/rpc/control_device",
        json!({ "device_id": "cam1", "command": { "kind": "set_recording", "recording": true } }),
    )
    .await;
    assert_eq!(body["message"], "Recording started");
}

#[tokio::test]
async fn malformed_command_is_rejected_by_the_transport() {
    let app = build_test_app(ServerInstance::First);
    let response = common::post_json(
        app,
        "/rpc/control_device",
        json!({ "device_id": "therm1", "command": { "kind": "set_temperature", "temperature": "warm" } }),
    )
    .await;
    assert!(response.status().is_client_error());
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_instance_and_device_count() {
    let app = build_test_app(ServerInstance::Second);
    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["instance"], 2);
    assert_eq!(json["devices"], 3);
    assert_eq!(json["monitor_streams"], 0);
}
