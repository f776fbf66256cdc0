// handlers.rs

use crate::{
    error::{AppError, AppResult},
    models::{
        AppState, ControlRequest, ControlResponse, DeviceInfoRequest, DeviceInfoResponse,
        ListDevicesRequest, ListDevicesResponse, MonitorRequest, WsMessage,
    },
    service::{ControlError, StatusStream},
    utils,
};
use axum::{
    Json, Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
    routing::{get, post},
};
use futures_util::{Sink, SinkExt, StreamExt, stream::SplitStream};
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

/// How long teardown waits for a peer to take the close frame.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/rpc/list_devices", post(list_devices))
        .route("/rpc/get_device_info", post(get_device_info))
        .route("/rpc/control_device", post(control_device))
        .route("/ws/monitor", get(handle_monitor_ws_upgrade))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "instance": state.instance.number(),
        "devices": state.device_count,
        "monitor_streams": state.streams.active(),
    }))
}

pub async fn list_devices(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ListDevicesRequest>,
) -> AppResult<Json<ListDevicesResponse>> {
    state.service.list_devices(request).await.map(Json)
}

pub async fn get_device_info(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DeviceInfoRequest>,
) -> AppResult<Json<DeviceInfoResponse>> {
    state.service.get_device_info(request).await.map(Json)
}

pub async fn control_device(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ControlRequest>,
) -> Result<Json<ControlResponse>, ControlError> {
    state.service.control_device(request).await.map(Json)
}

pub async fn handle_monitor_ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    info!("Monitor connection attempt");
    ws.on_upgrade(|socket| handle_monitor(socket, state))
}

async fn handle_monitor(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let request = match read_monitor_request(&mut receiver).await {
        Some(Ok(request)) => request,
        Some(Err(err)) => {
            send_error(&mut sender, &err, &state.shutdown).await;
            close_sink(&mut sender).await;
            return;
        }
        None => return,
    };

    let cancel = state.shutdown.child_token();
    // Armed before the call can queue for a worker.
    let recv_task = watch_disconnect(receiver, cancel.clone());

    let opened = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(device_id = %request.device_id, "Monitor client gone before the stream opened");
            recv_task.abort();
            return;
        }
        opened = state.service.monitor_device(request.clone(), cancel.clone()) => opened,
    };
    let mut stream = match opened {
        Ok(stream) => stream,
        Err(err) => {
            send_error(&mut sender, &err, &cancel).await;
            recv_task.abort();
            close_sink(&mut sender).await;
            return;
        }
    };

    let stream_id = state.streams.open(&request.device_id);
    info!(%stream_id, device_id = %request.device_id, "Monitor stream opened");

    let emitted = forward_statuses(&mut stream, &mut sender, &cancel).await;

    // Frees the worker before the socket teardown.
    drop(stream);
    cancel.cancel();
    recv_task.abort();
    utils::cleanup_monitor_stream(stream_id, &state.streams, emitted);
    close_sink(&mut sender).await;
}

/// Cancels `cancel` once the client closes or drops the connection. The client
/// sends nothing after the opening frame.
fn watch_disconnect(mut receiver: SplitStream<WebSocket>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
        cancel.cancel();
    })
}

/// Pumps status snapshots into `sink` until the stream ends, the peer goes
/// away or `cancel` fires. Returns the number of frames delivered.
async fn forward_statuses<S>(stream: &mut StatusStream, sink: &mut S, cancel: &CancellationToken) -> u64
where
    S: Sink<Message> + Unpin,
{
    let mut emitted = 0u64;
    while let Some(item) = stream.next().await {
        let status = match item {
            Ok(status) => status,
            Err(err) => {
                send_error(sink, &err, cancel).await;
                break;
            }
        };
        let text = match serde_json::to_string(&WsMessage::Status(status)) {
            Ok(text) => text,
            Err(e) => {
                let err = AppError::Internal(format!("failed to encode status: {e}"));
                send_error(sink, &err, cancel).await;
                break;
            }
        };
        if !send_text(sink, text, cancel).await {
            debug!(emitted, "Monitor peer closed or stopped reading");
            break;
        }
        emitted += 1;
    }
    emitted
}

async fn read_monitor_request(
    receiver: &mut SplitStream<WebSocket>,
) -> Option<AppResult<MonitorRequest>> {
    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => return None,
            _ => continue,
        };
        let request = serde_json::from_str::<Value>(text.as_str())
            .map_err(invalid_frame)
            .and_then(parse_opening_frame);
        return Some(request);
    }
    None
}

/// The opening frame is a `MonitorRequest`, either bare or tagged with
/// `"type": "monitor"`.
fn parse_opening_frame(frame: Value) -> AppResult<MonitorRequest> {
    if frame.get("type").is_none() {
        return serde_json::from_value(frame).map_err(invalid_frame);
    }
    match serde_json::from_value::<WsMessage>(frame).map_err(invalid_frame)? {
        WsMessage::Monitor(request) => Ok(request),
        _ => Err(AppError::InvalidArgument(
            "expected a monitor request as the first frame".into(),
        )),
    }
}

fn invalid_frame(e: serde_json::Error) -> AppError {
    AppError::InvalidArgument(format!("invalid message format: {e}"))
}

/// Sends one text frame. Gives up once `cancel` fires, so a peer that stops
/// reading cannot hold the stream open past shutdown or disconnect.
async fn send_text<S>(sink: &mut S, text: String, cancel: &CancellationToken) -> bool
where
    S: Sink<Message> + Unpin,
{
    tokio::select! {
        sent = sink.send(Message::Text(text.into())) => sent.is_ok(),
        _ = cancel.cancelled() => false,
    }
}

async fn send_error<S>(sink: &mut S, err: &AppError, cancel: &CancellationToken)
where
    S: Sink<Message> + Unpin,
{
    if let AppError::Internal(msg) = err {
        error!(error = %msg, "Monitor stream failed");
    }
    let frame = WsMessage::Error {
        code: err.code(),
        message: err.to_string(),
    };
    if let Ok(text) = serde_json::to_string(&frame) {
        send_text(sink, text, cancel).await;
    }
}

async fn close_sink<S>(sink: &mut S)
where
    S: Sink<Message> + Unpin,
{
    if tokio::time::timeout(CLOSE_TIMEOUT, sink.close()).await.is_err() {
        debug!("Monitor peer did not take the close frame in time");
    }
}
