use crate::{
    commands::DeviceCommand,
    devices::{Device, DeviceInfo, DeviceSummary, DeviceType, provisioning::ServerInstance},
    error::{AppResult, ErrorCode},
    pool::WorkerPool,
    service::{SmartHome, SmartHomeService},
    utils::StreamTracker,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use validator::Validate;

/// One telemetry snapshot emitted by a monitor stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub device_id: String,
    pub device_type: DeviceType,
    pub is_online: bool,
    pub info: DeviceInfo,
    pub timestamp: DateTime<Utc>,
}

impl DeviceStatus {
    pub fn capture(device: &Device, info: &DeviceInfo) -> Self {
        Self {
            device_id: device.id().to_string(),
            device_type: device.device_type(),
            is_online: device.is_online(),
            info: info.clone(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListDevicesRequest {
    #[serde(default)]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListDevicesResponse {
    pub devices: Vec<DeviceSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfoRequest {
    pub device_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfoResponse {
    pub device: DeviceSummary,
    pub info: DeviceInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlRequest {
    pub device_id: String,
    /// Absent means "no command", answered with `Unknown command`.
    #[serde(default)]
    pub command: Option<DeviceCommand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlResponse {
    pub device_id: String,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MonitorRequest {
    pub device_id: String,
    /// Seconds between snapshots.
    #[validate(range(exclusive_min = 0.0))]
    pub interval: f64,
}

/// Frames exchanged on the monitor WebSocket.
///
/// The client opens with `Monitor`; the server answers with `Status` frames
/// and ends with at most one `Error` frame.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    Monitor(MonitorRequest),
    Status(DeviceStatus),
    Error { code: ErrorCode, message: String },
}

/// Everything one server instance shares across requests.
pub struct AppState {
    pub instance: ServerInstance,
    pub device_count: usize,
    pub service: Arc<dyn SmartHome>,
    pub streams: StreamTracker,
    /// Parent of every monitor stream's cancellation token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        instance: ServerInstance,
        max_workers: usize,
        shutdown: CancellationToken,
    ) -> AppResult<Self> {
        let registry = Arc::new(instance.registry()?);
        let device_count = registry.len();
        let service = SmartHomeService::new(instance, registry, WorkerPool::new(max_workers));
        Ok(Self {
            instance,
            device_count,
            service: Arc::new(service),
            streams: StreamTracker::new(),
            shutdown,
        })
    }
}
