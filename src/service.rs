// service.rs
use crate::{
    commands::DeviceCommand,
    devices::{DeviceRegistry, provisioning::ServerInstance},
    error::{AppError, AppResult},
    models::{
        ControlRequest, ControlResponse, DeviceInfoRequest, DeviceInfoResponse, DeviceStatus,
        ListDevicesRequest, ListDevicesResponse, MonitorRequest,
    },
    pool::WorkerPool,
    telemetry::monitor,
};
use async_trait::async_trait;
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use futures_util::stream::BoxStream;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use validator::Validate;

pub type StatusStream = BoxStream<'static, AppResult<DeviceStatus>>;

/// The four smart-home RPC operations.
#[async_trait]
pub trait SmartHome: Send + Sync {
    async fn list_devices(&self, request: ListDevicesRequest) -> AppResult<ListDevicesResponse>;

    async fn get_device_info(&self, request: DeviceInfoRequest) -> AppResult<DeviceInfoResponse>;

    async fn control_device(&self, request: ControlRequest) -> Result<ControlResponse, ControlError>;

    /// Opens a telemetry stream. Lookup and validation failures are returned
    /// before any snapshot is produced.
    async fn monitor_device(
        &self,
        request: MonitorRequest,
        cancel: CancellationToken,
    ) -> AppResult<StatusStream>;
}

/// A protocol-level control failure that still carries a response body.
#[derive(Debug)]
pub struct ControlError {
    pub error: AppError,
    pub response: ControlResponse,
}

impl ControlError {
    fn new(device_id: &str, error: AppError) -> Self {
        Self {
            response: ControlResponse {
                device_id: device_id.to_string(),
                success: false,
                message: error.to_string(),
            },
            error,
        }
    }
}

impl IntoResponse for ControlError {
    fn into_response(self) -> Response {
        (self.error.code().status(), Json(self.response)).into_response()
    }
}

fn record_call(method: &'static str) {
    metrics::counter!("smarthome_rpc_requests_total", "method" => method).increment(1);
}

fn record_error(method: &'static str, err: &AppError) {
    metrics::counter!(
        "smarthome_rpc_errors_total",
        "method" => method,
        "code" => err.code().as_str()
    )
    .increment(1);
}

/// Handlers bound to one instance's registry.
pub struct SmartHomeService {
    instance: ServerInstance,
    registry: Arc<DeviceRegistry>,
    workers: WorkerPool,
}

impl SmartHomeService {
    pub fn new(instance: ServerInstance, registry: Arc<DeviceRegistry>, workers: WorkerPool) -> Self {
        Self {
            instance,
            registry,
            workers,
        }
    }

    pub fn workers(&self) -> &WorkerPool {
        &self.workers
    }
}

#[async_trait]
impl SmartHome for SmartHomeService {
    async fn list_devices(&self, request: ListDevicesRequest) -> AppResult<ListDevicesResponse> {
        const METHOD: &str = "list_devices";
        record_call(METHOD);
        info!(server = %self.instance, user_id = %request.user_id, "ListDevices called");

        let _worker = self.workers.acquire(METHOD).await.inspect_err(|e| record_error(METHOD, e))?;
        let devices = self.registry.list().map(|device| device.summary()).collect();
        Ok(ListDevicesResponse { devices })
    }

    async fn get_device_info(&self, request: DeviceInfoRequest) -> AppResult<DeviceInfoResponse> {
        const METHOD: &str = "get_device_info";
        record_call(METHOD);
        info!(server = %self.instance, device_id = %request.device_id, "GetDeviceInfo called");

        let result: AppResult<_> = async {
            let _worker = self.workers.acquire(METHOD).await?;
            let device = self.registry.get(&request.device_id)?;
            Ok(DeviceInfoResponse {
                device: device.summary(),
                info: device.info().await,
            })
        }
        .await;

        result.inspect_err(|e| record_error(METHOD, e))
    }

    async fn control_device(&self, request: ControlRequest) -> Result<ControlResponse, ControlError> {
        const METHOD: &str = "control_device";
        record_call(METHOD);
        let command = request.command.unwrap_or(DeviceCommand::Unknown);
        info!(
            server = %self.instance,
            device_id = %request.device_id,
            command = command.name(),
            "ControlDevice called"
        );

        let fail = |error: AppError| {
            record_error(METHOD, &error);
            ControlError::new(&request.device_id, error)
        };

        let _worker = self.workers.acquire(METHOD).await.map_err(fail)?;
        let device = self.registry.get(&request.device_id).map_err(fail)?;

        let outcome = device.update(|info| command.apply(info)).await;
        if !outcome.success {
            warn!(device_id = %request.device_id, message = %outcome.message, "Control command rejected");
        }

        Ok(ControlResponse {
            device_id: request.device_id,
            success: outcome.success,
            message: outcome.message,
        })
    }

    async fn monitor_device(
        &self,
        request: MonitorRequest,
        cancel: CancellationToken,
    ) -> AppResult<StatusStream> {
        const METHOD: &str = "monitor_device";
        record_call(METHOD);
        info!(
            server = %self.instance,
            device_id = %request.device_id,
            interval = request.interval,
            "MonitorDevice called"
        );

        let result: AppResult<_> = async {
            let worker = self.workers.acquire(METHOD).await?;
            let device = self.registry.get(&request.device_id)?;
            request.validate()?;
            Ok(monitor::status_stream(device, request.interval, cancel, worker))
        }
        .await;

        result.inspect_err(|e| record_error(METHOD, e))
    }
}
