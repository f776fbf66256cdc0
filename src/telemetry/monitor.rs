// telemetry/monitor.rs
use crate::{
    devices::Device,
    error::{AppError, AppResult},
    models::DeviceStatus,
};
use futures_util::stream::{self, BoxStream, StreamExt};
use rand::{SeedableRng, rngs::StdRng};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

struct MonitorState<G> {
    device: Arc<Device>,
    interval_secs: f64,
    rng: StdRng,
    cancel: CancellationToken,
    ticks: u64,
    failed: bool,
    // released together with the stream
    _guard: G,
}

/// Lazy, unbounded stream of telemetry snapshots for one device.
///
/// Every item is produced by ticking the device once and capturing the
/// result under the same write lock. Items after the first are preceded by a
/// sleep of `interval_secs`. The cancellation token is checked before every
/// tick and raced against every sleep; once it fires the stream ends without
/// emitting anything further. An interval that does not fit in a
/// [`Duration`] ends the stream with an `Internal` error after the first
/// snapshot.
///
/// `guard` is held until the stream finishes or is dropped, which is how a
/// worker permit stays occupied for the lifetime of the stream.
pub fn status_stream<G>(
    device: Arc<Device>,
    interval_secs: f64,
    cancel: CancellationToken,
    guard: G,
) -> BoxStream<'static, AppResult<DeviceStatus>>
where
    G: Send + 'static,
{
    status_stream_with_rng(device, interval_secs, cancel, guard, StdRng::from_os_rng())
}

pub fn status_stream_with_rng<G>(
    device: Arc<Device>,
    interval_secs: f64,
    cancel: CancellationToken,
    guard: G,
    rng: StdRng,
) -> BoxStream<'static, AppResult<DeviceStatus>>
where
    G: Send + 'static,
{
    let state = MonitorState {
        device,
        interval_secs,
        rng,
        cancel,
        ticks: 0,
        failed: false,
        _guard: guard,
    };

    stream::unfold(state, |mut state| async move {
        if state.failed {
            return None;
        }

        if state.ticks > 0 {
            let period = match Duration::try_from_secs_f64(state.interval_secs) {
                Ok(period) => period,
                Err(e) => {
                    state.failed = true;
                    let err = AppError::Internal(format!(
                        "invalid monitor interval {}s: {e}",
                        state.interval_secs
                    ));
                    return Some((Err(err), state));
                }
            };
            tokio::select! {
                _ = state.cancel.cancelled() => return None,
                _ = tokio::time::sleep(period) => {}
            }
        }

        if state.cancel.is_cancelled() {
            return None;
        }

        let device = Arc::clone(&state.device);
        let rng = &mut state.rng;
        let status = device
            .update(|info| {
                super::tick(info, rng);
                DeviceStatus::capture(&device, info)
            })
            .await;

        state.ticks += 1;
        metrics::counter!(
            "smarthome_telemetry_ticks_total",
            "device_type" => device.device_type().as_str()
        )
        .increment(1);
        debug!(device_id = %device.id(), tick = state.ticks, "Telemetry tick");

        Some((Ok(status), state))
    })
    .boxed()
}
