// utils.rs
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StreamEntry {
    pub device_id: String,
    pub started_at: DateTime<Utc>,
}

/// Registry of open monitor streams, keyed by stream id.
#[derive(Debug, Default)]
pub struct StreamTracker {
    streams: DashMap<Uuid, StreamEntry>,
}

impl StreamTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self, device_id: &str) -> Uuid {
        let stream_id = Uuid::new_v4();
        self.streams.insert(
            stream_id,
            StreamEntry {
                device_id: device_id.to_string(),
                started_at: Utc::now(),
            },
        );
        metrics::gauge!("smarthome_monitor_streams_active").set(self.streams.len() as f64);
        stream_id
    }

    pub fn active(&self) -> usize {
        self.streams.len()
    }

    /// Snapshot of open streams, oldest first.
    pub fn entries(&self) -> Vec<(Uuid, StreamEntry)> {
        let mut entries: Vec<_> = self
            .streams
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        entries.sort_by_key(|(_, entry)| entry.started_at);
        entries
    }
}

pub fn cleanup_monitor_stream(stream_id: Uuid, tracker: &StreamTracker, emitted: u64) {
    if let Some((_, entry)) = tracker.streams.remove(&stream_id) {
        let lifetime = Utc::now() - entry.started_at;
        info!(
            %stream_id,
            device_id = %entry.device_id,
            emitted,
            lifetime_ms = lifetime.num_milliseconds(),
            "Monitor stream closed"
        );
    }
    metrics::gauge!("smarthome_monitor_streams_active").set(tracker.active() as f64);
}
