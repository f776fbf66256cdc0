// registry.rs
use super::Device;
use crate::error::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::Arc;

/// The fixed device set of one server instance.
///
/// The id index and the ordering are frozen at construction, so lookups need
/// no locking. Device state itself is guarded per device.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<Arc<Device>>,
    index: HashMap<String, usize>,
}

impl DeviceRegistry {
    /// Builds a registry in the given order. Duplicate ids are rejected.
    pub fn new(devices: impl IntoIterator<Item = Device>) -> AppResult<Self> {
        let mut registry = Self::default();
        for device in devices {
            if registry.index.contains_key(device.id()) {
                return Err(AppError::Internal(format!(
                    "duplicate device id {} in registry",
                    device.id()
                )));
            }
            registry
                .index
                .insert(device.id().to_string(), registry.devices.len());
            registry.devices.push(Arc::new(device));
        }
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> AppResult<Arc<Device>> {
        self.index
            .get(id)
            .map(|&i| Arc::clone(&self.devices[i]))
            .ok_or_else(|| AppError::DeviceNotFound(id.to_string()))
    }

    /// Devices in registration order.
    pub fn list(&self) -> impl Iterator<Item = &Arc<Device>> {
        self.devices.iter()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
