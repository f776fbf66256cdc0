// devices/mod.rs
mod refrigerator;
mod security_camera;
mod thermostat;

pub mod provisioning;
pub mod registry;

pub use refrigerator::{Compartment, RefrigeratorInfo, RefrigeratorMode};
pub use registry::DeviceRegistry;
pub use security_camera::{Position, SecurityCameraInfo};
pub use thermostat::ThermostatInfo;

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    SecurityCamera,
    Thermostat,
    Refrigerator,
}

impl DeviceType {
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceType::SecurityCamera => "security_camera",
            DeviceType::Thermostat => "thermostat",
            DeviceType::Refrigerator => "refrigerator",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The type-specific payload of a device. Exactly one variant is ever
/// populated and it always agrees with the owning device's [`DeviceType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceInfo {
    SecurityCamera(SecurityCameraInfo),
    Thermostat(ThermostatInfo),
    Refrigerator(RefrigeratorInfo),
}

impl DeviceInfo {
    pub fn device_type(&self) -> DeviceType {
        match self {
            DeviceInfo::SecurityCamera(_) => DeviceType::SecurityCamera,
            DeviceInfo::Thermostat(_) => DeviceType::Thermostat,
            DeviceInfo::Refrigerator(_) => DeviceType::Refrigerator,
        }
    }
}

impl From<SecurityCameraInfo> for DeviceInfo {
    fn from(info: SecurityCameraInfo) -> Self {
        DeviceInfo::SecurityCamera(info)
    }
}

impl From<ThermostatInfo> for DeviceInfo {
    fn from(info: ThermostatInfo) -> Self {
        DeviceInfo::Thermostat(info)
    }
}

impl From<RefrigeratorInfo> for DeviceInfo {
    fn from(info: RefrigeratorInfo) -> Self {
        DeviceInfo::Refrigerator(info)
    }
}

/// Identity and metadata of a device, without its info payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    pub sub_type: String,
    pub online: bool,
}

/// A simulated appliance.
///
/// Identity fields are immutable. The info payload sits behind a per-device
/// lock shared by control commands, telemetry ticks and snapshot readers.
#[derive(Debug)]
pub struct Device {
    id: String,
    name: String,
    device_type: DeviceType,
    sub_type: String,
    // never toggled by any operation
    online: bool,
    info: RwLock<DeviceInfo>,
}

impl Device {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        sub_type: impl Into<String>,
        info: impl Into<DeviceInfo>,
    ) -> Self {
        let info = info.into();
        Self {
            id: id.into(),
            name: name.into(),
            device_type: info.device_type(),
            sub_type: sub_type.into(),
            online: true,
            info: RwLock::new(info),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn summary(&self) -> DeviceSummary {
        DeviceSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            device_type: self.device_type,
            sub_type: self.sub_type.clone(),
            online: self.online,
        }
    }

    /// Consistent copy of the current info payload.
    pub async fn info(&self) -> DeviceInfo {
        self.info.read().await.clone()
    }

    /// Runs `f` with exclusive access to the info payload.
    ///
    /// `f` must mutate fields in place and never swap the variant.
    pub async fn update<R>(&self, f: impl FnOnce(&mut DeviceInfo) -> R) -> R {
        let mut info = self.info.write().await;
        let out = f(&mut *info);
        debug_assert_eq!(info.device_type(), self.device_type);
        out
    }
}
