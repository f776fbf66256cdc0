// provisioning.rs
//! Static device tables of the two server instances.
use super::{
    Compartment, Device, DeviceRegistry, Position, RefrigeratorInfo, RefrigeratorMode,
    SecurityCameraInfo, ThermostatInfo,
};
use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ServerInstance {
    First,
    Second,
}

impl ServerInstance {
    pub fn number(self) -> u8 {
        match self {
            ServerInstance::First => 1,
            ServerInstance::Second => 2,
        }
    }

    pub fn default_port(self) -> u16 {
        match self {
            ServerInstance::First => 50051,
            ServerInstance::Second => 50052,
        }
    }

    pub fn devices(self) -> Vec<Device> {
        match self {
            ServerInstance::First => first_instance_devices(),
            ServerInstance::Second => second_instance_devices(),
        }
    }

    pub fn registry(self) -> AppResult<DeviceRegistry> {
        DeviceRegistry::new(self.devices())
    }
}

impl TryFrom<u8> for ServerInstance {
    type Error = AppError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ServerInstance::First),
            2 => Ok(ServerInstance::Second),
            other => Err(AppError::InvalidArgument(format!(
                "server instance must be 1 or 2, got {other}"
            ))),
        }
    }
}

impl From<ServerInstance> for u8 {
    fn from(instance: ServerInstance) -> Self {
        instance.number()
    }
}

impl fmt::Display for ServerInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

fn camera(
    id: &str,
    name: &str,
    sub_type: &str,
    location: &str,
    recording: bool,
    position: Position,
    battery_level: f64,
) -> Device {
    Device::new(
        id,
        name,
        sub_type,
        SecurityCameraInfo {
            location: location.into(),
            recording,
            position,
            battery_level,
        },
    )
}

fn thermostat(
    id: &str,
    name: &str,
    sub_type: &str,
    location: &str,
    current: f64,
    target: f64,
    battery_level: f64,
) -> Device {
    Device::new(
        id,
        name,
        sub_type,
        ThermostatInfo {
            location: location.into(),
            temperature_unit: "Celsius".into(),
            current_temperature: current,
            target_temperature: target,
            battery_level,
        },
    )
}

fn refrigerator(
    id: &str,
    name: &str,
    sub_type: &str,
    mode: RefrigeratorMode,
    main: f64,
    freezer: f64,
) -> Device {
    Device::new(
        id,
        name,
        sub_type,
        RefrigeratorInfo {
            mode,
            current_temperature: main,
            door_open: false,
            compartments: vec![
                Compartment::new("Main", main),
                Compartment::new("Freezer", freezer),
            ],
        },
    )
}

const HOME: Position = Position { pan: 0.0, tilt: 0.0, zoom: 1.0 };

fn first_instance_devices() -> Vec<Device> {
    vec![
        camera("cam1", "Living Room Camera", "PTZ", "Living Room", false, HOME, 85.0),
        camera("cam2", "Front Door Camera", "Fixed", "Front Door", true, HOME, 92.0),
        thermostat("therm1", "Living Room Thermostat", "Smart", "Living Room", 22.5, 21.0, 78.0),
        thermostat("therm2", "Bedroom Thermostat", "Basic", "Bedroom", 20.0, 19.0, 65.0),
        refrigerator("fridge1", "Kitchen Refrigerator", "Smart", RefrigeratorMode::Normal, 4.0, -18.0),
    ]
}

fn second_instance_devices() -> Vec<Device> {
    vec![
        camera(
            "cam3",
            "Backyard Camera",
            "Outdoor",
            "Backyard",
            true,
            Position { pan: 45.0, tilt: 10.0, zoom: 2.0 },
            70.0,
        ),
        thermostat("therm3", "Kitchen Thermostat", "Premium", "Kitchen", 23.5, 22.0, 90.0),
        refrigerator("fridge2", "Garage Refrigerator", "Basic", RefrigeratorMode::Eco, 5.0, -16.0),
    ]
}
