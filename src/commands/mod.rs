// commands/mod.rs
use crate::devices::{DeviceInfo, Position, RefrigeratorMode};
use serde::{Deserialize, Serialize};

/// Control commands accepted by `ControlDevice`.
///
/// Each variant applies to exactly one device type. Unrecognized `kind`
/// values deserialize to [`DeviceCommand::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceCommand {
    SetPosition { pan: f64, tilt: f64, zoom: f64 },
    SetRecording { recording: bool },
    SetTemperature { temperature: f64 },
    SetMode { mode: RefrigeratorMode },
    #[serde(other)]
    Unknown,
}

/// Business-level result of a command. A rejected command leaves the device
/// untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub success: bool,
    pub message: String,
}

impl CommandOutcome {
    fn applied(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl DeviceCommand {
    pub fn name(&self) -> &'static str {
        match self {
            DeviceCommand::SetPosition { .. } => "set_position",
            DeviceCommand::SetRecording { .. } => "set_recording",
            DeviceCommand::SetTemperature { .. } => "set_temperature",
            DeviceCommand::SetMode { .. } => "set_mode",
            DeviceCommand::Unknown => "unknown",
        }
    }

    pub fn apply(&self, info: &mut DeviceInfo) -> CommandOutcome {
        match (self, info) {
            (&DeviceCommand::SetPosition { pan, tilt, zoom }, DeviceInfo::SecurityCamera(cam)) => {
                cam.move_to(Position { pan, tilt, zoom });
                CommandOutcome::applied("Position updated successfully")
            }
            (DeviceCommand::SetPosition { .. }, _) => {
                CommandOutcome::rejected("Device does not support position control")
            }

            (&DeviceCommand::SetRecording { recording }, DeviceInfo::SecurityCamera(cam)) => {
                cam.set_recording(recording);
                let verb = if recording { "started" } else { "stopped" };
                CommandOutcome::applied(format!("Recording {verb}"))
            }
            (DeviceCommand::SetRecording { .. }, _) => {
                CommandOutcome::rejected("Device does not support recording control")
            }

            (&DeviceCommand::SetTemperature { temperature }, DeviceInfo::Thermostat(thermostat)) => {
                thermostat.set_target(temperature);
                CommandOutcome::applied(format!("Temperature set to {temperature:?}"))
            }
            (DeviceCommand::SetTemperature { .. }, _) => {
                CommandOutcome::rejected("Device does not support temperature control")
            }

            (&DeviceCommand::SetMode { mode }, DeviceInfo::Refrigerator(fridge)) => {
                fridge.set_mode(mode);
                CommandOutcome::applied(format!("Mode set to {mode}"))
            }
            (DeviceCommand::SetMode { .. }, _) => {
                CommandOutcome::rejected("Device does not support mode control")
            }

            (DeviceCommand::Unknown, _) => CommandOutcome::rejected("Unknown command"),
        }
    }
}
