// thermostat.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermostatInfo {
    pub location: String,
    pub temperature_unit: String,
    pub current_temperature: f64,
    pub target_temperature: f64,
    pub battery_level: f64,
}

impl ThermostatInfo {
    /// Changes the setpoint. The measured temperature drifts towards it on
    /// subsequent telemetry ticks.
    pub fn set_target(&mut self, temperature: f64) {
        self.target_temperature = temperature;
    }
}
