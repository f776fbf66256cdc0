// telemetry/mod.rs
//! Randomized drift of device state, one tick at a time.
pub mod monitor;

use crate::devices::{DeviceInfo, RefrigeratorInfo, SecurityCameraInfo, ThermostatInfo};
use rand::Rng;

/// Probability per tick that a refrigerator door flips open or shut.
pub const DOOR_TOGGLE_PROBABILITY: f64 = 0.01;

/// Advances the dynamic fields of `info` by one tick.
pub fn tick<R: Rng + ?Sized>(info: &mut DeviceInfo, rng: &mut R) {
    match info {
        DeviceInfo::SecurityCamera(cam) => tick_camera(cam, rng),
        DeviceInfo::Thermostat(thermostat) => tick_thermostat(thermostat, rng),
        DeviceInfo::Refrigerator(fridge) => tick_refrigerator(fridge, rng),
    }
}

// Upper bound is intentionally left unclamped.
fn drain_battery<R: Rng + ?Sized>(level: f64, rng: &mut R) -> f64 {
    let drain: f64 = rng.random_range(0.0..=1.0);
    (level - drain).max(0.0)
}

fn tick_camera<R: Rng + ?Sized>(cam: &mut SecurityCameraInfo, rng: &mut R) {
    cam.battery_level = drain_battery(cam.battery_level, rng);
    cam.position.pan += rng.random_range(-0.5..=0.5_f64);
    cam.position.tilt += rng.random_range(-0.5..=0.5_f64);
}

fn tick_thermostat<R: Rng + ?Sized>(thermostat: &mut ThermostatInfo, rng: &mut R) {
    thermostat.battery_level = drain_battery(thermostat.battery_level, rng);

    let current = thermostat.current_temperature;
    let target = thermostat.target_temperature;
    if current < target {
        thermostat.current_temperature += rng.random_range(0.0..=0.2_f64);
    } else if current > target {
        thermostat.current_temperature -= rng.random_range(0.0..=0.2_f64);
    } else {
        thermostat.current_temperature += rng.random_range(-0.1..=0.1_f64);
    }
}

fn tick_refrigerator<R: Rng + ?Sized>(fridge: &mut RefrigeratorInfo, rng: &mut R) {
    fridge.current_temperature += rng.random_range(-0.2..=0.2_f64);
    if rng.random_bool(DOOR_TOGGLE_PROBABILITY) {
        fridge.door_open = !fridge.door_open;
    }
    for compartment in &mut fridge.compartments {
        compartment.current_temperature += rng.random_range(-0.1..=0.1_f64);
    }
}
