//! Simulated smart-home device fleet behind a small RPC surface.
//!
//! One process serves one of two pre-provisioned instances. Each instance
//! owns a fixed [`devices::DeviceRegistry`] and answers `ListDevices`,
//! `GetDeviceInfo`, `ControlDevice` and the streaming `MonitorDevice`.
pub mod commands;
pub mod config;
pub mod devices;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod pool;
pub mod service;
pub mod telemetry;
pub mod utils;
