// security_camera.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub pan: f64,
    pub tilt: f64,
    pub zoom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityCameraInfo {
    pub location: String,
    pub recording: bool,
    pub position: Position,
    /// Percent. Only the lower bound is enforced.
    pub battery_level: f64,
}

impl SecurityCameraInfo {
    pub fn move_to(&mut self, position: Position) {
        self.position = position;
    }

    pub fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }
}
