// refrigerator.rs
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefrigeratorMode {
    Normal,
    Eco,
    Quick,
}

impl fmt::Display for RefrigeratorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefrigeratorMode::Normal => "Normal",
            RefrigeratorMode::Eco => "Eco",
            RefrigeratorMode::Quick => "Quick",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compartment {
    pub name: String,
    pub current_temperature: f64,
    pub target_temperature: f64,
}

impl Compartment {
    pub fn new(name: impl Into<String>, temperature: f64) -> Self {
        Self {
            name: name.into(),
            current_temperature: temperature,
            target_temperature: temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefrigeratorInfo {
    pub mode: RefrigeratorMode,
    pub current_temperature: f64,
    pub door_open: bool,
    pub compartments: Vec<Compartment>,
}

impl RefrigeratorInfo {
    pub fn set_mode(&mut self, mode: RefrigeratorMode) {
        self.mode = mode;
    }
}
