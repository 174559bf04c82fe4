//! Snapshot types returned by the active-state queries of [`super::InputState`]

use serde::Serialize;
use std::collections::BTreeMap;

use crate::controller::ActiveInput;
use crate::event::{ControllerId, Key, MouseButton};

/// Everything currently held, as enum members
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ActiveInputs {
    pub keys: Vec<Key>,
    pub mouse_buttons: Vec<MouseButton>,
    pub mouse_position: (f64, f64),
    /// Active inputs of every registered controller, empty when idle
    pub controllers: BTreeMap<ControllerId, Vec<ActiveInput>>,
    pub quit: bool,
}

/// Everything currently held, as display names
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ActiveInputNames {
    pub keys: Vec<&'static str>,
    pub mouse_buttons: Vec<&'static str>,
    pub mouse_position: (f64, f64),
    pub controllers: BTreeMap<ControllerId, Vec<&'static str>>,
    pub quit: bool,
}

impl ActiveInputs {
    pub fn names(&self) -> ActiveInputNames {
        ActiveInputNames {
            keys: self.keys.iter().map(|key| key.name()).collect(),
            mouse_buttons: self.mouse_buttons.iter().map(|b| b.name()).collect(),
            mouse_position: self.mouse_position,
            controllers: self
                .controllers
                .iter()
                .map(|(id, active)| (*id, active.iter().map(ActiveInput::name).collect()))
                .collect(),
            quit: self.quit,
        }
    }
}
