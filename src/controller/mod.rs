//! Controller subsystem
//!
//! Holds the state of each attached gamepad. Instances are created and
//! destroyed by [`crate::InputState`], which owns the registry keyed by
//! [`crate::ControllerId`].

#[allow(clippy::module_inception)]
pub mod controller;

pub use crate::controller::controller::{ActiveInput, Controller, DEFAULT_ACTIVE_PRECISION};
