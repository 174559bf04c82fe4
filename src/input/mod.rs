//! Input state aggregation
//!
//! ```text
//! Backend ──[Event]──► InputState::update ──[Event]──► Application
//!                          │
//!                          └─► keys / mouse / window / controllers
//! ```

pub mod input_state;
pub mod snapshot;

pub use crate::input::input_state::{
    InputSettings, InputState, WindowMetadata, DEFAULT_AXIS_TOLERANCE, MISSED_CONTROLLER_THRESHOLD,
};
pub use crate::input::snapshot::{ActiveInputNames, ActiveInputs};
