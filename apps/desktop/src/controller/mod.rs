//! Controller layer: wizard actions, the state transition function, and effect orchestration.

pub mod events;
pub mod orchestration;
pub mod reducer;
