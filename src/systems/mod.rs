//! Systems module - all ECS systems for the trajectory overlay.

pub mod debug;
pub mod orchestrator;
pub mod render;
pub mod sampler;
pub mod settings;
