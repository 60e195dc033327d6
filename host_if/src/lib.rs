//! # Host interface crate.
//!
//! Provides the boundary contracts between the navigation controller and the host which embodies
//! it: the sensor and position data read each tick, the demands the controller issues, and the
//! capabilities the host injects into the controller.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Sensor and position data read from the embodiment
pub mod eqpt;

/// Demands issued by the controller to the host
pub mod dems;

/// Capabilities injected by the host and the lifecycle hooks exposed to it
pub mod process;
