//! # Process Interface
//!
//! The host owns the robot's body and display. Rather than the controller inheriting from host
//! types, the host hands it these capabilities through traits and drives it through the
//! [`Process`] lifecycle hooks.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use crate::eqpt::Position;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The robot body the controller is attached to.
pub trait Embodiment {
    /// Get the reading of the range sensor at the given index.
    fn sensor_value(&self, index: usize) -> f64;

    /// Get the position of the robot in world coordinates.
    fn position(&self) -> Position;

    /// Get the angular velocity of the robot body in radians/second.
    fn angular_velocity(&self) -> f64;

    /// Command the body to track the given forward speed and turn rate.
    fn track_velocity(&mut self, speed: f64, turn: f64);
}

/// Somewhere to draw text next to the robot.
pub trait LabelSink {
    fn label(&mut self, text: &str, x_offset: f64, y_offset: f64);
}

/// Lifecycle hooks called by the host.
///
/// The host guarantees that `update` is called once per control tick, in order, and never
/// concurrently for the same process.
pub trait Process {
    /// One-time initialisation, called before the first tick.
    fn init(&mut self);

    /// Called once when the host starts running the process.
    fn start(&mut self);

    /// Per-tick processing.
    fn update(&mut self);

    /// Called once when the host stops running the process.
    fn stop(&mut self);
}
