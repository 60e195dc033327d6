//! # Demands Interface
//!
//! Demands issued by the controller, which the host must actuate or display.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A velocity demand for the embodiment to track.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct VelocityDemand {
    /// Forward speed of the robot body
    pub speed: f64,

    /// Turn rate of the robot body, positive turning right
    pub turn: f64,
}

/// A line of text to be drawn next to the robot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,

    /// Offset of the text from the robot along the screen X axis
    pub x_offset: f64,

    /// Offset of the text from the robot along the screen Y axis
    pub y_offset: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl VelocityDemand {
    pub fn new(speed: f64, turn: f64) -> Self {
        Self { speed, turn }
    }

    /// Demand to bring the robot to rest.
    pub fn stop() -> Self {
        Self::default()
    }
}

impl Label {
    pub fn new<S: Into<String>>(text: S, x_offset: f64, y_offset: f64) -> Self {
        Self {
            text: text.into(),
            x_offset,
            y_offset,
        }
    }
}
