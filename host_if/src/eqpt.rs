//! # Equipment Interface
//!
//! This module defines the data read from the robot's equipment on every control tick, the six
//! range sensors and the world position.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The number of range sensors on the robot.
pub const NUM_RANGE_SENSORS: usize = 6;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// One reading of all range sensors, in the order given by [`SensorId`].
///
/// Units: host distance units
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorFrame {
    pub dist: [f64; NUM_RANGE_SENSORS],
}

/// Position of the robot in world coordinates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A single sample of everything the host provides to the controller on one tick.
///
/// Samples are used to record and replay the host side of a run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct HostSample {
    /// Range sensor readings, in [`SensorId`] order
    pub sensors: [f64; NUM_RANGE_SENSORS],

    /// Position of the robot
    pub position: Position,

    /// Angular velocity of the robot body.
    ///
    /// Units: radians/second
    #[serde(default)]
    pub angular_velocity_rads: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// IDs of the range sensors, the discriminant being the host's sensor index.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum SensorId {
    FrontCentre = 0,
    FrontLeft = 1,
    FrontRight = 2,
    RightFront = 3,
    RightMiddle = 4,
    RightBack = 5,
}

/// Possible errors when parsing a [`HostSample`].
#[derive(Debug, Error)]
pub enum SampleParseError {
    #[error("Sample contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SensorId {
    /// All sensors in index order.
    pub const ALL: [SensorId; NUM_RANGE_SENSORS] = [
        SensorId::FrontCentre,
        SensorId::FrontLeft,
        SensorId::FrontRight,
        SensorId::RightFront,
        SensorId::RightMiddle,
        SensorId::RightBack,
    ];

    /// Index of the sensor in the host's sensor list.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl SensorFrame {
    /// Build a frame from readings given in [`SensorId`] order.
    pub fn new(dist: [f64; NUM_RANGE_SENSORS]) -> Self {
        Self { dist }
    }

    /// Get the reading of a particular sensor.
    pub fn get(&self, id: SensorId) -> f64 {
        self.dist[id.index()]
    }
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// True if both coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl HostSample {
    /// Parse a sample from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, SampleParseError> {
        serde_json::from_str(json).map_err(SampleParseError::InvalidJson)
    }

    /// Get the sensor frame contained in this sample.
    pub fn frame(&self) -> SensorFrame {
        SensorFrame::new(self.sensors)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sensor_order() {
        let frame = SensorFrame::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        assert_eq!(frame.get(SensorId::FrontCentre), 1.0);
        assert_eq!(frame.get(SensorId::FrontRight), 3.0);
        assert_eq!(frame.get(SensorId::RightBack), 6.0);

        for (i, id) in SensorId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn test_sample_from_json() {
        let sample = HostSample::from_json(
            r#"{"sensors": [200, 200, 200, 25, 30, 35], "position": {"x": 10.5, "y": -3}}"#,
        )
        .unwrap();

        assert_eq!(sample.frame().get(SensorId::RightMiddle), 30.0);
        assert_eq!(sample.position, Position::new(10.5, -3.0));
        assert_eq!(sample.angular_velocity_rads, 0.0);

        assert!(HostSample::from_json(r#"{"sensors": [1, 2]}"#).is_err());
    }
}
