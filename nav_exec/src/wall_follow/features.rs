//! # Feature extraction
//!
//! Reduces the raw sensor frame and position into the quantities the policy
//! acts on. Extraction is pure, the only state it needs is the previous
//! tick's right side average.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::Serialize;

// Internal
use super::Params;
use host_if::eqpt::{Position, SensorFrame, SensorId, NUM_RANGE_SENSORS};
use util::maths::{clamp, mean};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Features extracted from a single tick's sensor frame and position.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Features {
    /// Closest of the three forward readings
    pub min_front: f64,

    /// True if the front-right reading is closer than the front-left one
    pub obstacle_right: bool,

    /// Mean of the three right side readings
    pub right_average: f64,

    /// Angle of the robot to the wall on its right, positive when the front
    /// of the robot is further from the wall than the back.
    ///
    /// Units: radians
    pub wall_angle_rad: f64,

    /// Change in right average since the previous tick
    pub distance_change: f64,

    /// True if the wall on the right has suddenly ended
    pub wall_ended: bool,

    /// Straight line distance to the goal, infinite if the position is not
    /// known.
    pub distance_to_goal: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Features {
    /// Extract the features for this tick.
    ///
    /// The frame must already have been sanitised with [`sanitise_frame`].
    pub fn extract(
        params: &Params,
        frame: &SensorFrame,
        position: &Position,
        previous_right_average: f64,
    ) -> Self {
        let front_centre = frame.get(SensorId::FrontCentre);
        let front_left = frame.get(SensorId::FrontLeft);
        let front_right = frame.get(SensorId::FrontRight);
        let right_front = frame.get(SensorId::RightFront);
        let right_middle = frame.get(SensorId::RightMiddle);
        let right_back = frame.get(SensorId::RightBack);

        let min_front = front_centre.min(front_left).min(front_right);

        // Can't fail as the slice is never empty
        let right_average = mean(&[right_front, right_middle, right_back]).unwrap_or(0.0);

        // The angle can only be estimated if both ends of the robot can see
        // the wall
        let wall_angle_rad = if right_front < params.wall_present_ceiling
            && right_back < params.wall_present_ceiling
        {
            (right_front - right_back).atan2(params.sensor_baseline)
        } else {
            0.0
        };

        let distance_change = right_average - previous_right_average;

        let wall_ended = right_average > params.wall_end_threshold
            && previous_right_average > 0.0
            && distance_change > params.sudden_increase_threshold;

        Self {
            min_front,
            obstacle_right: front_right < front_left,
            right_average,
            wall_angle_rad,
            distance_change,
            wall_ended,
            distance_to_goal: distance_to_goal(params, position),
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Make a sensor frame safe to use.
///
/// Non-finite readings are treated as no detection (the maximum sensor range),
/// and all readings are clamped into `[0, max_sensor_range]`. Returns the
/// sanitised frame and whether any reading had to be changed.
pub fn sanitise_frame(params: &Params, frame: &SensorFrame) -> (SensorFrame, bool) {
    let mut dist = [0f64; NUM_RANGE_SENSORS];
    let mut changed = false;

    for (i, &d) in frame.dist.iter().enumerate() {
        dist[i] = if d.is_finite() {
            clamp(d, 0.0, params.max_sensor_range)
        } else {
            params.max_sensor_range
        };

        if dist[i] != d {
            changed = true;
        }
    }

    (SensorFrame::new(dist), changed)
}

/// Distance between the position and the goal, or infinity if the position
/// isn't finite.
fn distance_to_goal(params: &Params, position: &Position) -> f64 {
    if !position.is_finite() {
        return std::f64::INFINITY;
    }

    let goal = Vector2::new(params.goal_position[0], params.goal_position[1]);

    (Vector2::new(position.x, position.y) - goal).norm()
}

#[cfg(test)]
mod test {
    use super::*;

    fn frame(dist: [f64; 6]) -> SensorFrame {
        SensorFrame::new(dist)
    }

    #[test]
    fn test_front_and_right() {
        let params = Params::default();
        let f = Features::extract(
            &params,
            &frame([80.0, 45.0, 70.0, 20.0, 30.0, 40.0]),
            &Position::new(0.0, 0.0),
            0.0,
        );

        assert_eq!(f.min_front, 45.0);
        assert!(!f.obstacle_right);
        assert!((f.right_average - 30.0).abs() < 1e-12);
        assert!((f.wall_angle_rad - (-20f64).atan2(16.0)).abs() < 1e-12);
        assert!(f.wall_angle_rad < 0.0);
    }

    #[test]
    fn test_wall_angle_needs_wall() {
        let params = Params::default();

        // Right back can't see the wall
        let f = Features::extract(
            &params,
            &frame([200.0, 200.0, 200.0, 30.0, 60.0, 100.0]),
            &Position::new(0.0, 0.0),
            0.0,
        );
        assert_eq!(f.wall_angle_rad, 0.0);

        // Parallel to the wall
        let f = Features::extract(
            &params,
            &frame([200.0, 200.0, 200.0, 30.0, 30.0, 30.0]),
            &Position::new(0.0, 0.0),
            0.0,
        );
        assert_eq!(f.wall_angle_rad, 0.0);
    }

    #[test]
    fn test_wall_ended() {
        let params = Params::default();
        let wall_gone = frame([200.0, 200.0, 200.0, 65.0, 65.0, 65.0]);

        let f = Features::extract(&params, &wall_gone, &Position::new(0.0, 0.0), 20.0);
        assert!(f.wall_ended);
        assert!((f.distance_change - 45.0).abs() < 1e-12);

        // No previous reading, can't be an edge
        let f = Features::extract(&params, &wall_gone, &Position::new(0.0, 0.0), 0.0);
        assert!(!f.wall_ended);

        // Increase too small
        let f = Features::extract(&params, &wall_gone, &Position::new(0.0, 0.0), 50.0);
        assert!(!f.wall_ended);

        // Large increase but still below the wall end threshold
        let f = Features::extract(
            &params,
            &frame([200.0, 200.0, 200.0, 55.0, 55.0, 55.0]),
            &Position::new(0.0, 0.0),
            10.0,
        );
        assert!(!f.wall_ended);
    }

    #[test]
    fn test_distance_to_goal() {
        let params = Params::default();
        let sensors = frame([200.0; 6]);

        let f = Features::extract(&params, &sensors, &Position::new(340.0, 160.0), 0.0);
        assert!((f.distance_to_goal - 100.0).abs() < 1e-9);

        let f = Features::extract(
            &params,
            &sensors,
            &Position::new(std::f64::NAN, 260.0),
            0.0,
        );
        assert!(f.distance_to_goal.is_infinite());
    }

    #[test]
    fn test_sanitise_frame() {
        let params = Params::default();

        let (clean, changed) = sanitise_frame(&params, &frame([10.0, 20.0, 30.0, 40.0, 50.0, 60.0]));
        assert!(!changed);
        assert_eq!(clean.dist, [10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);

        let (clean, changed) = sanitise_frame(
            &params,
            &frame([
                std::f64::NAN,
                -5.0,
                std::f64::INFINITY,
                5000.0,
                std::f64::NEG_INFINITY,
                25.0,
            ]),
        );
        assert!(changed);
        assert_eq!(clean.dist, [1000.0, 0.0, 1000.0, 1000.0, 1000.0, 25.0]);
    }
}
