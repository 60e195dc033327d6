//! # Wall following policy
//!
//! The policy runs in two steps. [`Regime::classify`] picks the single regime
//! that applies this tick, in strict priority order, then [`Regime::decide`]
//! computes the raw (unsmoothed) demand and status text for that regime.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{Features, Params};
use host_if::dems::VelocityDemand;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Absolute distance error under which following is reported as optimal.
const OPTIMAL_DISTANCE_ERROR: f64 = 5.0;

/// Absolute wall angle under which following is reported as optimal, and
/// above which angle corrections are reported.
const OPTIMAL_WALL_ANGLE_RAD: f64 = 0.1;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The regimes the wall follower can be in on any one tick.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum Regime {
    /// Obstacle closer than the critical threshold, stop and turn left
    SafetyStop,

    /// Obstacle closer than the front threshold, turn left while slowing
    NearObstacle {
        /// The obstacle is biased to the right of the robot
        obstacle_right: bool,
    },

    /// The wall on the right has just ended, turn sharply right
    WallEndRecovery,

    /// No wall in range on the right, turn gently right to find one
    SearchingForWall,

    /// Follow the wall at the ideal distance
    Following,

    /// The goal has been reached, stop for good
    AtGoal,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The result of running the policy for one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// The regime selected for this tick
    pub regime: Regime,

    /// The raw demand before smoothing
    pub raw: VelocityDemand,

    /// The smoothing factor to apply to the raw demand
    pub smoothing: f64,

    /// Human readable status of the wall follower
    pub status: String,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Regime {
    /// Select the regime for this tick.
    ///
    /// The first matching regime wins. Reaching the goal masks everything, an
    /// obstacle ahead masks the wall handling, and the end of a wall masks
    /// searching and following.
    pub fn classify(params: &Params, features: &Features, goal_reached: bool) -> Self {
        if goal_reached {
            Regime::AtGoal
        } else if features.min_front < params.critical_threshold {
            Regime::SafetyStop
        } else if features.min_front < params.front_threshold {
            Regime::NearObstacle {
                obstacle_right: features.obstacle_right,
            }
        } else if features.wall_ended {
            Regime::WallEndRecovery
        } else if features.right_average > 2.0 * params.ideal_distance
            || features.right_average == 0.0
        {
            Regime::SearchingForWall
        } else {
            Regime::Following
        }
    }

    /// Short name of the regime, used in archives.
    pub fn name(&self) -> &'static str {
        match self {
            Regime::SafetyStop => "SafetyStop",
            Regime::NearObstacle { .. } => "NearObstacle",
            Regime::WallEndRecovery => "WallEndRecovery",
            Regime::SearchingForWall => "SearchingForWall",
            Regime::Following => "Following",
            Regime::AtGoal => "AtGoal",
        }
    }

    /// Smoothing factor to use in this regime.
    pub fn smoothing(&self, params: &Params) -> f64 {
        match self {
            Regime::SafetyStop => params.safety_smoothing,
            Regime::WallEndRecovery => params.wall_end_smoothing,
            Regime::AtGoal => params.goal_smoothing,
            Regime::NearObstacle { .. } | Regime::SearchingForWall | Regime::Following => {
                params.default_smoothing
            }
        }
    }

    /// Compute the raw demand and status for this regime.
    pub fn decide(self, params: &Params, features: &Features) -> Decision {
        let (raw, status) = match self {
            Regime::AtGoal => (VelocityDemand::stop(), String::from("GOAL REACHED - STOPPED")),
            Regime::SafetyStop => (
                VelocityDemand::new(0.0, params.safety_stop_turn),
                String::from("SAFETY STOP"),
            ),
            Regime::NearObstacle { obstacle_right } => {
                near_obstacle(params, features, obstacle_right)
            }
            Regime::WallEndRecovery => wall_end_recovery(params, features),
            Regime::SearchingForWall => (
                VelocityDemand::new(
                    params.max_speed * params.search_speed_factor,
                    params.search_turn,
                ),
                String::from("Searching for Wall"),
            ),
            Regime::Following => following(params, features),
        };

        Decision {
            regime: self,
            raw,
            smoothing: self.smoothing(params),
            status,
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Turn left away from an obstacle, turning harder and slowing down the closer
/// it gets.
fn near_obstacle(
    params: &Params,
    features: &Features,
    obstacle_right: bool,
) -> (VelocityDemand, String) {
    // 0 at the front threshold, approaching 1 at the obstacle
    let turn_factor = 1.0 - features.min_front / params.front_threshold;

    let (base_turn, status) = if obstacle_right {
        (params.sharp_avoid_turn, "Front-Right Obstacle: Sharp Left")
    } else {
        (params.mild_avoid_turn, "Front Obstacle: Turn Left")
    };

    (
        VelocityDemand::new(
            params.max_speed * (1.0 - turn_factor * params.avoid_speed_reduction),
            base_turn - turn_factor * params.avoid_turn_gain,
        ),
        String::from(status),
    )
}

/// Turn right around the end of the wall, harder the faster the wall receded.
fn wall_end_recovery(params: &Params, features: &Features) -> (VelocityDemand, String) {
    let turn = clamp(
        features.distance_change * params.turn_sensitivity,
        params.min_turn_rate,
        params.max_turn_rate,
    );

    (
        VelocityDemand::new(params.max_speed * params.wall_end_speed_factor, turn),
        format!("Dynamic Right Turn (Wall End) - Turn Rate: {}", turn as i64),
    )
}

/// Hold the ideal distance from the wall while staying parallel to it.
fn following(params: &Params, features: &Features) -> (VelocityDemand, String) {
    let distance_error = params.ideal_distance - features.right_average;
    let wall_angle_rad = features.wall_angle_rad;

    let turn = clamp(
        wall_angle_rad * params.follow_angle_gain + distance_error * params.follow_distance_gain,
        -params.follow_max_turn,
        params.follow_max_turn,
    );

    // Slow down for tight turns and when out of alignment with the wall
    let speed = params.max_speed
        * (1.0
            - turn.abs() * params.turn_speed_penalty
            - wall_angle_rad.abs() * params.angle_speed_penalty);
    let speed = speed.max(params.min_speed);

    let status = if distance_error.abs() < OPTIMAL_DISTANCE_ERROR
        && wall_angle_rad.abs() < OPTIMAL_WALL_ANGLE_RAD
    {
        "Optimal Wall Following"
    } else if wall_angle_rad.abs() > OPTIMAL_WALL_ANGLE_RAD {
        if wall_angle_rad > 0.0 {
            "Adjusting Angle: Diverging"
        } else {
            "Adjusting Angle: Converging"
        }
    } else if distance_error > 0.0 {
        "Too Far: Moving Right"
    } else {
        "Too Close: Moving Left"
    };

    (VelocityDemand::new(speed, turn), String::from(status))
}
