//! Wall following parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::WallFollowError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for wall following.
///
/// All distances are in the host's distance units. Any parameter missing from
/// a parameter file takes its default value.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Params {
    // ---- GEOMETRY ----
    /// Spacing between the right-front and right-back sensors along the robot
    pub sensor_baseline: f64,

    /// Largest reading a sensor can return. Invalid readings are treated as
    /// this value (no detection).
    pub max_sensor_range: f64,

    // ---- WALL FOLLOWING ----
    /// Target distance between the robot and the wall on its right
    pub ideal_distance: f64,

    /// Both right-front and right-back must read below this for the wall angle
    /// to be estimated.
    pub wall_present_ceiling: f64,

    /// Turn demand per radian of wall angle
    pub follow_angle_gain: f64,

    /// Turn demand per unit of distance error
    pub follow_distance_gain: f64,

    /// Limit on the absolute turn demand while following
    pub follow_max_turn: f64,

    /// Fraction of the max speed lost per unit of absolute turn demand
    pub turn_speed_penalty: f64,

    /// Fraction of the max speed lost per radian of absolute wall angle
    pub angle_speed_penalty: f64,

    // ---- SPEED ----
    /// Maximum forward speed demand
    pub max_speed: f64,

    /// Minimum forward speed demand while following the wall
    pub min_speed: f64,

    // ---- OBSTACLES ----
    /// Forward distance below which the robot starts turning away
    pub front_threshold: f64,

    /// Forward distance below which the robot stops and turns on the spot
    pub critical_threshold: f64,

    /// Turn demand during a safety stop (negative is left)
    pub safety_stop_turn: f64,

    /// Base turn demand when the obstacle is biased to the right
    pub sharp_avoid_turn: f64,

    /// Base turn demand when the obstacle is not biased to the right
    pub mild_avoid_turn: f64,

    /// Additional turn demand at full turn factor
    pub avoid_turn_gain: f64,

    /// Fraction of the max speed lost at full turn factor
    pub avoid_speed_reduction: f64,

    // ---- WALL END ----
    /// Right average above which a sudden increase counts as the wall ending
    pub wall_end_threshold: f64,

    /// Minimum increase in right average between ticks to count as the wall
    /// ending
    pub sudden_increase_threshold: f64,

    /// Turn demand per unit increase in right average
    pub turn_sensitivity: f64,

    /// Minimum turn demand during wall end recovery
    pub min_turn_rate: f64,

    /// Maximum turn demand during wall end recovery
    pub max_turn_rate: f64,

    /// Fraction of the max speed used during wall end recovery
    pub wall_end_speed_factor: f64,

    // ---- SEARCH ----
    /// Fraction of the max speed used while searching for a wall
    pub search_speed_factor: f64,

    /// Turn demand while searching for a wall
    pub search_turn: f64,

    // ---- GOAL ----
    /// Position of the goal in world coordinates
    pub goal_position: [f64; 2],

    /// Distance from the goal within which it is considered reached
    pub goal_threshold: f64,

    // ---- SMOOTHING ----
    /// Smoothing factor used unless a regime overrides it
    pub default_smoothing: f64,

    /// Smoothing factor during a safety stop
    pub safety_smoothing: f64,

    /// Smoothing factor during wall end recovery
    pub wall_end_smoothing: f64,

    /// Smoothing factor once the goal is reached
    pub goal_smoothing: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            sensor_baseline: 16.0,
            max_sensor_range: 1000.0,

            ideal_distance: 30.0,
            wall_present_ceiling: 100.0,
            follow_angle_gain: 1.5,
            follow_distance_gain: 0.02,
            follow_max_turn: 0.5,
            turn_speed_penalty: 1.2,
            angle_speed_penalty: 2.0,

            max_speed: 5.0,
            min_speed: 2.0,

            front_threshold: 60.0,
            critical_threshold: 30.0,
            safety_stop_turn: -0.6,
            sharp_avoid_turn: -0.5,
            mild_avoid_turn: -0.4,
            avoid_turn_gain: 0.3,
            avoid_speed_reduction: 0.8,

            wall_end_threshold: 60.0,
            sudden_increase_threshold: 20.0,
            turn_sensitivity: 2.0,
            min_turn_rate: 20.0,
            max_turn_rate: 50.0,
            wall_end_speed_factor: 0.2,

            search_speed_factor: 0.6,
            search_turn: 0.5,

            goal_position: [340.0, 260.0],
            goal_threshold: 120.0,

            default_smoothing: 0.8,
            safety_smoothing: 0.5,
            wall_end_smoothing: 0.0,
            goal_smoothing: 0.8,
        }
    }
}

impl Params {
    /// Check that the parameters are consistent.
    pub fn validate(&self) -> Result<(), WallFollowError> {
        for &(name, value) in self.smoothing_factors().iter() {
            if !(0.0..=1.0).contains(&value) {
                return Err(WallFollowError::InvalidParam(
                    name,
                    format!("smoothing factor must be in [0, 1], found {}", value),
                ));
            }
        }

        if !(self.front_threshold > 0.0) {
            return Err(WallFollowError::InvalidParam(
                "front_threshold",
                format!("must be positive, found {}", self.front_threshold),
            ));
        }

        if self.critical_threshold > self.front_threshold {
            return Err(WallFollowError::InvalidParam(
                "critical_threshold",
                format!(
                    "must not exceed front_threshold ({}), found {}",
                    self.front_threshold, self.critical_threshold
                ),
            ));
        }

        if self.min_turn_rate > self.max_turn_rate {
            return Err(WallFollowError::InvalidParam(
                "min_turn_rate",
                format!(
                    "must not exceed max_turn_rate ({}), found {}",
                    self.max_turn_rate, self.min_turn_rate
                ),
            ));
        }

        if !(self.max_sensor_range > 0.0) || !self.max_sensor_range.is_finite() {
            return Err(WallFollowError::InvalidParam(
                "max_sensor_range",
                format!("must be positive and finite, found {}", self.max_sensor_range),
            ));
        }

        Ok(())
    }

    fn smoothing_factors(&self) -> [(&'static str, f64); 4] {
        [
            ("default_smoothing", self.default_smoothing),
            ("safety_smoothing", self.safety_smoothing),
            ("wall_end_smoothing", self.wall_end_smoothing),
            ("goal_smoothing", self.goal_smoothing),
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_valid() {
        Params::default().validate().unwrap();
    }

    #[test]
    fn test_partial_params_file() {
        let params: Params = util::params::from_str(
            r#"
            max_speed = 8.0
            goal_position = [10.0, 20.0]
            "#,
        )
        .unwrap();

        assert_eq!(params.max_speed, 8.0);
        assert_eq!(params.goal_position, [10.0, 20.0]);
        assert_eq!(params.ideal_distance, 30.0);
        assert_eq!(params.goal_threshold, 120.0);
    }

    #[test]
    fn test_shipped_params_file() {
        let params: Params = util::params::load_from_path(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../params/wall_follow.toml"
        ))
        .unwrap();

        params.validate().unwrap();
        assert_eq!(format!("{:?}", params), format!("{:?}", Params::default()));
    }

    #[test]
    fn test_invalid_params() {
        let mut params = Params::default();
        params.safety_smoothing = 1.5;
        assert!(matches!(
            params.validate(),
            Err(WallFollowError::InvalidParam("safety_smoothing", _))
        ));

        let mut params = Params::default();
        params.critical_threshold = 80.0;
        assert!(params.validate().is_err());

        let mut params = Params::default();
        params.min_turn_rate = 60.0;
        assert!(params.validate().is_err());

        let mut params = Params::default();
        params.front_threshold = 0.0;
        params.critical_threshold = 0.0;
        assert!(params.validate().is_err());
    }
}
