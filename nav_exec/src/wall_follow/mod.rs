//! # Wall following module
//!
//! Wall following keeps the robot moving along a wall on its right hand side, steering around
//! obstacles ahead of it, recovering when the wall ends, and stopping once the goal is reached.
//!
//! The robot carries six range sensors: three looking forward (centre, left and right) and three
//! looking out of the right side (front, middle and back). Each tick the readings are reduced to a
//! handful of features: the closest forward reading, the average right side distance, the angle
//! of the robot to the wall, and whether the wall has just ended (a sudden jump in the right side
//! distance).
//!
//! The features are then classified into a single [`Regime`], checked in priority order so that
//! collision avoidance is never overridden by wall following:
//!
//! 1. `AtGoal` - the goal has been reached, stop.
//! 1. `SafetyStop` - something is very close ahead, stop and turn left.
//! 1. `NearObstacle` - something is ahead, turn left harder the closer it is.
//! 1. `WallEndRecovery` - the wall has just ended, turn right sharply to go around it.
//! 1. `SearchingForWall` - no wall within range, turn gently right until one is found.
//! 1. `Following` - track the ideal distance from the wall.
//!
//! Each regime produces a raw speed and turn demand which is exponentially smoothed before being
//! issued, with a smoothing factor chosen by the regime.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod features;
pub mod params;
pub mod policy;
pub mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use features::*;
pub use params::Params;
pub use policy::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while setting up wall following.
#[derive(Debug, thiserror::Error)]
pub enum WallFollowError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid parameter `{0}`: {1}")]
    InvalidParam(&'static str, String),

    #[error("Could not create the archive: {0}")]
    ArchiveError(util::archive::ArchiveError),
}
