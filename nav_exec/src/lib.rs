//! # Navigation library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access the items
//! defined inside the navigation executable.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Agent - attaches the wall follower to a host through its lifecycle hooks
pub mod agent;

/// Replay host - provides host data from a recorded tick script
pub mod replay;

/// Wall following module - converts range sensor readings into velocity demands
pub mod wall_follow;
