//! # Replay host
//!
//! Provides the host side of a run from recorded [`HostSample`]s, so that the wall follower can be
//! exercised without the simulation. The body records every velocity demand it is given and the
//! display keeps the labels drawn on the latest tick.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;

use host_if::{
    dems::{Label, VelocityDemand},
    eqpt::{HostSample, Position},
    process::{Embodiment, LabelSink},
};
use log::trace;
use serde::Serialize;

use crate::wall_follow::StatusReport;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A body whose sensors and position are replayed from samples.
#[derive(Debug, Default)]
pub struct ReplayBody {
    sample: Option<HostSample>,

    demands: Vec<VelocityDemand>,
}

/// A display which keeps the labels drawn since it was last cleared.
#[derive(Debug, Default)]
pub struct LabelLog {
    labels: Vec<Label>,
}

/// Summary of a replayed run, saved at the end of the run.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunSummary {
    /// Number of ticks run
    pub num_ticks: u64,

    /// Number of ticks spent in each regime
    pub regime_ticks: BTreeMap<&'static str, u64>,

    /// True if the goal was reached
    pub goal_reached: bool,

    /// The tick the goal was reached on
    pub goal_tick: Option<u64>,

    /// Number of ticks with invalid sensor readings
    pub num_sanitised_ticks: u64,

    /// The last demand issued
    pub final_demand: VelocityDemand,

    /// The last position of the robot
    pub final_position: Position,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ReplayBody {
    /// Load the sample for the next tick.
    pub fn load(&mut self, sample: HostSample) {
        self.sample = Some(sample);
    }

    /// All demands issued so far, in order.
    ///
    /// Every demand of the run is kept, so memory grows with the length of the
    /// replayed script.
    pub fn demands(&self) -> &[VelocityDemand] {
        &self.demands
    }

    pub fn last_demand(&self) -> Option<VelocityDemand> {
        self.demands.last().copied()
    }
}

impl Embodiment for ReplayBody {
    /// Before any sample is loaded, or for an index with no sensor, nothing is
    /// detected.
    fn sensor_value(&self, index: usize) -> f64 {
        self.sample
            .and_then(|s| s.sensors.get(index).copied())
            .unwrap_or(std::f64::INFINITY)
    }

    fn position(&self) -> Position {
        self.sample
            .map(|s| s.position)
            .unwrap_or_else(|| Position::new(std::f64::NAN, std::f64::NAN))
    }

    fn angular_velocity(&self) -> f64 {
        self.sample.map(|s| s.angular_velocity_rads).unwrap_or(0.0)
    }

    fn track_velocity(&mut self, speed: f64, turn: f64) {
        self.demands.push(VelocityDemand::new(speed, turn));
    }
}

impl LabelLog {
    /// Clear the log, ready for the next tick.
    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }
}

impl LabelSink for LabelLog {
    fn label(&mut self, text: &str, x_offset: f64, y_offset: f64) {
        trace!("Label ({}, {}): {}", x_offset, y_offset, text);
        self.labels.push(Label::new(text, x_offset, y_offset));
    }
}

impl RunSummary {
    /// Record the outcome of one tick.
    pub fn record(&mut self, report: &StatusReport, demand: VelocityDemand, position: Position) {
        self.num_ticks += 1;

        *self.regime_ticks.entry(report.regime).or_insert(0) += 1;

        if report.goal_reached && !self.goal_reached {
            self.goal_reached = true;
            self.goal_tick = Some(report.tick);
        }

        if report.inputs_sanitised {
            self.num_sanitised_ticks += 1;
        }

        self.final_demand = demand;
        self.final_position = position;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        agent::WallFollowerAgent,
        wall_follow::{Params, WallFollowCtrl},
    };
    use host_if::process::Process;
    use util::tick_script::TickScript;

    /// Along a wall, then the wall ends, then an obstacle, then the goal.
    const SCRIPT: &str = r#"
        0.0: {"sensors": [200, 200, 200, 30, 30, 30], "position": {"x": 0, "y": 0}};
        0.1: {"sensors": [200, 200, 200, 30, 30, 30], "position": {"x": 0, "y": 5}};
        0.2: {"sensors": [200, 200, 200, 70, 70, 70], "position": {"x": 0, "y": 10}, "angular_velocity_rads": 0.2};
        0.3: {"sensors": [20, 200, 200, 70, 70, 70], "position": {"x": 5, "y": 10}};
        0.4: {"sensors": [200, 200, 200, 30, 30, 30], "position": {"x": 330, "y": 250}};
        0.5: {"sensors": [200, 200, 200, 30, 30, 30], "position": {"x": 331, "y": 250}};
    "#;

    #[test]
    fn test_replay_body_without_sample() {
        let body = ReplayBody::default();

        assert!(body.sensor_value(0).is_infinite());
        assert!(!body.position().is_finite());
        assert_eq!(body.angular_velocity(), 0.0);
        assert!(body.last_demand().is_none());
    }

    #[test]
    fn test_replay_script() {
        let mut script = TickScript::from_str(SCRIPT).unwrap();
        let mut agent = WallFollowerAgent::new(
            WallFollowCtrl::new(Params::default()).unwrap(),
            ReplayBody::default(),
            LabelLog::default(),
        );
        let mut summary = RunSummary::default();
        let mut regimes = vec![];

        agent.init();
        agent.start();

        while let Some(s) = script.next_sample() {
            agent.body_mut().load(s.sample);
            agent.update();

            let demand = agent.body().last_demand().unwrap();
            summary.record(agent.ctrl().report(), demand, s.sample.position);
            regimes.push(agent.ctrl().report().regime);
        }

        agent.stop();

        assert_eq!(
            regimes,
            vec![
                "Following",
                "Following",
                "WallEndRecovery",
                "SafetyStop",
                "AtGoal",
                "AtGoal"
            ]
        );

        assert_eq!(summary.num_ticks, 6);
        assert_eq!(summary.regime_ticks["Following"], 2);
        assert_eq!(summary.regime_ticks["AtGoal"], 2);
        assert!(summary.goal_reached);
        assert_eq!(summary.goal_tick, Some(5));
        assert_eq!(summary.num_sanitised_ticks, 0);
        assert_eq!(summary.final_position, Position::new(331.0, 250.0));
        assert_eq!(agent.body().demands().len(), 6);

        // Recovery is unsmoothed, so its demand is the raw recovery turn of
        // 40 * 2 = 80 limited to 50
        assert_eq!(agent.body().demands()[2], VelocityDemand::new(1.0, 50.0));
    }
}
