//! # Wall follower agent
//!
//! Attaches a [`WallFollowCtrl`] to a host. The host injects the robot's body and a display to
//! draw labels on, and drives the agent through the [`Process`] lifecycle hooks.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use host_if::{
    eqpt::{SensorFrame, SensorId, NUM_RANGE_SENSORS},
    process::{Embodiment, LabelSink, Process},
};
use log::{debug, info, warn};
use util::{archive::Archived, module::State};

use crate::wall_follow::{InputData, OutputData, Regime, WallFollowCtrl};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Text shown once the agent has been initialised.
const INIT_LABEL: &str = "Initialized";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A right wall following agent.
pub struct WallFollowerAgent<E, L> {
    ctrl: WallFollowCtrl,

    body: E,

    display: L,

    /// Output of the last update, `None` before the first update
    last_output: Option<OutputData>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<E, L> WallFollowerAgent<E, L>
where
    E: Embodiment,
    L: LabelSink,
{
    pub fn new(ctrl: WallFollowCtrl, body: E, display: L) -> Self {
        Self {
            ctrl,
            body,
            display,
            last_output: None,
        }
    }

    pub fn ctrl(&self) -> &WallFollowCtrl {
        &self.ctrl
    }

    pub fn body(&self) -> &E {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut E {
        &mut self.body
    }

    pub fn display(&self) -> &L {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut L {
        &mut self.display
    }

    pub fn last_output(&self) -> Option<&OutputData> {
        self.last_output.as_ref()
    }

    /// Read this tick's inputs from the body.
    ///
    /// Each sensor and the position are queried exactly once. The angular
    /// velocity is only read on wall end ticks, see `update`.
    fn read_inputs(&self) -> InputData {
        let mut dist = [0f64; NUM_RANGE_SENSORS];
        for id in SensorId::ALL.iter() {
            dist[id.index()] = self.body.sensor_value(id.index());
        }

        InputData {
            frame: SensorFrame::new(dist),
            position: self.body.position(),
        }
    }
}

impl<E, L> Process for WallFollowerAgent<E, L>
where
    E: Embodiment,
    L: LabelSink,
{
    fn init(&mut self) {
        self.ctrl.reset();
        self.last_output = None;

        info!("Right wall follower initialised");
        self.display.label(INIT_LABEL, 0.0, -20.0);
    }

    fn start(&mut self) {}

    fn update(&mut self) {
        let input = self.read_inputs();

        let output = match self.ctrl.proc(&input) {
            Ok((o, _)) => o,
            Err(e) => match e {},
        };

        self.body
            .track_velocity(output.demand.speed, output.demand.turn);

        if output.regime == Regime::WallEndRecovery {
            let angular_velocity_rads = self.body.angular_velocity();
            let report = self.ctrl.report();
            debug!(
                "Wall ended - Change: {}, Turn Rate: {}, Angular Vel: {} rad/s",
                report.distance_change, report.raw_turn, angular_velocity_rads
            );
        }

        for label in output.labels.iter() {
            self.display
                .label(&label.text, label.x_offset, label.y_offset);
        }

        if let Err(e) = self.ctrl.write() {
            warn!("Could not write wall follow archives: {}", e);
        }

        self.last_output = Some(output);
    }

    fn stop(&mut self) {}
}
