//! Wall following module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace, warn};
use serde::Serialize;
use std::convert::Infallible;

// Internal
use super::*;
use host_if::{
    dems::{Label, VelocityDemand},
    eqpt::{Position, SensorFrame, SensorId},
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::exp_blend,
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Vertical offset of the status label.
const STATUS_LABEL_OFFSET: f64 = -20.0;

/// Vertical offset of the front sensor label.
const FRONT_LABEL_OFFSET: f64 = -35.0;

/// Vertical offset of the right sensor label.
const RIGHT_LABEL_OFFSET: f64 = -50.0;

/// Vertical offset of the final position label shown at the goal.
const FINAL_POSITION_LABEL_OFFSET: f64 = -40.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// State carried by the wall follower from one tick to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ControllerState {
    /// Right side average on the previous tick, zero before the first tick
    pub previous_right_average: f64,

    /// The smoothed speed demand issued on the previous tick
    pub smoothed_speed: f64,

    /// The smoothed turn demand issued on the previous tick
    pub smoothed_turn: f64,

    /// Set once the goal has been reached, never cleared
    pub goal_reached: bool,
}

/// Everything produced by one tick of the wall follower.
#[derive(Debug, Clone)]
pub struct Tick {
    /// The sanitised sensor frame used this tick
    pub frame: SensorFrame,

    /// True if any sensor reading had to be sanitised
    pub frame_sanitised: bool,

    pub features: Features,

    pub decision: Decision,

    /// The smoothed demand to issue
    pub demand: VelocityDemand,

    /// True only on the tick the goal was first reached
    pub goal_reached_now: bool,
}

/// Wall following module.
#[derive(Default)]
pub struct WallFollowCtrl {
    params: Params,

    state: ControllerState,

    report: StatusReport,
    arch_report: Archiver,
}

/// Input data to wall following.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    pub frame: SensorFrame,

    pub position: Position,
}

/// Output of wall following.
#[derive(Debug, Clone)]
pub struct OutputData {
    /// The velocity demand the body must track
    pub demand: VelocityDemand,

    /// Labels to display next to the robot
    pub labels: Vec<Label>,

    pub regime: Regime,
}

/// Status report for wall following processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// Number of the tick this report is for, starting at 1
    pub tick: u64,

    pub regime: &'static str,

    pub min_front: f64,
    pub right_average: f64,
    pub wall_angle_rad: f64,
    pub distance_change: f64,
    pub wall_ended: bool,
    pub distance_to_goal: f64,

    pub raw_speed: f64,
    pub raw_turn: f64,
    pub smoothing: f64,
    pub speed: f64,
    pub turn: f64,

    pub goal_reached: bool,

    /// True if any sensor reading was invalid this tick
    pub inputs_sanitised: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Run one tick of wall following.
///
/// The state is only written at the end of the tick, all fields together.
/// `params` must have passed [`Params::validate`].
pub fn step(
    params: &Params,
    state: &mut ControllerState,
    frame: &SensorFrame,
    position: &Position,
) -> Tick {
    let (frame, frame_sanitised) = sanitise_frame(params, frame);

    let features = Features::extract(params, &frame, position, state.previous_right_average);

    let goal_reached_now =
        !state.goal_reached && features.distance_to_goal < params.goal_threshold;
    let goal_reached = state.goal_reached || goal_reached_now;

    let decision = Regime::classify(params, &features, goal_reached).decide(params, &features);

    let demand = VelocityDemand::new(
        exp_blend(state.smoothed_speed, decision.raw.speed, decision.smoothing),
        exp_blend(state.smoothed_turn, decision.raw.turn, decision.smoothing),
    );

    *state = ControllerState {
        previous_right_average: features.right_average,
        smoothed_speed: demand.speed,
        smoothed_turn: demand.turn,
        goal_reached,
    };

    Tick {
        frame,
        frame_sanitised,
        features,
        decision,
        demand,
        goal_reached_now,
    }
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for WallFollowCtrl {
    type InitData = &'static str;
    type InitError = WallFollowError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = Infallible;

    /// Initialise the wall following module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data).map_err(WallFollowError::ParamLoadError)?;
        params.validate()?;

        self.params = params;
        self.reset();

        self.arch_report = Archiver::from_path(session, "wall_follow/status_report.csv")
            .map_err(WallFollowError::ArchiveError)?;

        Ok(())
    }

    /// Perform cyclic processing of wall following.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let tick = step(
            &self.params,
            &mut self.state,
            &input_data.frame,
            &input_data.position,
        );

        if tick.frame_sanitised {
            warn!(
                "Invalid sensor readings replaced: {:?} -> {:?}",
                input_data.frame.dist, tick.frame.dist
            );
        }

        if tick.goal_reached_now {
            info!(
                "Goal Reached at ({}, {})!",
                input_data.position.x, input_data.position.y
            );
        }

        trace!(
            "WallFollow output: {} ({:?}) -> {:?}",
            tick.decision.status,
            tick.decision.raw,
            tick.demand
        );

        self.report = StatusReport {
            tick: self.report.tick + 1,
            regime: tick.decision.regime.name(),
            min_front: tick.features.min_front,
            right_average: tick.features.right_average,
            wall_angle_rad: tick.features.wall_angle_rad,
            distance_change: tick.features.distance_change,
            wall_ended: tick.features.wall_ended,
            distance_to_goal: tick.features.distance_to_goal,
            raw_speed: tick.decision.raw.speed,
            raw_turn: tick.decision.raw.turn,
            smoothing: tick.decision.smoothing,
            speed: tick.demand.speed,
            turn: tick.demand.turn,
            goal_reached: self.state.goal_reached,
            inputs_sanitised: tick.frame_sanitised,
        };

        let output = OutputData {
            demand: tick.demand,
            labels: self.labels(&tick, &input_data.position),
            regime: tick.decision.regime,
        };

        Ok((output, self.report))
    }
}

impl Archived for WallFollowCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

impl WallFollowCtrl {
    /// Create a new wall follower with the given parameters and no archives.
    ///
    /// The parameters are validated in the same way as in `init`.
    pub fn new(params: Params) -> Result<Self, WallFollowError> {
        params.validate()?;

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    /// Reset the controller to its initial state.
    pub fn reset(&mut self) {
        self.state = ControllerState::default();
        self.report = StatusReport::default();
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Get the status report from the last tick.
    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    /// Build the labels to display for this tick.
    fn labels(&self, tick: &Tick, position: &Position) -> Vec<Label> {
        if self.state.goal_reached {
            return vec![
                Label::new("GOAL REACHED!", 0.0, STATUS_LABEL_OFFSET),
                Label::new(
                    format!(
                        "Final Position: ({}, {})",
                        position.x as i64, position.y as i64
                    ),
                    0.0,
                    FINAL_POSITION_LABEL_OFFSET,
                ),
            ];
        }

        let d = |id: SensorId| tick.frame.get(id) as i64;

        vec![
            Label::new(tick.decision.status.clone(), 0.0, STATUS_LABEL_OFFSET),
            Label::new(
                format!(
                    "Front: {} | L: {} | R: {}",
                    d(SensorId::FrontCentre),
                    d(SensorId::FrontLeft),
                    d(SensorId::FrontRight)
                ),
                0.0,
                FRONT_LABEL_OFFSET,
            ),
            Label::new(
                format!(
                    "Right: {} | {} | {}",
                    d(SensorId::RightFront),
                    d(SensorId::RightMiddle),
                    d(SensorId::RightBack)
                ),
                0.0,
                RIGHT_LABEL_OFFSET,
            ),
        ]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const FAR: Position = Position { x: 0.0, y: 0.0 };

    fn frame(dist: [f64; 6]) -> SensorFrame {
        SensorFrame::new(dist)
    }

    fn proc(ctrl: &mut WallFollowCtrl, dist: [f64; 6], position: Position) -> OutputData {
        let input = InputData {
            frame: frame(dist),
            position,
        };

        match ctrl.proc(&input) {
            Ok((o, _)) => o,
            Err(e) => match e {},
        }
    }

    #[test]
    fn test_searching_scenario() {
        let params = Params::default();
        let mut state = ControllerState::default();

        let tick = step(&params, &mut state, &frame([200.0; 6]), &FAR);

        assert_eq!(tick.decision.regime, Regime::SearchingForWall);
        assert!((tick.decision.raw.speed - 0.6 * params.max_speed).abs() < 1e-12);
        assert_eq!(tick.decision.raw.turn, 0.5);

        // First tick smooths up from rest
        assert!((tick.demand.speed - 0.2 * 3.0).abs() < 1e-9);
        assert!((tick.demand.turn - 0.2 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_obstacle_dead_ahead() {
        let params = Params::default();
        let mut state = ControllerState::default();

        let tick = step(
            &params,
            &mut state,
            &frame([10.0, 200.0, 200.0, 200.0, 200.0, 200.0]),
            &FAR,
        );

        assert_eq!(tick.decision.regime, Regime::SafetyStop);
        assert_eq!(tick.decision.raw, VelocityDemand::new(0.0, -0.6));
        assert!((tick.demand.turn - (-0.3)).abs() < 1e-12);
        assert_eq!(tick.demand.speed, 0.0);
    }

    #[test]
    fn test_wall_end_edge() {
        let params = Params::default();
        let mut state = ControllerState {
            previous_right_average: 20.0,
            ..Default::default()
        };

        let tick = step(
            &params,
            &mut state,
            &frame([200.0, 200.0, 200.0, 65.0, 65.0, 65.0]),
            &FAR,
        );

        assert!(tick.features.wall_ended);
        assert_eq!(tick.decision.regime, Regime::WallEndRecovery);
        assert!(tick.decision.raw.turn >= 20.0 && tick.decision.raw.turn <= 50.0);

        // No smoothing in recovery, the command is issued immediately
        assert_eq!(tick.demand, tick.decision.raw);
        assert!(tick.demand.turn >= 20.0 && tick.demand.turn <= 50.0);
    }

    #[test]
    fn test_previous_right_average_tracks_last_tick() {
        let params = Params::default();
        let mut state = ControllerState::default();

        step(&params, &mut state, &frame([200.0, 200.0, 200.0, 20.0, 30.0, 40.0]), &FAR);
        assert!((state.previous_right_average - 30.0).abs() < 1e-12);

        step(&params, &mut state, &frame([5.0, 200.0, 200.0, 60.0, 60.0, 60.0]), &FAR);
        assert!((state.previous_right_average - 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_smoothing_fixed_point() {
        let params = Params::default();
        let sensors = frame([200.0, 200.0, 200.0, 30.0, 30.0, 30.0]);

        // Start already at the following demand for the ideal distance
        let mut state = ControllerState {
            previous_right_average: 30.0,
            smoothed_speed: params.max_speed,
            smoothed_turn: 0.0,
            goal_reached: false,
        };

        for _ in 0..20 {
            let tick = step(&params, &mut state, &sensors, &FAR);
            assert_eq!(tick.decision.raw, VelocityDemand::new(params.max_speed, 0.0));
            assert!((tick.demand.speed - params.max_speed).abs() < 1e-12);
            assert_eq!(tick.demand.turn, 0.0);
        }
    }

    #[test]
    fn test_smoothed_demand_within_envelope() {
        let params = Params::default();
        let mut state = ControllerState::default();
        let sequence = [
            [200.0, 200.0, 200.0, 30.0, 30.0, 30.0],
            [50.0, 40.0, 200.0, 30.0, 30.0, 30.0],
            [20.0, 40.0, 200.0, 30.0, 30.0, 30.0],
            [200.0, 200.0, 200.0, 90.0, 90.0, 90.0],
            [200.0, 200.0, 200.0, 200.0, 200.0, 200.0],
            [200.0, 200.0, 200.0, 10.0, 12.0, 14.0],
        ];

        let mut min = (0f64, 0f64);
        let mut max = (0f64, 0f64);

        for dist in sequence.iter().cycle().take(60) {
            let tick = step(&params, &mut state, &frame(*dist), &FAR);

            min = (min.0.min(tick.decision.raw.speed), min.1.min(tick.decision.raw.turn));
            max = (max.0.max(tick.decision.raw.speed), max.1.max(tick.decision.raw.turn));

            assert!(tick.demand.speed >= min.0 - 1e-9 && tick.demand.speed <= max.0 + 1e-9);
            assert!(tick.demand.turn >= min.1 - 1e-9 && tick.demand.turn <= max.1 + 1e-9);
        }
    }

    #[test]
    fn test_goal_latch() {
        let params = Params::default();
        let mut state = ControllerState::default();
        let sensors = frame([200.0, 200.0, 200.0, 30.0, 30.0, 30.0]);

        let tick = step(&params, &mut state, &sensors, &Position::new(100.0, 100.0));
        assert!(!tick.goal_reached_now);
        assert!(!state.goal_reached);

        // First time within the threshold of (340, 260)
        let tick = step(&params, &mut state, &sensors, &Position::new(300.0, 250.0));
        assert!(tick.goal_reached_now);
        assert!(state.goal_reached);

        // Following tick stops unconditionally, even with an obstacle and no
        // wall, and the arrival is not reported again
        let tick = step(
            &params,
            &mut state,
            &frame([5.0, 5.0, 5.0, 500.0, 500.0, 500.0]),
            &Position::new(300.0, 250.0),
        );
        assert_eq!(tick.decision.regime, Regime::AtGoal);
        assert_eq!(tick.decision.raw, VelocityDemand::stop());
        assert!(!tick.goal_reached_now);

        // Moving away again never clears the latch
        for _ in 0..10 {
            let tick = step(&params, &mut state, &sensors, &Position::new(0.0, 0.0));
            assert!(state.goal_reached);
            assert_eq!(tick.decision.regime, Regime::AtGoal);
            assert!(!tick.goal_reached_now);
        }
    }

    #[test]
    fn test_invalid_inputs_do_not_poison_state() {
        let params = Params::default();
        let mut state = ControllerState::default();

        let tick = step(
            &params,
            &mut state,
            &frame([std::f64::NAN, 200.0, -3.0, std::f64::INFINITY, 30.0, 30.0]),
            &Position::new(std::f64::NAN, std::f64::NAN),
        );

        assert!(tick.frame_sanitised);
        assert!(!state.goal_reached);
        assert!(state.smoothed_speed.is_finite());
        assert!(state.smoothed_turn.is_finite());
        assert!(state.previous_right_average.is_finite());

        // Front-right reading of -3 is clamped to 0, which is a safety stop
        assert_eq!(tick.decision.regime, Regime::SafetyStop);
    }

    #[test]
    fn test_new_validates_params() {
        let mut params = Params::default();
        params.default_smoothing = 1.5;

        assert!(matches!(
            WallFollowCtrl::new(params),
            Err(WallFollowError::InvalidParam("default_smoothing", _))
        ));

        // With valid params the demand stays within the raw envelope while
        // searching, where the raw demand is (3.0, 0.5)
        let mut ctrl = WallFollowCtrl::new(Params::default()).unwrap();
        for _ in 0..5 {
            let out = proc(&mut ctrl, [200.0; 6], FAR);
            assert!(out.demand.speed >= 0.0 && out.demand.speed <= 3.0);
            assert!(out.demand.turn >= 0.0 && out.demand.turn <= 0.5);
        }
    }

    #[test]
    fn test_labels() {
        let mut ctrl = WallFollowCtrl::new(Params::default()).unwrap();

        let out = proc(
            &mut ctrl,
            [200.9, 150.0, 120.2, 30.7, 30.0, 29.9],
            FAR,
        );
        assert_eq!(out.labels.len(), 3);
        assert_eq!(out.labels[0].text, "Optimal Wall Following");
        assert_eq!(out.labels[0].y_offset, -20.0);
        assert_eq!(out.labels[1].text, "Front: 200 | L: 150 | R: 120");
        assert_eq!(out.labels[1].y_offset, -35.0);
        assert_eq!(out.labels[2].text, "Right: 30 | 30 | 29");
        assert_eq!(out.labels[2].y_offset, -50.0);
        assert_eq!(ctrl.report().tick, 1);
        assert_eq!(ctrl.report().regime, "Following");

        let out = proc(
            &mut ctrl,
            [200.0, 200.0, 200.0, 30.0, 30.0, 30.0],
            Position::new(341.6, 259.2),
        );
        assert_eq!(out.regime, Regime::AtGoal);
        assert_eq!(out.labels.len(), 2);
        assert_eq!(out.labels[0].text, "GOAL REACHED!");
        assert_eq!(out.labels[1].text, "Final Position: (341, 259)");
        assert_eq!(out.labels[1].y_offset, -40.0);
        assert_eq!(ctrl.report().tick, 2);
        assert!(ctrl.report().goal_reached);

        ctrl.reset();
        assert_eq!(*ctrl.state(), ControllerState::default());
        assert_eq!(ctrl.report().tick, 0);
    }
}
