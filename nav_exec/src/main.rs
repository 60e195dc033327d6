//! Wall following executable entry point.
//!
//! # Architecture
//!
//! The executable replays a tick script through the right wall follower:
//!
//!     - Initialise the session, logging and the wall follower
//!     - Main loop, one cycle per scripted sample:
//!         - Load the sample into the replay body
//!         - Update the agent, which reads the body, runs the wall follower, and issues the
//!           demand and labels
//!         - Record the tick in the run summary
//!     - Save the run summary into the session
//!
//! # Usage
//!
//! ```text
//! nav_exec <SCRIPT_PATH> [--fast]
//! ```
//!
//! With `--fast` cycles run back to back rather than at the control rate.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use host_if::process::Process;
use nav_lib::{
    agent::WallFollowerAgent,
    replay::{LabelLog, ReplayBody, RunSummary},
    wall_follow::WallFollowCtrl,
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
    tick_script::TickScript,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.10;

/// Flag disabling cycle pacing.
const FAST_FLAG: &str = "--fast";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("nav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    info!("Wall Following Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD SCRIPT ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let (script_path, fast) = match args.len() {
        2 => (&args[1], false),
        3 if args[2] == FAST_FLAG => (&args[1], true),
        _ => {
            return Err(eyre!(
                "Usage: nav_exec <SCRIPT_PATH> [{}], found {} arguments",
                FAST_FLAG,
                args.len() - 1
            ))
        }
    };

    info!("Loading script from \"{}\"", script_path);

    let mut script = TickScript::new(script_path).wrap_err("Failed to load script")?;

    info!(
        "Loaded script lasts {:.02} s and contains {} samples\n",
        script.get_duration(),
        script.get_num_samples()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ctrl = WallFollowCtrl::default();
    ctrl.init("wall_follow.toml", &session)
        .wrap_err("Failed to initialise WallFollowCtrl")?;
    info!("WallFollowCtrl init complete");

    let mut agent = WallFollowerAgent::new(ctrl, ReplayBody::default(), LabelLog::default());
    agent.init();
    agent.start();

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut summary = RunSummary::default();

    while let Some(scripted) = script.next_sample() {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        agent.body_mut().load(scripted.sample);
        agent.display_mut().clear();

        agent.update();

        // Update always issues a demand, default to stopped just in case
        let demand = agent.body().last_demand().unwrap_or_default();
        summary.record(agent.ctrl().report(), demand, scripted.sample.position);

        // ---- CYCLE MANAGEMENT ----

        if fast {
            continue;
        }

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - CYCLE_PERIOD_S
            ),
        }
    }

    info!("End of script reached, stopping");

    agent.stop();

    // ---- SHUTDOWN ----

    info!(
        "Ran {} ticks, goal reached: {} (tick {:?})",
        summary.num_ticks, summary.goal_reached, summary.goal_tick
    );

    session.save("run_summary.json", summary);
    session.exit();

    info!("End of execution");

    Ok(())
}
