//! # Tick script module
//!
//! Tick scripts record what a host provided to the controller on each control
//! tick, so that a run can be replayed without the host. Each entry is a
//! timestamp followed by a JSON [`HostSample`], terminated with a semicolon:
//!
//! ```text
//! 0.0: {"sensors": [200, 200, 200, 28, 30, 31], "position": {"x": 20, "y": 40}};
//! 0.1: {"sensors": [200, 200, 200, 29, 30, 31], "position": {"x": 20, "y": 40.5}};
//! ```
//!
//! Anything which doesn't match this form (comments, blank lines) is ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use thiserror::Error;

// Internal
use host_if::eqpt::{HostSample, SampleParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A host sample which is scripted to occur at a specific time.
#[derive(Debug, Clone, Copy)]
pub struct ScriptedSample {
    /// The time the sample was taken at
    pub time_s: f64,

    /// The sample itself
    pub sample: HostSample,
}

/// A tick script.
///
/// After loading use `next_sample` to step through the samples in order.
pub struct TickScript {
    samples: VecDeque<ScriptedSample>,
    duration_s: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)"
    )]
    InvalidTimestamp(String),

    #[error("Script contains an invalid sample at {0} s: {1}")]
    InvalidSample(f64, SampleParseError),

    #[error("Script timestamps go backwards at {0} s")]
    NonMonotonicTime(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TickScript {
    /// Load a script from the given path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = script_path.as_ref();

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        let script = fs::read_to_string(path).map_err(ScriptError::ScriptLoadError)?;

        Self::from_str(&script)
    }

    /// Parse a script from a string.
    pub fn from_str(script: &str) -> Result<Self, ScriptError> {
        let mut samples: VecDeque<ScriptedSample> = VecDeque::new();

        // Timestamp, colon, then everything up to the semicolon is the payload
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .expect("Tick script regex is invalid");

        for cap in re.captures_iter(script) {
            // Both groups are non-optional in the regex so will always be
            // present in a capture
            let time_str = &cap[1];
            let payload = &cap[3];

            let time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            if let Some(last) = samples.back() {
                if time_s < last.time_s {
                    return Err(ScriptError::NonMonotonicTime(time_s));
                }
            }

            let sample = HostSample::from_json(payload)
                .map_err(|e| ScriptError::InvalidSample(time_s, e))?;

            samples.push_back(ScriptedSample { time_s, sample });
        }

        let duration_s = match samples.back() {
            Some(s) => s.time_s,
            None => return Err(ScriptError::ScriptEmpty),
        };

        Ok(TickScript {
            samples,
            duration_s,
        })
    }

    /// Get the next sample in the script, or `None` at the end of the script.
    pub fn next_sample(&mut self) -> Option<ScriptedSample> {
        self.samples.pop_front()
    }

    /// Get the number of samples remaining in the script
    pub fn get_num_samples(&self) -> usize {
        self.samples.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        self.duration_s
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SCRIPT: &str = r#"
        # Straight along a wall then an obstacle
        0.0: {"sensors": [200, 200, 200, 28, 30, 32], "position": {"x": 20, "y": 40}};
        0.1: {"sensors": [200, 200, 200, 29, 30, 31], "position": {"x": 20, "y": 40.5}};
        0.2: {"sensors": [25, 200, 200, 29, 30, 31], "position": {"x": 20, "y": 41}, "angular_velocity_rads": 0.1};
    "#;

    #[test]
    fn test_parse_script() {
        let mut script = TickScript::from_str(SCRIPT).unwrap();

        assert_eq!(script.get_num_samples(), 3);
        assert!((script.get_duration() - 0.2).abs() < 1e-12);

        let first = script.next_sample().unwrap();
        assert_eq!(first.time_s, 0.0);
        assert_eq!(first.sample.sensors[3], 28.0);

        script.next_sample().unwrap();
        let last = script.next_sample().unwrap();
        assert_eq!(last.sample.sensors[0], 25.0);
        assert_eq!(last.sample.angular_velocity_rads, 0.1);

        assert!(script.next_sample().is_none());
    }

    #[test]
    fn test_script_errors() {
        assert!(matches!(
            TickScript::from_str("# nothing here"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            TickScript::from_str(r#"0.0: {"sensors": [1, 2, 3]};"#),
            Err(ScriptError::InvalidSample(_, _))
        ));
        assert!(matches!(
            TickScript::from_str(
                "1.0: {\"sensors\": [1, 1, 1, 1, 1, 1], \"position\": {\"x\": 0, \"y\": 0}};\n\
                 0.5: {\"sensors\": [1, 1, 1, 1, 1, 1], \"position\": {\"x\": 0, \"y\": 0}};"
            ),
            Err(ScriptError::NonMonotonicTime(_))
        ));
        assert!(matches!(
            TickScript::new("/this/script/does/not/exist.wfs"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
