// src/profiler/mod.rs
// =============================================================================
// This module measures how long designated capability operations take.
//
// Submodules:
// - state: The shared cumulative-duration totals and report formatting
// - timed: The decorator that wraps a PageParser delegate with timing
//
// A capability opts in through a static CapabilityProfile naming its timed
// operations. Wrapping an interface that marks nothing as timed is a caller
// error and fails before any call is made.
// =============================================================================

mod state;
mod timed;

pub use state::{OperationId, ProfilingState};

use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::parser::PageParser;
use timed::{TimedParser, PAGE_PARSER_PROFILE};

// Static marking of which operations on a capability interface are timed
pub struct CapabilityProfile {
    /// Name of the capability interface, for error messages
    pub interface: &'static str,
    /// Operation names designated for timing
    pub timed_operations: &'static [&'static str],
}

#[derive(Debug, Error)]
pub enum ProfilerError {
    /// The capability marks no operation as timed, so there is nothing to
    /// measure
    #[error("interface {interface} declares no timed operation to profile")]
    NothingToProfile { interface: &'static str },
}

// Hands out timing decorators that all feed one shared state
pub struct Profiler {
    started_at: DateTime<Local>,
    state: Arc<ProfilingState>,
}

impl Profiler {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            state: Arc::new(ProfilingState::new()),
        }
    }

    // Validates a capability's timed-operation marking and binds a recorder
    // to the shared state
    //
    // Returns: Err(NothingToProfile) when the marking is empty - checked at
    // wrap time, before any call is made
    pub fn recorder(&self, profile: &CapabilityProfile) -> Result<OperationRecorder, ProfilerError> {
        if profile.timed_operations.is_empty() {
            return Err(ProfilerError::NothingToProfile {
                interface: profile.interface,
            });
        }
        Ok(OperationRecorder {
            state: Arc::clone(&self.state),
        })
    }

    // Wraps a page parser so its timed operations are measured
    //
    // The returned parser behaves exactly like the delegate, except that each
    // timed call adds its duration to this profiler's state.
    pub fn wrap_parser<P>(&self, delegate: P) -> Result<Arc<dyn PageParser>, ProfilerError>
    where
        P: PageParser + 'static,
    {
        let recorder = self.recorder(&PAGE_PARSER_PROFILE)?;
        Ok(Arc::new(TimedParser::new(delegate, recorder)))
    }

    pub fn state(&self) -> &ProfilingState {
        &self.state
    }

    // Writes the standalone report: a "Run at" header followed by one sorted
    // line per recorded operation
    pub fn write_report(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "Run at {}", self.started_at.to_rfc2822())?;
        self.state.write(out)?;
        writeln!(out)
    }

    // Appends the report to a file, keeping whatever the file already holds
    pub fn write_report_to(&self, path: &Path) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        self.write_report(&mut file)
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

// Records elapsed durations into a profiler's shared state
#[derive(Debug)]
pub struct OperationRecorder {
    state: Arc<ProfilingState>,
}

impl OperationRecorder {
    pub fn record(&self, target: &str, operation: &str, elapsed: Duration) {
        self.state.record(target, operation, elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_empty_marking_fails_at_wrap_time() {
        const UNMEASURABLE: CapabilityProfile = CapabilityProfile {
            interface: "Unmeasurable",
            timed_operations: &[],
        };

        let profiler = Profiler::new();
        let error = profiler.recorder(&UNMEASURABLE).unwrap_err();
        assert!(matches!(
            error,
            ProfilerError::NothingToProfile {
                interface: "Unmeasurable"
            }
        ));
    }

    #[test]
    fn test_report_has_run_at_header() {
        let profiler = Profiler::new();
        profiler
            .state()
            .record("SomeParser", "parse", Duration::from_millis(3));

        let mut out = Vec::new();
        profiler.write_report(&mut out).unwrap();
        let report = String::from_utf8(out).unwrap();

        assert!(report.starts_with("Run at "));
        assert!(report.contains("SomeParser#parse took"));
    }

    #[test]
    fn test_report_file_is_appended_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile-data.txt");

        let profiler = Profiler::new();
        profiler
            .state()
            .record("SomeParser", "parse", Duration::from_millis(3));

        profiler.write_report_to(&path).unwrap();
        profiler.write_report_to(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("Run at ").count(), 2);
    }
}
