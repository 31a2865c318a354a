// src/profiler/state.rs
// =============================================================================
// This module keeps the cumulative timing totals behind the profiler.
//
// Totals are keyed by (target type, operation name) and only ever grow: each
// recorded call adds its elapsed time to the running sum for that operation.
// One state instance is shared by every decorator a profiler hands out.
// =============================================================================

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

// Identity of one timed operation: the concrete type it was recorded against
// plus the operation name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId {
    pub target: String,
    pub operation: String,
}

// Thread-safe accumulator of per-operation durations
#[derive(Debug, Default)]
pub struct ProfilingState {
    totals: Mutex<HashMap<OperationId, Duration>>,
}

impl ProfilingState {
    pub fn new() -> Self {
        Self {
            totals: Mutex::new(HashMap::new()),
        }
    }

    // Adds one call's elapsed time to the operation's running total
    pub fn record(&self, target: &str, operation: &str, elapsed: Duration) {
        let id = OperationId {
            target: target.to_string(),
            operation: operation.to_string(),
        };
        let mut totals = self.lock_totals();
        *totals.entry(id).or_insert(Duration::ZERO) += elapsed;
    }

    // The running total for one operation, if it was ever recorded
    pub fn total_for(&self, target: &str, operation: &str) -> Option<Duration> {
        let totals = self.lock_totals();
        totals
            .get(&OperationId {
                target: target.to_string(),
                operation: operation.to_string(),
            })
            .copied()
    }

    // Writes the report: one line per operation, sorted by target then name
    pub fn write(&self, out: &mut dyn Write) -> io::Result<()> {
        let totals = self.lock_totals();
        let mut entries: Vec<_> = totals.iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (id, total) in entries {
            writeln!(out, "{}#{} took {:?}", id.target, id.operation, total)?;
        }
        Ok(())
    }

    fn lock_totals(&self) -> std::sync::MutexGuard<'_, HashMap<OperationId, Duration>> {
        // A poisoned lock still holds valid totals; recording never leaves the
        // map half-updated
        match self.totals.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let state = ProfilingState::new();
        state.record("MyParser", "parse", Duration::from_millis(5));
        state.record("MyParser", "parse", Duration::from_millis(7));

        assert_eq!(
            state.total_for("MyParser", "parse"),
            Some(Duration::from_millis(12))
        );
    }

    #[test]
    fn test_unrecorded_operation_has_no_total() {
        let state = ProfilingState::new();
        assert_eq!(state.total_for("MyParser", "parse"), None);
    }

    #[test]
    fn test_report_is_sorted_by_target_then_operation() {
        let state = ProfilingState::new();
        state.record("Zeta", "parse", Duration::from_millis(1));
        state.record("Alpha", "fetch", Duration::from_millis(2));
        state.record("Alpha", "parse", Duration::from_millis(3));

        let mut out = Vec::new();
        state.write(&mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Alpha#fetch took"));
        assert!(lines[1].starts_with("Alpha#parse took"));
        assert!(lines[2].starts_with("Zeta#parse took"));
    }
}
