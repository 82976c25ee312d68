//! Timing hooks around lookup phases. Purely observational: measurements
//! are emitted as tracing events and never influence control flow.

use std::time::Instant;

use tracing::{debug, trace};

/// Named lookup phases that get timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measurement {
    /// The full-project fallback scan.
    FindInProject,
    /// A whole locate operation, both tiers included.
    InlinePreviewCreation,
    /// The precise oracle tier.
    OracleLookup,
}

impl Measurement {
    /// Human-readable name used in log output.
    pub const fn label(self) -> &'static str {
        return match self {
            Measurement::FindInProject => "find in project",
            Measurement::InlinePreviewCreation => "inline preview creation",
            Measurement::OracleLookup => "oracle lookup",
        };
    }
}

/// A started measurement. Finish it with [`PerfTimer::add_measurement`]
/// to record it, or [`PerfTimer::finalize`] to discard it after a failure.
#[derive(Debug)]
#[must_use = "a started measurement should be added or finalized"]
pub struct PerfTimer {
    /// Which phase is being timed.
    measurement: Measurement,
    /// When the phase started.
    started: Instant,
}

impl PerfTimer {
    /// Start timing a phase.
    pub fn mark_start(measurement: Measurement) -> Self {
        trace!(measurement = measurement.label(), "measurement started");
        return Self {
            measurement,
            started: Instant::now(),
        };
    }

    /// Record the elapsed time of a completed phase.
    pub fn add_measurement(self) {
        let elapsed = self.started.elapsed();
        debug!(
            measurement = self.measurement.label(),
            elapsed_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            "measurement recorded"
        );
    }

    /// Drop a measurement without recording it.
    pub fn finalize(self) {
        trace!(measurement = self.measurement.label(), "measurement discarded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_name_each_phase() {
        assert_eq!(Measurement::FindInProject.label(), "find in project");
        assert_eq!(Measurement::InlinePreviewCreation.label(), "inline preview creation");
        assert_eq!(Measurement::OracleLookup.label(), "oracle lookup");
    }

    #[test]
    fn finishing_a_timer_yields_nothing_to_handle() {
        let finish: fn(PerfTimer) = PerfTimer::add_measurement;
        finish(PerfTimer::mark_start(Measurement::FindInProject));
        let discard: fn(PerfTimer) = PerfTimer::finalize;
        discard(PerfTimer::mark_start(Measurement::OracleLookup));
    }
}
