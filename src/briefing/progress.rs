//! Simulated generation progress — a client-side illusion.
//!
//! The backend reports no real progress, so while a request is pending
//! the viewer advances through a fixed sequence of status messages on a
//! wall-clock schedule. The phase index is derived from elapsed time
//! only and never gates or implies completion; only the lifecycle
//! transition conveys that the briefing is done.

use std::time::Duration;

use crate::config::ViewerConfig;

/// Status messages shown during generation, in display order.
pub const STATUS_MESSAGES: &[&str] = &[
    "Reviewing patient record...",
    "Analyzing medical history...",
    "Cross-referencing medications...",
    "Evaluating lab results...",
    "Checking drug interactions...",
    "Reviewing screening schedules...",
    "Identifying risk factors...",
    "Generating clinical flags...",
    "Prioritizing suggested actions...",
    "Composing summary...",
    "Finalizing briefing...",
];

/// Time-derived phase index over a fixed message sequence.
///
/// `phase_at` is pure: the same elapsed time and configuration always
/// give the same phase. The simulator holds no clock of its own; the
/// caller feeds it elapsed time and stops asking once the request
/// resolves.
#[derive(Debug, Clone)]
pub struct ProgressSimulator {
    message_interval: Duration,
    phase_count: usize,
}

impl ProgressSimulator {
    pub fn new(message_interval: Duration, phase_count: usize) -> Self {
        // A zero-phase simulator has nothing to display; clamp to 1.
        Self {
            message_interval,
            phase_count: phase_count.max(1),
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(
            Duration::from_millis(config.message_interval_ms),
            config.phase_count,
        )
    }

    pub fn phase_count(&self) -> usize {
        self.phase_count
    }

    /// Phase index for the given elapsed time:
    /// `min(floor(elapsed / interval), phase_count - 1)`.
    pub fn phase_at(&self, elapsed: Duration) -> usize {
        let interval_ms = self.message_interval.as_millis().max(1);
        let phase = (elapsed.as_millis() / interval_ms) as usize;
        phase.min(self.phase_count - 1)
    }

    /// Status message for the given elapsed time. Falls back to the
    /// last message when the configured phase count exceeds the table.
    pub fn message_at(&self, elapsed: Duration) -> &'static str {
        let idx = self.phase_at(elapsed).min(STATUS_MESSAGES.len() - 1);
        STATUS_MESSAGES[idx]
    }

    /// Display label, e.g. "Step 3 of 11". Steps are 1-based.
    pub fn step_label(&self, elapsed: Duration) -> String {
        format!("Step {} of {}", self.phase_at(elapsed) + 1, self.phase_count)
    }
}

impl Default for ProgressSimulator {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn message_table_matches_default_phase_count() {
        assert_eq!(
            STATUS_MESSAGES.len(),
            crate::config::DEFAULT_PHASE_COUNT,
        );
    }

    #[test]
    fn elapsed_zero_is_first_phase() {
        let sim = ProgressSimulator::default();
        assert_eq!(sim.phase_at(ms(0)), 0);
        assert_eq!(sim.message_at(ms(0)), "Reviewing patient record...");
        assert_eq!(sim.step_label(ms(0)), "Step 1 of 11");
    }

    #[test]
    fn phase_advances_at_interval_boundaries() {
        let sim = ProgressSimulator::default();
        assert_eq!(sim.phase_at(ms(3_499)), 0);
        assert_eq!(sim.phase_at(ms(3_500)), 1);
        assert_eq!(sim.phase_at(ms(7_000)), 2);
    }

    #[test]
    fn phase_clamps_at_final_index() {
        let sim = ProgressSimulator::default();
        // (N-1) * interval = 10 * 3500 = 35s reaches the last phase
        assert_eq!(sim.phase_at(ms(35_000)), 10);
        // and stays there for any larger elapsed value
        assert_eq!(sim.phase_at(ms(36_000)), 10);
        assert_eq!(sim.phase_at(Duration::from_secs(3_600)), 10);
        assert_eq!(sim.message_at(Duration::from_secs(3_600)), "Finalizing briefing...");
    }

    #[test]
    fn final_message_is_not_a_completion_claim() {
        // The last phase still reads as in-progress wording; nothing in
        // the table says "done".
        for message in STATUS_MESSAGES {
            assert!(message.ends_with("..."), "{message:?}");
        }
    }

    #[test]
    fn phase_is_deterministic() {
        let sim = ProgressSimulator::default();
        assert_eq!(sim.phase_at(ms(9_001)), sim.phase_at(ms(9_001)));
    }

    #[test]
    fn custom_interval_respected() {
        let sim = ProgressSimulator::new(ms(100), 5);
        assert_eq!(sim.phase_at(ms(0)), 0);
        assert_eq!(sim.phase_at(ms(250)), 2);
        assert_eq!(sim.phase_at(ms(10_000)), 4);
        assert_eq!(sim.step_label(ms(250)), "Step 3 of 5");
    }

    #[test]
    fn zero_phase_count_clamped_to_one() {
        let sim = ProgressSimulator::new(ms(100), 0);
        assert_eq!(sim.phase_count(), 1);
        assert_eq!(sim.phase_at(ms(5_000)), 0);
    }

    #[test]
    fn phase_count_beyond_table_reuses_last_message() {
        let sim = ProgressSimulator::new(ms(10), 50);
        assert_eq!(sim.phase_at(ms(10_000)), 49);
        assert_eq!(sim.message_at(ms(10_000)), "Finalizing briefing...");
    }
}
