//! Runtime metrics
//!
//! Counters for command invocations, destination delivery and the frame lifecycle.
//! Everything is a no-op until a recorder is installed.

use std::collections::BTreeMap;

use metrics::{counter, gauge};

/// Record a command invocation
pub fn record_command_invoked(command: &str) {
    counter!(
        "beacon_commands_invoked_total",
        "command" => command.to_string()
    )
    .increment(1);
}

/// Record a failed command
pub fn record_command_failed(command: &str, kind: &str) {
    counter!(
        "beacon_commands_failed_total",
        "command" => command.to_string(),
        "kind" => kind.to_string()
    )
    .increment(1);
}

/// Record the configuration state (0 = unconfigured, 1 = configured, 2 = failed)
pub fn record_configuration_state(state: u8) {
    gauge!("beacon_configuration_state").set(f64::from(state));
}

/// Record fired destinations
pub fn record_destinations_fired(count: usize) {
    counter!("beacon_destinations_fired_total").increment(count as u64);
}

/// Record a skipped destination (unrecognized descriptor)
pub fn record_destination_skipped() {
    counter!("beacon_destinations_skipped_total").increment(1);
}

/// Record hidden frame creation
pub fn record_frame_created() {
    counter!("beacon_frames_created_total").increment(1);
}

/// Record hidden frame removal
pub fn record_frame_removed() {
    counter!("beacon_frames_removed_total").increment(1);
}

/// Record a failed frame provisioning
pub fn record_provisioning_failed() {
    counter!("beacon_frame_provisioning_failed_total").increment(1);
}

/// Command invocation aggregator
///
/// Aggregates outcomes in memory for a closing summary.
#[derive(Debug, Default, Clone)]
pub struct InvocationStats {
    per_command: BTreeMap<String, CommandCounts>,
}

/// Per-command outcome counts
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CommandCounts {
    pub succeeded: u64,
    pub failed: u64,
    pub pending: u64,
}

impl InvocationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, command: &str) {
        self.entry(command).succeeded += 1;
    }

    pub fn record_failure(&mut self, command: &str) {
        self.entry(command).failed += 1;
    }

    /// Invocation that did not settle
    pub fn record_pending(&mut self, command: &str) {
        self.entry(command).pending += 1;
    }

    pub fn get(&self, command: &str) -> Option<CommandCounts> {
        self.per_command.get(command).copied()
    }

    pub fn total(&self) -> CommandCounts {
        self.per_command
            .values()
            .fold(CommandCounts::default(), |acc, c| CommandCounts {
                succeeded: acc.succeeded + c.succeeded,
                failed: acc.failed + c.failed,
                pending: acc.pending + c.pending,
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CommandCounts)> {
        self.per_command.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn entry(&mut self, command: &str) -> &mut CommandCounts {
        self.per_command.entry(command.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_aggregate_per_command() {
        let mut stats = InvocationStats::new();
        stats.record_success("configure");
        stats.record_success("event");
        stats.record_success("event");
        stats.record_failure("event");
        stats.record_pending("destinationsFired");

        assert_eq!(
            stats.get("event"),
            Some(CommandCounts {
                succeeded: 2,
                failed: 1,
                pending: 0
            })
        );
        assert_eq!(stats.get("unknown"), None);

        let total = stats.total();
        assert_eq!(total.succeeded, 3);
        assert_eq!(total.failed, 1);
        assert_eq!(total.pending, 1);
    }

    #[test]
    fn test_stats_iter_is_sorted() {
        let mut stats = InvocationStats::new();
        stats.record_success("zeta");
        stats.record_success("alpha");
        let names: Vec<_> = stats.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_recorders_without_exporter() {
        // No recorder installed: must not panic
        record_command_invoked("configure");
        record_command_failed("configure", "already_configured");
        record_configuration_state(1);
        record_destinations_fired(3);
        record_destination_skipped();
        record_frame_created();
        record_frame_removed();
        record_provisioning_failed();
    }
}
