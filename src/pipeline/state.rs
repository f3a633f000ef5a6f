//! Run state tracking.

use std::fmt;

/// Lifecycle of one run against one profile directory.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Pending,
    Collecting,
    Hashing,
    Transcoding,
    Done,
    /// Unrecoverable error, with the reason.
    Failed(String),
}

impl RunState {
    /// Whether the run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Done | RunState::Failed(_))
    }

    /// Whether moving to `next` is a legal transition.
    ///
    /// Stages only move forward one step at a time; `Failed` is reachable from
    /// every non-terminal state.
    pub fn can_transition_to(&self, next: &RunState) -> bool {
        match (self, next) {
            (current, RunState::Failed(_)) => !current.is_terminal(),
            (RunState::Pending, RunState::Collecting)
            | (RunState::Collecting, RunState::Hashing)
            | (RunState::Hashing, RunState::Transcoding)
            | (RunState::Transcoding, RunState::Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Pending => write!(f, "PENDING"),
            RunState::Collecting => write!(f, "COLLECTING"),
            RunState::Hashing => write!(f, "HASHING"),
            RunState::Transcoding => write!(f, "TRANSCODING"),
            RunState::Done => write!(f, "DONE"),
            RunState::Failed(reason) => write!(f, "FAILED ({})", reason),
        }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub files_collected: u64,
    pub bytes_collected: u64,
    pub files_hashed: u64,
    pub hash_failures: u64,
    pub sidecars_transcoded: u64,
    pub transcode_failures: u64,
    /// Errors raised while scanning, before any file was processed.
    pub collect_failures: u64,
}

impl RunStats {
    /// Total per-file failures across all stages.
    pub fn total_failures(&self) -> u64 {
        self.collect_failures + self.hash_failures + self.transcode_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(RunState::Pending.can_transition_to(&RunState::Collecting));
        assert!(RunState::Collecting.can_transition_to(&RunState::Hashing));
        assert!(RunState::Hashing.can_transition_to(&RunState::Transcoding));
        assert!(RunState::Transcoding.can_transition_to(&RunState::Done));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!RunState::Pending.can_transition_to(&RunState::Hashing));
        assert!(!RunState::Transcoding.can_transition_to(&RunState::Hashing));
        assert!(!RunState::Done.can_transition_to(&RunState::Failed("late".into())));
        assert!(!RunState::Failed("x".into()).can_transition_to(&RunState::Done));
    }

    #[test]
    fn test_failed_reachable_from_any_active_state() {
        for state in [
            RunState::Pending,
            RunState::Collecting,
            RunState::Hashing,
            RunState::Transcoding,
        ] {
            assert!(state.can_transition_to(&RunState::Failed("boom".into())));
        }
    }

    #[test]
    fn test_total_failures() {
        let stats = RunStats {
            hash_failures: 2,
            transcode_failures: 1,
            collect_failures: 1,
            ..Default::default()
        };
        assert_eq!(stats.total_failures(), 4);
        assert_eq!(RunState::Failed("x".into()).to_string(), "FAILED (x)");
    }
}
