use serde::{Deserialize, Serialize};

/// Lifecycle state of a tracked identity in the re-identification process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ObjectState {
    /// Raw tracker output, not yet trusted
    #[default]
    TrackerOutput,
    /// Passed the admission filter, not yet classified
    FilteredOutput,
    /// Confirmed identity, eligible for output
    Stable,
    /// Identity currently missing, awaiting rematch
    Switcher,
    /// Newly appeared identity, eligible for rematch to a lost one
    Candidate,
    /// Switcher that was never rematched; terminal
    LostForever,
}

impl ObjectState {
    /// Human-readable description of the state.
    pub fn description(&self) -> &'static str {
        match self {
            ObjectState::TrackerOutput => "tracker output not in reid process",
            ObjectState::FilteredOutput => "tracker output entering reid process",
            ObjectState::Stable => "stable object",
            ObjectState::Switcher => "lost object to be re-matched",
            ObjectState::Candidate => "new object to be matched",
            ObjectState::LostForever => "switcher never rematched",
        }
    }

    /// Whether an object in this state takes part in the reid process.
    pub fn is_in_reid_process(&self) -> bool {
        !matches!(self, ObjectState::TrackerOutput)
    }
}
