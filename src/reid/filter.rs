//! Admission gate between raw tracker noise and the reid process proper.

use crate::reid::object_state::ObjectState;
use crate::reid::tracked_object::TrackedObject;

/// Promotes and demotes objects based on accumulated confidence and
/// observation count.
#[derive(Debug, Clone)]
pub struct TrackedObjectFilter {
    /// Minimum mean confidence for an object to enter the reid process
    pub confidence_threshold: f64,
    /// Minimum number of observed frames for an object to enter the reid process
    pub frames_seen_threshold: u64,
}

impl TrackedObjectFilter {
    pub fn new(confidence_threshold: f64, frames_seen_threshold: u64) -> Self {
        Self {
            confidence_threshold,
            frames_seen_threshold,
        }
    }

    /// Re-evaluate one object's admission.
    ///
    /// A `TrackerOutput` object seen often and confidently enough is
    /// promoted to `FilteredOutput`. An object in any other state whose
    /// running mean confidence falls below the threshold is demoted back to
    /// `TrackerOutput`, keeping unreliable identities out of matching and
    /// output.
    pub fn update(&self, object: &mut TrackedObject) {
        if object.state == ObjectState::TrackerOutput {
            if object.metadata.mean_confidence() > self.confidence_threshold
                && object.metadata.observations >= self.frames_seen_threshold
            {
                object.state = ObjectState::FilteredOutput;
            }
        } else if object.metadata.mean_confidence() < self.confidence_threshold {
            object.state = ObjectState::TrackerOutput;
        }
    }
}
