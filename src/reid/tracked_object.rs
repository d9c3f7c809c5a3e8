//! Tracked identity owning a re-identification chain and its metadata.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::{ReidError, Result};
use crate::io::InputDataPositions;
use crate::reid::metadata::TrackedObjectMetaData;
use crate::reid::object_state::ObjectState;
use crate::reid::rect::Rect;

/// One long-lived identity and its history of raw tracker ids.
///
/// The chain is insertion-ordered: the first id is the canonical
/// `object_id`, the last is the id most recently assigned by the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedObject {
    /// Ordered history of raw tracker ids merged into this identity
    pub re_id_chain: Vec<u64>,
    /// Current lifecycle state
    pub state: ObjectState,
    /// Owned observation statistics
    pub metadata: TrackedObjectMetaData,
}

impl TrackedObject {
    /// Create an identity from a previously-unseen raw tracker id.
    pub fn new(
        raw_id: u64,
        state: ObjectState,
        row: ArrayView1<f64>,
        positions: &InputDataPositions,
        frame_id: u64,
    ) -> Self {
        Self {
            re_id_chain: vec![raw_id],
            state,
            metadata: TrackedObjectMetaData::new(row, positions, frame_id),
        }
    }

    /// Create an identity from an existing chain and a metadata copy.
    pub fn from_parts(
        chain: Vec<u64>,
        state: ObjectState,
        metadata: TrackedObjectMetaData,
    ) -> Self {
        Self {
            re_id_chain: chain,
            state,
            metadata,
        }
    }

    /// The canonical identity: first id in the chain.
    pub fn object_id(&self) -> u64 {
        self.re_id_chain[0]
    }

    /// The id most recently assigned by the tracker: last id in the chain.
    pub fn tracker_id(&self) -> u64 {
        self.re_id_chain[self.re_id_chain.len() - 1]
    }

    /// Whether `raw_id` is anywhere in this identity's chain.
    pub fn contains(&self, raw_id: u64) -> bool {
        self.re_id_chain.contains(&raw_id)
    }

    /// Number of raw tracker ids merged into this identity.
    pub fn nb_ids(&self) -> usize {
        self.re_id_chain.len()
    }

    /// Number of identity corrections applied (chain length minus one).
    pub fn nb_corrections(&self) -> usize {
        self.re_id_chain.len() - 1
    }

    pub fn category(&self) -> Option<i64> {
        self.metadata.category()
    }

    pub fn confidence(&self) -> f64 {
        self.metadata.confidence
    }

    pub fn mean_confidence(&self) -> f64 {
        self.metadata.mean_confidence()
    }

    pub fn bbox(&self) -> Rect {
        self.metadata.bbox
    }

    /// Frames elapsed since the identity first appeared.
    pub fn get_age(&self, frame_id: u64) -> u64 {
        frame_id - self.metadata.first_frame_id
    }

    /// Frames elapsed since the identity was last observed.
    pub fn get_nb_frames_since_last_appearance(&self, frame_id: u64) -> u64 {
        frame_id - self.metadata.last_frame_id
    }

    /// Append one observation row to the identity's statistics.
    pub fn update_metadata(
        &mut self,
        row: ArrayView1<f64>,
        positions: &InputDataPositions,
        frame_id: u64,
    ) {
        self.metadata.update(row, positions, frame_id);
    }

    /// Absorb another identity: its chain is appended after this one's and
    /// its statistics are merged in.
    ///
    /// The state is taken from `other` as a transient value; callers must
    /// set the final state explicitly afterwards.
    pub fn merge(&mut self, other: TrackedObject) {
        self.re_id_chain.extend(other.re_id_chain);
        self.metadata.merge(&other.metadata);
        self.state = other.state;
    }

    /// Split the chain at `split_id`.
    ///
    /// `self` keeps the prefix up to and including `split_id` together with
    /// the original metadata; the returned object owns the suffix strictly
    /// after `split_id` and a copy of the metadata as of the cut. Fails if
    /// `split_id` is the chain's last element or not present at all.
    pub fn cut(&mut self, split_id: u64) -> Result<TrackedObject> {
        let position = self
            .re_id_chain
            .iter()
            .position(|&id| id == split_id)
            .ok_or_else(|| ReidError::IdNotInChain {
                id: split_id,
                chain: self.re_id_chain.clone(),
            })?;
        if position == self.re_id_chain.len() - 1 {
            return Err(ReidError::CutOnLastId { id: split_id });
        }

        let suffix = self.re_id_chain.split_off(position + 1);
        Ok(TrackedObject::from_parts(
            suffix,
            ObjectState::Stable,
            self.metadata.clone(),
        ))
    }
}

/// Two identities are equal iff their chains are equal.
impl PartialEq for TrackedObject {
    fn eq(&self, other: &Self) -> bool {
        self.re_id_chain == other.re_id_chain
    }
}

/// An identity equals a raw id if that id is anywhere in its chain.
impl PartialEq<u64> for TrackedObject {
    fn eq(&self, raw_id: &u64) -> bool {
        self.contains(*raw_id)
    }
}
