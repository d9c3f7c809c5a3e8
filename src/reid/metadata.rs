//! Per-identity observation statistics aggregated across frames.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::io::InputDataPositions;
use crate::reid::rect::Rect;

/// Observation statistics of one tracked identity.
///
/// Knows nothing about identity chains or matching; all mutation goes
/// through [`update`](Self::update) and [`merge`](Self::merge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedObjectMetaData {
    /// First frame the identity was observed in
    pub first_frame_id: u64,
    /// Most recent frame the identity was observed in
    pub last_frame_id: u64,
    /// Observation count per category, in first-seen order
    pub class_counts: Vec<(i64, u64)>,
    /// Most recently observed bounding box
    pub bbox: Rect,
    /// Most recently observed confidence
    pub confidence: f64,
    /// Sum of all observed confidences
    pub confidence_sum: f64,
    /// Total number of observations
    pub observations: u64,
}

impl TrackedObjectMetaData {
    /// Build metadata from the first observation row of an identity.
    pub fn new(row: ArrayView1<f64>, positions: &InputDataPositions, frame_id: u64) -> Self {
        let mut metadata = Self {
            first_frame_id: frame_id,
            last_frame_id: frame_id,
            class_counts: Vec::new(),
            bbox: Rect::default(),
            confidence: 0.0,
            confidence_sum: 0.0,
            observations: 0,
        };
        metadata.update(row, positions, frame_id);
        metadata
    }

    /// Apply one observation row.
    pub fn update(&mut self, row: ArrayView1<f64>, positions: &InputDataPositions, frame_id: u64) {
        self.last_frame_id = frame_id;

        let category = positions.category_of(row);
        match self.class_counts.iter_mut().find(|(c, _)| *c == category) {
            Some((_, count)) => *count += 1,
            None => self.class_counts.push((category, 1)),
        }

        self.bbox = positions.bbox_of(row);
        let confidence = positions.confidence_of(row);
        self.confidence = confidence;
        self.confidence_sum += confidence;
        self.observations += 1;
    }

    /// Fold another identity's statistics into this one.
    ///
    /// Accumulators and class counts are summed; `confidence`, `bbox` and
    /// `last_frame_id` take the incoming values, while `first_frame_id`
    /// keeps the receiver's earlier origin.
    pub fn merge(&mut self, other: &TrackedObjectMetaData) {
        self.observations += other.observations;
        self.confidence_sum += other.confidence_sum;
        self.confidence = other.confidence;
        self.bbox = other.bbox;
        self.last_frame_id = other.last_frame_id;
        for &(category, count) in &other.class_counts {
            match self.class_counts.iter_mut().find(|(c, _)| *c == category) {
                Some((_, existing)) => *existing += count,
                None => self.class_counts.push((category, count)),
            }
        }
    }

    /// The category observed most often; ties resolve to the earliest-seen
    /// category reaching the maximum count.
    pub fn category(&self) -> Option<i64> {
        self.class_counts
            .iter()
            .max_by_key(|(_, count)| *count)
            .map(|(category, _)| *category)
    }

    /// Fraction of observations per category, in first-seen order.
    pub fn class_proportions(&self) -> Vec<(i64, f64)> {
        if self.observations == 0 {
            return Vec::new();
        }
        self.class_counts
            .iter()
            .map(|&(category, count)| (category, count as f64 / self.observations as f64))
            .collect()
    }

    /// Percentage of frames the identity was observed in since its first frame.
    pub fn percentage_of_time_seen(&self, frame_id: u64) -> f64 {
        if self.observations == 0 {
            return 0.0;
        }
        self.observations as f64 / (frame_id - self.first_frame_id + 1) as f64 * 100.0
    }

    /// Running mean confidence, 0.0 when unobserved.
    pub fn mean_confidence(&self) -> f64 {
        if self.observations == 0 {
            return 0.0;
        }
        self.confidence_sum / self.observations as f64
    }
}
