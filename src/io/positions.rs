//! Column position schemas for input and output row blocks.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::{ReidError, Result};
use crate::reid::Rect;

/// Column positions of the fields in the tracker's per-object input rows.
///
/// Bounding box coordinates are in the format x, y, w, h by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputDataPositions {
    /// Positions of the bounding box coordinates in the input rows.
    pub bbox: [usize; 4],
    /// Position of the id assigned by the tracker to each item.
    pub object_id: usize,
    /// Position of the category assigned to each detected object.
    pub category: usize,
    /// Position of the confidence score (range [0, 1]) of each detection.
    pub confidence: usize,
}

impl Default for InputDataPositions {
    fn default() -> Self {
        Self {
            bbox: [0, 1, 2, 3],
            object_id: 4,
            category: 5,
            confidence: 6,
        }
    }
}

impl InputDataPositions {
    /// Smallest row width these positions can address.
    pub fn min_row_len(&self) -> usize {
        let mut max = self.object_id.max(self.category).max(self.confidence);
        for &pos in &self.bbox {
            max = max.max(pos);
        }
        max + 1
    }

    /// Check that a row block is wide enough for these positions.
    pub fn check_row_len(&self, ncols: usize) -> Result<()> {
        let required = self.min_row_len();
        if ncols < required {
            return Err(ReidError::InputTooNarrow {
                required,
                got: ncols,
            });
        }
        Ok(())
    }

    pub fn id_of(&self, row: ArrayView1<f64>) -> u64 {
        row[self.object_id] as u64
    }

    pub fn category_of(&self, row: ArrayView1<f64>) -> i64 {
        row[self.category] as i64
    }

    pub fn confidence_of(&self, row: ArrayView1<f64>) -> f64 {
        row[self.confidence]
    }

    pub fn bbox_of(&self, row: ArrayView1<f64>) -> Rect {
        Rect::new(
            row[self.bbox[0]],
            row[self.bbox[1]],
            row[self.bbox[2]],
            row[self.bbox[3]],
        )
    }
}

/// Column positions of the fields in the corrected output rows.
///
/// Bounding box coordinates are in the format x, y, w, h by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputDataPositions {
    /// Position of the frame id.
    pub frame_id: usize,
    /// Position of the canonical id assigned by the reid processor.
    pub object_id: usize,
    /// Position of the category of the object.
    pub category: usize,
    /// Positions of the bounding box coordinates.
    pub bbox: [usize; 4],
    /// Position of the confidence score of the last observation.
    pub confidence: usize,
    /// Position of the mean confidence score over the object's lifetime.
    pub mean_confidence: usize,
    /// Position of the id assigned by the tracker (prior to re-identification).
    pub tracker_id: usize,
}

impl Default for OutputDataPositions {
    fn default() -> Self {
        Self {
            frame_id: 0,
            object_id: 1,
            category: 2,
            bbox: [3, 4, 5, 6],
            confidence: 7,
            mean_confidence: 8,
            tracker_id: 9,
        }
    }
}

impl OutputDataPositions {
    fn all_positions(&self) -> Vec<usize> {
        let mut positions = vec![
            self.frame_id,
            self.object_id,
            self.category,
            self.confidence,
            self.mean_confidence,
            self.tracker_id,
        ];
        positions.extend_from_slice(&self.bbox);
        positions
    }

    /// Number of columns in an output row.
    pub fn nb_cols(&self) -> usize {
        self.all_positions().len()
    }

    /// Check that the positions form a dense, non-overlapping column layout.
    pub fn validate(&self) -> Result<()> {
        let mut positions = self.all_positions();
        let nb_cols = positions.len();
        positions.sort_unstable();
        for (expected, &pos) in positions.iter().enumerate() {
            if pos != expected {
                return Err(ReidError::InvalidSchema(format!(
                    "output positions must cover columns 0..{nb_cols} exactly once, got {positions:?}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_input_field_extraction() {
        let positions = InputDataPositions::default();
        let row = array![10.0, 20.0, 30.0, 40.0, 7.0, 2.0, 0.9];

        assert_eq!(positions.id_of(row.view()), 7);
        assert_eq!(positions.category_of(row.view()), 2);
        assert_eq!(positions.confidence_of(row.view()), 0.9);
        assert_eq!(positions.bbox_of(row.view()).to_tlwh(), [10.0, 20.0, 30.0, 40.0]);
        assert_eq!(positions.min_row_len(), 7);
    }

    #[test]
    fn test_input_row_too_narrow() {
        let positions = InputDataPositions::default();
        assert!(positions.check_row_len(7).is_ok());
        assert!(positions.check_row_len(5).is_err());
    }

    #[test]
    fn test_output_default_is_valid() {
        let positions = OutputDataPositions::default();
        assert_eq!(positions.nb_cols(), 10);
        assert!(positions.validate().is_ok());
    }

    #[test]
    fn test_output_overlap_rejected() {
        let positions = OutputDataPositions {
            tracker_id: 0, // collides with frame_id
            ..Default::default()
        };
        assert!(positions.validate().is_err());
    }
}
