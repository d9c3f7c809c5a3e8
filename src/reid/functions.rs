//! Default cost and selection functions for the matcher.

use crate::reid::tracked_object::TrackedObject;

/// Euclidean distance between the centers of two objects' bounding boxes.
///
/// Lower is more likely the same real object.
pub fn bounding_box_distance(candidate: &TrackedObject, switcher: &TrackedObject) -> f64 {
    let (x1, y1) = candidate.bbox().center();
    let (x2, y2) = switcher.bbox().center();
    ((x1 - x2).powi(2) + (y1 - y2).powi(2)).sqrt()
}

/// Only allow matching objects observed as the same category.
pub fn select_by_category(candidate: &TrackedObject, switcher: &TrackedObject) -> bool {
    candidate.category() == switcher.category()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::InputDataPositions;
    use crate::reid::ObjectState;
    use ndarray::array;

    fn object(x: f64, y: f64, category: f64) -> TrackedObject {
        let positions = InputDataPositions::default();
        let row = array![x, y, 10.0, 10.0, 1.0, category, 0.9];
        TrackedObject::new(1, ObjectState::Stable, row.view(), &positions, 1)
    }

    #[test]
    fn test_bounding_box_distance() {
        let a = object(0.0, 0.0, 0.0);
        let b = object(3.0, 4.0, 0.0);
        assert!((bounding_box_distance(&a, &b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_select_by_category() {
        let a = object(0.0, 0.0, 0.0);
        let b = object(0.0, 0.0, 0.0);
        let c = object(0.0, 0.0, 1.0);
        assert!(select_by_category(&a, &b));
        assert!(!select_by_category(&a, &c));
    }
}
