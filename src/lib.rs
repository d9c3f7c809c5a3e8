//! # reid-rs
//!
//! A re-identification correction layer for multi-object trackers.
//!
//! Trackers periodically lose or swap the identifiers they assign to
//! objects across frames. This crate consumes a tracker's raw per-frame
//! output and emits a corrected stream in which identity discontinuities
//! (lost objects, id switches, late reappearances) are reconciled into
//! stable long-lived identities.
//!
//! ## Features
//!
//! - Per-identity re-identification chains with split and merge support
//! - Confidence/duration admission filter ahead of the reid process
//! - Minimum-cost bipartite rematching of lost and newly-appeared
//!   identities with pluggable cost and selection functions
//! - Configurable input/output row schemas and an optional text sink
//!
//! ## Example
//!
//! ```ignore
//! use ndarray::array;
//! use reid_rs::{ReidConfig, ReidProcessor};
//!
//! let mut processor = ReidProcessor::new(ReidConfig::default())?;
//!
//! // One row per detected object: bbox (x, y, w, h), tracker id,
//! // category, confidence.
//! let frame = array![[10.0, 20.0, 50.0, 80.0, 1.0, 0.0, 0.9]];
//! let corrected = processor.update(frame.view(), 1)?;
//! ```

mod error;

pub mod integration;
pub mod io;
pub mod reid;

pub use error::{ReidError, Result};
pub use integration::{PipelineError, ReidPipeline, TrackerSource};
pub use io::{InputDataPositions, OutputDataPositions, TxtSink};
pub use reid::{
    CostFn, DISALLOWED_MATCH, Matcher, ObjectState, Rect, ReidConfig, ReidProcessor, SelectionFn,
    TrackedObject, TrackedObjectFilter, TrackedObjectMetaData, bounding_box_distance,
    select_by_category,
};
