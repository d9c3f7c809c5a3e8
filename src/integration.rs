//! Integration module for connecting upstream trackers with the reid layer.
//!
//! This module provides traits and utilities for feeding the output of any
//! multi-object tracker (ByteTrack, SORT, etc.) through the identity
//! correction process.

mod pipeline;
mod source;

pub use pipeline::{PipelineError, ReidPipeline};
pub use source::TrackerSource;
