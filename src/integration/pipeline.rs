//! ReidPipeline for combining an upstream tracker with identity correction.

use ndarray::Array2;
use thiserror::Error;

use crate::error::ReidError;
use crate::reid::ReidProcessor;

use super::TrackerSource;

/// Errors produced while driving a [`ReidPipeline`].
#[derive(Debug, Error)]
pub enum PipelineError<E> {
    /// The upstream tracker failed to produce a frame.
    #[error("tracker source error: {0}")]
    Source(E),
    /// The reid processor rejected the frame.
    #[error(transparent)]
    Reid(#[from] ReidError),
}

/// A combined pipeline that bundles an upstream tracker with a
/// [`ReidProcessor`].
///
/// This struct provides a convenient way to run end-to-end identity
/// correction by combining any `TrackerSource` with the processor, feeding
/// frames in order with monotonically increasing frame ids.
pub struct ReidPipeline<S: TrackerSource> {
    source: S,
    processor: ReidProcessor,
    frame_id: u64,
}

impl<S: TrackerSource> ReidPipeline<S> {
    /// Create a new pipeline from a tracker source and a processor.
    pub fn new(source: S, processor: ReidProcessor) -> Self {
        Self {
            source,
            processor,
            frame_id: 0,
        }
    }

    /// Pull the next frame from the tracker and run identity correction.
    ///
    /// # Returns
    /// The corrected rows for the frame, or `None` once the tracker stream
    /// is exhausted.
    pub fn process_next(&mut self) -> Result<Option<Array2<f64>>, PipelineError<S::Error>> {
        let Some(rows) = self.source.next_frame().map_err(PipelineError::Source)? else {
            return Ok(None);
        };
        self.frame_id += 1;
        let corrected = self.processor.update(rows.view(), self.frame_id)?;
        Ok(Some(corrected))
    }

    /// Get a reference to the underlying tracker source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the underlying tracker source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Get a reference to the underlying processor.
    pub fn processor(&self) -> &ReidProcessor {
        &self.processor
    }

    /// Get a mutable reference to the underlying processor.
    pub fn processor_mut(&mut self) -> &mut ReidProcessor {
        &mut self.processor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reid::ReidConfig;
    use ndarray::array;

    struct MockTracker {
        frames: Vec<Array2<f64>>,
    }

    impl TrackerSource for MockTracker {
        type Error = std::convert::Infallible;

        fn next_frame(&mut self) -> Result<Option<Array2<f64>>, Self::Error> {
            if self.frames.is_empty() {
                Ok(None)
            } else {
                Ok(Some(self.frames.remove(0)))
            }
        }
    }

    #[test]
    fn test_pipeline_drains_the_source() {
        let frame = array![[0.0, 0.0, 10.0, 10.0, 1.0, 0.0, 0.9]];
        let source = MockTracker {
            frames: vec![frame.clone(), frame],
        };
        let config = ReidConfig {
            filter_confidence_threshold: 0.1,
            filter_frames_seen_threshold: 1,
            ..Default::default()
        };
        let mut pipeline = ReidPipeline::new(source, ReidProcessor::new(config).unwrap());

        assert!(pipeline.process_next().unwrap().is_some());
        assert!(pipeline.process_next().unwrap().is_some());
        assert!(pipeline.process_next().unwrap().is_none());
        assert_eq!(pipeline.processor().frame_id(), 2);
    }
}
