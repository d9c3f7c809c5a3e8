//! Trait for upstream multi-object tracker backends.

use ndarray::Array2;

/// Trait for upstream tracker backends feeding the reid processor.
///
/// Implement this trait to connect any multi-object tracker whose output
/// can be expressed as a per-frame block of numeric rows.
///
/// # Example
///
/// ```ignore
/// use reid_rs::TrackerSource;
/// use ndarray::Array2;
///
/// struct MyTracker {
///     // Your tracker here
/// }
///
/// impl TrackerSource for MyTracker {
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Result<Option<Array2<f64>>, Self::Error> {
///         // Advance the tracker and return its raw rows
///         Ok(None)
///     }
/// }
/// ```
pub trait TrackerSource {
    /// Error type for tracker failures.
    type Error;

    /// Produce the raw per-object rows of the next frame.
    ///
    /// # Returns
    /// `Some(rows)` for the next frame, `None` once the stream is
    /// exhausted, or an error.
    fn next_frame(&mut self) -> Result<Option<Array2<f64>>, Self::Error>;
}
