//! Row schemas and persistence for the tracker input/output surface.

mod positions;
mod sink;

pub use positions::{InputDataPositions, OutputDataPositions};
pub use sink::TxtSink;
