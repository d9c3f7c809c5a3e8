mod filter;
mod functions;
mod matcher;
mod metadata;
mod object_state;
mod rect;
mod reid_processor;
mod tracked_object;

pub use filter::TrackedObjectFilter;
pub use functions::{bounding_box_distance, select_by_category};
pub use matcher::{CostFn, DISALLOWED_MATCH, Matcher, SelectionFn};
pub use metadata::TrackedObjectMetaData;
pub use object_state::ObjectState;
pub use rect::Rect;
pub use reid_processor::{ReidConfig, ReidProcessor};
pub use tracked_object::TrackedObject;
