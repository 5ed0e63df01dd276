pub mod clip;
pub mod error;
pub mod merge;
pub mod offset;
pub mod path;

pub use clip::{clip, ClipOp};
pub use error::GeomError;
pub use merge::merge_paths;
pub use offset::offset;
pub use path::{crosses, point_in_paths, segment_intersection};
