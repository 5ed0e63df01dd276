pub mod units;
pub mod geometry;
pub mod error;

pub use units::Unit;
pub use geometry::{CamPath, FillRule, IntegerBounds, IntegerPaths, IntegerPath, IntegerPoint};
pub use error::Error;
