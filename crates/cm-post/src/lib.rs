pub mod error;
pub mod gcode;
pub mod job;

pub use error::PostError;
pub use gcode::GCodeEmitter;
pub use job::{CollectingSink, JobDescriptor, NullSink, OperationDescriptor, Warning, WarningSink};
