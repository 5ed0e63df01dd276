//! Job and operation descriptors: the two value objects a host builds once
//! and hands to the emitter. Also the warning channel the emitter uses to
//! surface non-fatal problems (clamped inputs, unsupported operations)
//! without taking a hard dependency on any particular logging setup.

use cm_cam::OperationKind;
use cm_core::geometry::IntegerPaths;
use cm_core::units::Unit;
use serde::{Deserialize, Serialize};

/// Inputs to the G-code emitter that apply to the whole program, not to any
/// one operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub gunits: Unit,
    pub top_z: f64,
    pub bot_z: f64,
    pub safe_z: f64,
    pub pass_depth: f64,
    pub plunge_feed: f64,
    pub cut_feed: f64,
    pub rapid_feed: f64,
    pub retract_feed: f64,
    pub decimal: usize,
    pub offset_x: f64,
    pub offset_y: f64,
    pub x_scale: f64,
    pub y_scale: f64,
    pub z_scale: f64,
    pub return_to_00: bool,
    pub tab_geometry: IntegerPaths,
    pub tab_z: f64,
}

impl JobDescriptor {
    /// `passDepth < 0` is clamped to 0 (plotter mode: every pass at topZ)
    /// rather than rejected.
    pub fn clamp_pass_depth(&mut self, warnings: &mut dyn WarningSink) {
        if self.pass_depth < 0.0 {
            self.pass_depth = 0.0;
            warnings.report(Warning::PassDepthTooSmall { clamped_to: 0.0 });
        }
    }
}

/// One operation: a geometry plus the parameters its compiler needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDescriptor {
    pub name: String,
    pub kind: OperationKind,
    pub geometry: IntegerPaths,
    pub cutter_diameter: i64,
    pub overlap: f64,
    pub climb: bool,
    /// Outline only; ignored by other operation kinds.
    pub width: i64,
    pub cut_depth: f64,
    /// True for a ramp entry (linear Z descent along the first segment of
    /// each pass), false for a stationary plunge.
    pub ramp: bool,
}

impl OperationDescriptor {
    /// `cutDepth < 0` is clamped to 0 rather than rejected.
    pub fn clamp_cut_depth(&mut self, warnings: &mut dyn WarningSink) {
        if self.cut_depth < 0.0 {
            self.cut_depth = 0.0;
            warnings.report(Warning::CutDepthTooSmall { clamped_to: 0.0 });
        }
    }

    /// Perforate and Drill provide their own Z per point and bypass
    /// pass-depth layering entirely.
    pub fn precalculated_z(&self) -> bool {
        matches!(self.kind, OperationKind::Perforate | OperationKind::Drill)
    }
}

/// A non-fatal problem the emitter surfaces to the host. The emitter never
/// formats these into text itself; the host localises and logs them.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    PassDepthTooSmall { clamped_to: f64 },
    CutDepthTooSmall { clamped_to: f64 },
    UnsupportedOperation { name: String },
}

/// Receives warnings as they occur. Implementations decide whether to log,
/// collect, or discard them.
pub trait WarningSink {
    fn report(&mut self, warning: Warning);
}

/// Discards every warning.
pub struct NullSink;

impl WarningSink for NullSink {
    fn report(&mut self, _warning: Warning) {}
}

/// Collects warnings in emission order for the host to inspect afterward.
#[derive(Debug, Default)]
pub struct CollectingSink(pub Vec<Warning>);

impl WarningSink for CollectingSink {
    fn report(&mut self, warning: Warning) {
        self.0.push(warning);
    }
}
